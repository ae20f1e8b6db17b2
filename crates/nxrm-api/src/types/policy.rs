//! Cleanup policies and routing rules.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPolicy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Repository format the policy applies to, or `ALL_FORMATS`.
    pub format: String,
    /// Days since the blob was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_last_blob_updated: Option<i64>,
    /// Days since the component was last downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_last_downloaded: Option<i64>,
    /// `RELEASES` or `PRERELEASES`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_release_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_asset_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `BLOCK` or `ALLOW`.
    pub mode: String,
    /// Path regular expressions.
    #[serde(default)]
    pub matchers: Vec<String>,
}
