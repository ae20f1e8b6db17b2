//! Capabilities: a type id plus a flat string property bag.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body for `POST /v1/capabilities` and `PUT /v1/capabilities/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRequest {
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

/// A capability as listed by `GET /v1/capabilities`.
///
/// Everything is optional: the server has been seen to omit `notes` and
/// `enabled`, and the lifecycle layer decides what a missing `id` means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub type_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub properties: Option<IndexMap<String, String>>,
}

impl CapabilityResponse {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.get(key))
            .map(String::as_str)
    }
}
