//! Repository request/response bodies for `/v1/repositories/{format}/{type}`.
//!
//! The envelope (storage, cleanup, proxy, group, …) is shared by every
//! format; per-format blocks are collected in [`FormatAttributes`] and
//! flattened into the body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Shared envelope blocks ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAttributes {
    pub blob_store_name: String,
    pub strict_content_type_validation: bool,
    /// Hosted only: `ALLOW`, `ALLOW_ONCE`, `DENY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupPolicyAttributes {
    #[serde(default)]
    pub policy_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAttributes {
    pub proprietary_components: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAttributes {
    pub remote_url: String,
    /// Minutes; `-1` caches forever.
    pub content_max_age: i64,
    pub metadata_max_age: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeCacheAttributes {
    pub enabled: bool,
    /// Minutes.
    pub time_to_live: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_circular_redirects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cookies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_trust_store: Option<bool>,
}

/// Remote authentication. `type` is one of `username`, `ntlm`, `bearerToken`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientAuthentication {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Write-only: never echoed by GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntlm_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preemptive: Option<bool>,
    /// Write-only: never echoed by GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpClientAttributes {
    pub blocked: bool,
    pub auto_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<HttpClientConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<HttpClientAuthentication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationAttributes {
    pub preemptive_pull_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_path_regex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAttributes {
    /// Order-significant: members are searched in this order.
    #[serde(default)]
    pub member_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable_member: Option<String>,
}

// ── Per-format blocks ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenAttributes {
    /// `RELEASE`, `SNAPSHOT`, `MIXED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_policy: Option<String>,
    /// `STRICT`, `PERMISSIVE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_policy: Option<String>,
    /// `INLINE`, `ATTACHMENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerAttributes {
    pub v1_enabled: bool,
    pub force_basic_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerProxyAttributes {
    /// `REGISTRY`, `HUB`, `CUSTOM`.
    pub index_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_foreign_layers: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_layer_url_whitelist: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AptAttributes {
    pub distribution: String,
    /// Proxy only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypair: Option<String>,
    /// Write-only: never echoed by GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YumAttributes {
    pub repodata_depth: i64,
    /// `STRICT`, `PERMISSIVE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NugetProxyAttributes {
    pub query_cache_item_max_age: i64,
    /// `V2`, `V3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantineAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_quarantined: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConanProxyAttributes {
    /// `V1`, `V2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conan_version: Option<String>,
}

/// Every per-format block the server knows. A given `{format}/{type}` pair
/// uses at most a handful of these; the rest stay `None` and are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maven: Option<MavenAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_proxy: Option<DockerProxyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt: Option<AptAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apt_signing: Option<SigningAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum: Option<YumAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yum_signing: Option<SigningAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_proxy: Option<NugetProxyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<QuarantineAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pypi: Option<QuarantineAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conan_proxy: Option<ConanProxyAttributes>,
}

// ── Requests ─────────────────────────────────────────────────────────

/// Body for `POST`/`PUT /v1/repositories/{format}/hosted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedRepositoryRequest {
    pub name: String,
    pub online: bool,
    pub storage: StorageAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupPolicyAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentAttributes>,
    #[serde(flatten)]
    pub format: FormatAttributes,
}

/// Body for `POST`/`PUT /v1/repositories/{format}/proxy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRepositoryRequest {
    pub name: String,
    pub online: bool,
    pub storage: StorageAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupPolicyAttributes>,
    pub proxy: ProxyAttributes,
    pub negative_cache: NegativeCacheAttributes,
    pub http_client: HttpClientAttributes,
    /// Routing rule *name*; the GET side calls this `routingRuleName`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication: Option<ReplicationAttributes>,
    #[serde(flatten)]
    pub format: FormatAttributes,
}

/// Body for `POST`/`PUT /v1/repositories/{format}/group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepositoryRequest {
    pub name: String,
    pub online: bool,
    pub storage: StorageAttributes,
    pub group: GroupAttributes,
    #[serde(flatten)]
    pub format: FormatAttributes,
}

// ── Responses ────────────────────────────────────────────────────────

/// Any repository from `GET /v1/repositories/{format}/{type}/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryResponse {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(rename = "type", default)]
    pub repository_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub online: bool,
    #[serde(default)]
    pub storage: Option<StorageAttributes>,
    #[serde(default)]
    pub cleanup: Option<CleanupPolicyAttributes>,
    #[serde(default)]
    pub component: Option<ComponentAttributes>,
    #[serde(default)]
    pub proxy: Option<ProxyAttributes>,
    #[serde(default)]
    pub negative_cache: Option<NegativeCacheAttributes>,
    #[serde(default)]
    pub http_client: Option<HttpClientAttributes>,
    #[serde(default)]
    pub routing_rule_name: Option<String>,
    #[serde(default)]
    pub replication: Option<ReplicationAttributes>,
    #[serde(default)]
    pub group: Option<GroupAttributes>,
    #[serde(flatten)]
    pub format_attributes: FormatAttributes,
}

/// Summary row from `GET /v1/repositories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name: String,
    pub format: String,
    #[serde(rename = "type")]
    pub repository_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub attributes: Option<Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn hosted_request_flattens_format_blocks() {
        let req = HostedRepositoryRequest {
            name: "maven-internal".into(),
            online: true,
            storage: StorageAttributes {
                blob_store_name: "default".into(),
                strict_content_type_validation: true,
                write_policy: Some("ALLOW_ONCE".into()),
            },
            cleanup: None,
            component: None,
            format: FormatAttributes {
                maven: Some(MavenAttributes {
                    version_policy: Some("RELEASE".into()),
                    layout_policy: Some("STRICT".into()),
                    content_disposition: None,
                }),
                ..FormatAttributes::default()
            },
        };

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "name": "maven-internal",
                "online": true,
                "storage": {
                    "blobStoreName": "default",
                    "strictContentTypeValidation": true,
                    "writePolicy": "ALLOW_ONCE"
                },
                "maven": { "versionPolicy": "RELEASE", "layoutPolicy": "STRICT" }
            })
        );
    }

    #[test]
    fn proxy_response_reads_routing_rule_name() {
        let resp: RepositoryResponse = serde_json::from_value(json!({
            "name": "npm-proxy",
            "format": "npm",
            "type": "proxy",
            "url": "http://nexus/repository/npm-proxy",
            "online": true,
            "storage": { "blobStoreName": "default", "strictContentTypeValidation": true },
            "proxy": { "remoteUrl": "https://registry.npmjs.org", "contentMaxAge": 1440, "metadataMaxAge": 1440 },
            "negativeCache": { "enabled": true, "timeToLive": 1440 },
            "httpClient": { "blocked": false, "autoBlock": true, "connection": null, "authentication": null },
            "routingRuleName": "block-internal",
            "npm": { "removeQuarantined": false }
        }))
        .unwrap();

        assert_eq!(resp.routing_rule_name.as_deref(), Some("block-internal"));
        assert_eq!(
            resp.format_attributes.npm,
            Some(QuarantineAttributes {
                remove_quarantined: Some(false)
            })
        );
        assert!(resp.group.is_none());
    }
}
