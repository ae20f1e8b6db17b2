//! Security bodies: privileges, roles, users, realms, anonymous access,
//! user tokens, LDAP, SAML and content selectors.

use serde::{Deserialize, Serialize};

// ── Privileges ───────────────────────────────────────────────────────

/// Request body for `POST`/`PUT /v1/security/privileges/{type}`.
///
/// One shape for every privilege type; each type fills only the fields it
/// owns and the rest are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Any privilege from `GET /v1/security/privileges[/{name}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeResponse {
    #[serde(rename = "type")]
    pub privilege_type: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub content_selector: Option<String>,
    #[serde(default)]
    pub script_name: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

// ── Roles ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

// ── Users ────────────────────────────────────────────────────────────

/// Body for `POST /v1/security/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: String,
    /// `active`, `locked`, `disabled`, `changepassword`.
    pub status: String,
    pub roles: Vec<String>,
}

/// A user from `GET /v1/security/users`, also the `PUT` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub source: String,
    pub status: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub external_roles: Vec<String>,
}

// ── Realms ───────────────────────────────────────────────────────────

/// Row from `GET /v1/security/realms/available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSummary {
    pub id: String,
    pub name: String,
}

// ── Anonymous access / user tokens ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousAccessSettings {
    pub enabled: bool,
    pub user_id: String,
    pub realm_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTokenSettings {
    pub enabled: bool,
    pub protect_content: bool,
    #[serde(default)]
    pub expiration_enabled: bool,
    #[serde(default)]
    pub expiration_days: i64,
}

// ── LDAP ─────────────────────────────────────────────────────────────

/// LDAP server connection. `id` and `order` are server-assigned and only
/// appear on responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapServer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub name: String,
    /// `LDAP` or `LDAPS`.
    pub protocol: String,
    pub use_trust_store: bool,
    pub host: String,
    pub port: i64,
    pub search_base: String,
    /// `NONE`, `SIMPLE`, `DIGEST_MD5`, `CRAM_MD5`.
    pub auth_scheme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_realm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    /// Write-only: never echoed by GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_password: Option<String>,
    pub connection_timeout_seconds: i64,
    pub connection_retry_delay_seconds: i64,
    pub max_incidents_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_base_dn: Option<String>,
    #[serde(default)]
    pub user_subtree: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_object_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ldap_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_real_name_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email_address_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_password_attribute: Option<String>,
    #[serde(default)]
    pub ldap_groups_as_roles: bool,
    /// `STATIC` or `DYNAMIC`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_base_dn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_subtree: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_object_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_member_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_member_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_member_of_attribute: Option<String>,
}

// ── SAML ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlConfiguration {
    /// Identity-provider metadata XML.
    pub idp_metadata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_response_signature: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_assertion_signature: Option<bool>,
    pub username_attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_attribute: Option<String>,
}

// ── Content selectors ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSelector {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// CSEL expression, e.g. `format == "maven2" and path =^ "/org/"`.
    pub expression: String,
    /// Response only (`csel`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub selector_type: Option<String>,
}
