// Security endpoints
//
// Privileges are created and updated under a per-type path but read and
// deleted by name alone. User lookup is a prefix search on `userId`; the
// caller filters for the exact match.

use std::fmt;

use tracing::debug;

use crate::client::{NexusClient, segment};
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::{
    AnonymousAccessSettings, ContentSelector, CreateUserRequest, LdapServer, PrivilegeRequest,
    PrivilegeResponse, RealmSummary, Role, SamlConfiguration, User, UserTokenSettings,
};

/// Privilege type path segment under `/v1/security/privileges/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegeKind {
    Application,
    RepositoryAdmin,
    RepositoryContentSelector,
    RepositoryView,
    Script,
    Wildcard,
}

impl PrivilegeKind {
    pub const ALL: [Self; 6] = [
        Self::Application,
        Self::RepositoryAdmin,
        Self::RepositoryContentSelector,
        Self::RepositoryView,
        Self::Script,
        Self::Wildcard,
    ];

    /// Path segment, which is also the `type` the server reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::RepositoryAdmin => "repository-admin",
            Self::RepositoryContentSelector => "repository-content-selector",
            Self::RepositoryView => "repository-view",
            Self::Script => "script",
            Self::Wildcard => "wildcard",
        }
    }
}

impl fmt::Display for PrivilegeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NexusClient {
    // ── Privileges ───────────────────────────────────────────────────

    /// `POST /v1/security/privileges/{type}`
    pub async fn create_privilege(
        &self,
        kind: PrivilegeKind,
        body: &PrivilegeRequest,
    ) -> Result<ApiResponse, Error> {
        debug!(%kind, name = %body.name, "creating privilege");
        self.post(&format!("v1/security/privileges/{kind}"), body)
            .await
    }

    /// `GET /v1/security/privileges/{name}`
    pub async fn get_privilege(&self, name: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/security/privileges/{}", segment(name)))
            .await
    }

    /// `PUT /v1/security/privileges/{type}/{name}`
    pub async fn update_privilege(
        &self,
        kind: PrivilegeKind,
        name: &str,
        body: &PrivilegeRequest,
    ) -> Result<ApiResponse, Error> {
        debug!(%kind, name, "updating privilege");
        self.put(
            &format!("v1/security/privileges/{kind}/{}", segment(name)),
            body,
        )
        .await
    }

    /// `DELETE /v1/security/privileges/{name}`
    pub async fn delete_privilege(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting privilege");
        self.delete(&format!("v1/security/privileges/{}", segment(name)))
            .await
    }

    /// `GET /v1/security/privileges`
    pub async fn list_privileges(&self) -> Result<Vec<PrivilegeResponse>, Error> {
        self.get("v1/security/privileges")
            .await?
            .expect(&[200])?
            .json()
    }

    // ── Roles ────────────────────────────────────────────────────────

    /// `POST /v1/security/roles`
    pub async fn create_role(&self, body: &Role) -> Result<ApiResponse, Error> {
        debug!(id = %body.id, "creating role");
        self.post("v1/security/roles", body).await
    }

    /// `GET /v1/security/roles/{id}`
    pub async fn get_role(&self, id: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/security/roles/{}", segment(id))).await
    }

    /// `PUT /v1/security/roles/{id}`
    pub async fn update_role(&self, id: &str, body: &Role) -> Result<ApiResponse, Error> {
        debug!(id, "updating role");
        self.put(&format!("v1/security/roles/{}", segment(id)), body)
            .await
    }

    /// `DELETE /v1/security/roles/{id}`
    pub async fn delete_role(&self, id: &str) -> Result<ApiResponse, Error> {
        debug!(id, "deleting role");
        self.delete(&format!("v1/security/roles/{}", segment(id)))
            .await
    }

    /// `GET /v1/security/roles`
    pub async fn list_roles(&self) -> Result<Vec<Role>, Error> {
        self.get("v1/security/roles").await?.expect(&[200])?.json()
    }

    // ── Users ────────────────────────────────────────────────────────

    /// `POST /v1/security/users`
    pub async fn create_user(&self, body: &CreateUserRequest) -> Result<ApiResponse, Error> {
        debug!(user_id = %body.user_id, "creating user");
        self.post("v1/security/users", body).await
    }

    /// `GET /v1/security/users?userId={id}&source={source}`
    pub async fn find_users(&self, user_id: &str, source: &str) -> Result<ApiResponse, Error> {
        self.get_with_params(
            "v1/security/users",
            &[("userId", user_id), ("source", source)],
        )
        .await
    }

    /// `PUT /v1/security/users/{id}`
    pub async fn update_user(&self, user_id: &str, body: &User) -> Result<ApiResponse, Error> {
        debug!(user_id, "updating user");
        self.put(&format!("v1/security/users/{}", segment(user_id)), body)
            .await
    }

    /// `PUT /v1/security/users/{id}/change-password` (`text/plain` body)
    pub async fn change_user_password(
        &self,
        user_id: &str,
        password: String,
    ) -> Result<ApiResponse, Error> {
        debug!(user_id, "changing user password");
        self.put_text(
            &format!("v1/security/users/{}/change-password", segment(user_id)),
            password,
        )
        .await
    }

    /// `DELETE /v1/security/users/{id}`
    pub async fn delete_user(&self, user_id: &str) -> Result<ApiResponse, Error> {
        debug!(user_id, "deleting user");
        self.delete(&format!("v1/security/users/{}", segment(user_id)))
            .await
    }

    /// `GET /v1/security/users`
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.get("v1/security/users").await?.expect(&[200])?.json()
    }

    // ── LDAP ─────────────────────────────────────────────────────────

    /// `POST /v1/security/ldap` -- answers 201 with an empty body.
    pub async fn create_ldap_server(&self, body: &LdapServer) -> Result<ApiResponse, Error> {
        debug!(name = %body.name, "creating LDAP server");
        self.post("v1/security/ldap", body).await
    }

    /// `GET /v1/security/ldap/{name}`
    pub async fn get_ldap_server(&self, name: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/security/ldap/{}", segment(name)))
            .await
    }

    /// `PUT /v1/security/ldap/{name}`
    pub async fn update_ldap_server(
        &self,
        name: &str,
        body: &LdapServer,
    ) -> Result<ApiResponse, Error> {
        debug!(name, "updating LDAP server");
        self.put(&format!("v1/security/ldap/{}", segment(name)), body)
            .await
    }

    /// `DELETE /v1/security/ldap/{name}`
    pub async fn delete_ldap_server(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting LDAP server");
        self.delete(&format!("v1/security/ldap/{}", segment(name)))
            .await
    }

    /// `GET /v1/security/ldap`
    pub async fn list_ldap_servers(&self) -> Result<Vec<LdapServer>, Error> {
        self.get("v1/security/ldap").await?.expect(&[200])?.json()
    }

    // ── Content selectors ────────────────────────────────────────────

    /// `POST /v1/security/content-selectors`
    pub async fn create_content_selector(
        &self,
        body: &ContentSelector,
    ) -> Result<ApiResponse, Error> {
        debug!(name = %body.name, "creating content selector");
        self.post("v1/security/content-selectors", body).await
    }

    /// `GET /v1/security/content-selectors/{name}`
    pub async fn get_content_selector(&self, name: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/security/content-selectors/{}", segment(name)))
            .await
    }

    /// `PUT /v1/security/content-selectors/{name}`
    pub async fn update_content_selector(
        &self,
        name: &str,
        body: &ContentSelector,
    ) -> Result<ApiResponse, Error> {
        debug!(name, "updating content selector");
        self.put(
            &format!("v1/security/content-selectors/{}", segment(name)),
            body,
        )
        .await
    }

    /// `DELETE /v1/security/content-selectors/{name}`
    pub async fn delete_content_selector(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting content selector");
        self.delete(&format!("v1/security/content-selectors/{}", segment(name)))
            .await
    }

    /// `GET /v1/security/content-selectors`
    pub async fn list_content_selectors(&self) -> Result<Vec<ContentSelector>, Error> {
        self.get("v1/security/content-selectors")
            .await?
            .expect(&[200])?
            .json()
    }

    // ── Anonymous access ─────────────────────────────────────────────

    /// `GET /v1/security/anonymous`
    pub async fn get_anonymous_access(&self) -> Result<ApiResponse, Error> {
        self.get("v1/security/anonymous").await
    }

    /// `PUT /v1/security/anonymous`
    pub async fn update_anonymous_access(
        &self,
        body: &AnonymousAccessSettings,
    ) -> Result<ApiResponse, Error> {
        debug!(enabled = body.enabled, "updating anonymous access");
        self.put("v1/security/anonymous", body).await
    }

    // ── User tokens ──────────────────────────────────────────────────

    /// `GET /v1/security/user-tokens`
    pub async fn get_user_token_settings(&self) -> Result<ApiResponse, Error> {
        self.get("v1/security/user-tokens").await
    }

    /// `PUT /v1/security/user-tokens`
    pub async fn update_user_token_settings(
        &self,
        body: &UserTokenSettings,
    ) -> Result<ApiResponse, Error> {
        debug!(enabled = body.enabled, "updating user token settings");
        self.put("v1/security/user-tokens", body).await
    }

    // ── Realms ───────────────────────────────────────────────────────

    /// `GET /v1/security/realms/active` -- ordered realm ids.
    pub async fn get_active_realms(&self) -> Result<ApiResponse, Error> {
        self.get("v1/security/realms/active").await
    }

    /// `PUT /v1/security/realms/active`
    pub async fn set_active_realms(&self, realms: &[String]) -> Result<ApiResponse, Error> {
        debug!(?realms, "setting active realms");
        self.put("v1/security/realms/active", &realms).await
    }

    /// `GET /v1/security/realms/available`
    pub async fn list_available_realms(&self) -> Result<Vec<RealmSummary>, Error> {
        self.get("v1/security/realms/available")
            .await?
            .expect(&[200])?
            .json()
    }

    /// `GET /v1/security/realms/active`, decoded.
    pub async fn list_active_realms(&self) -> Result<Vec<String>, Error> {
        self.get_active_realms().await?.expect(&[200])?.json()
    }

    // ── SAML ─────────────────────────────────────────────────────────

    /// `GET /v1/security/saml`
    pub async fn get_saml(&self) -> Result<ApiResponse, Error> {
        self.get("v1/security/saml").await
    }

    /// `PUT /v1/security/saml`
    pub async fn update_saml(&self, body: &SamlConfiguration) -> Result<ApiResponse, Error> {
        debug!("updating SAML configuration");
        self.put("v1/security/saml", body).await
    }

    /// `DELETE /v1/security/saml`
    pub async fn delete_saml(&self) -> Result<ApiResponse, Error> {
        debug!("deleting SAML configuration");
        self.delete("v1/security/saml").await
    }
}
