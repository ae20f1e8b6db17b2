// Security listings: content selectors, privileges, roles, users,
// realms and LDAP servers.

use nxrm_api::NexusClient;
use nxrm_api::types::{PrivilegeResponse, RealmSummary};
use serde::Serialize;
use serde_json::Value;

use crate::datasource::DataSource;
use crate::error::CoreError;
use crate::lifecycle::type_name;
use crate::resources::content_selector::{self, ContentSelectorModel};
use crate::resources::ldap::{self, LdapServerModel};
use crate::resources::role::{self, RoleModel};
use crate::resources::user::{self, UserModel};
use crate::resources::found;
use crate::schema::{Attribute, Schema, computed_view};

// ── Content selectors ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ContentSelectors {
    pub content_selectors: Vec<ContentSelectorModel>,
}

pub struct ContentSelectorsDataSource;

impl DataSource for ContentSelectorsDataSource {
    type Output = ContentSelectors;

    fn type_name(&self) -> String {
        type_name("content_selectors")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every content selector.").attribute(
            Attribute::object_list("content_selectors", computed_view(content_selector::attributes()))
                .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<ContentSelectors, CoreError> {
        let rows = client.list_content_selectors().await?;
        Ok(ContentSelectors {
            content_selectors: rows.iter().map(ContentSelectorModel::from).collect(),
        })
    }
}

// ── Privileges ───────────────────────────────────────────────────────

/// Every privilege type in one row shape; fields a type does not own
/// stay null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivilegeItem {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub privilege_type: String,
    pub read_only: bool,
    pub actions: Option<Vec<String>>,
    pub domain: Option<String>,
    pub format: Option<String>,
    pub repository: Option<String>,
    pub content_selector: Option<String>,
    pub script_name: Option<String>,
    pub pattern: Option<String>,
}

impl From<&PrivilegeResponse> for PrivilegeItem {
    fn from(api: &PrivilegeResponse) -> Self {
        Self {
            name: api.name.clone(),
            description: api.description.clone(),
            privilege_type: api.privilege_type.clone(),
            read_only: api.read_only,
            actions: api.actions.clone(),
            domain: api.domain.clone(),
            format: api.format.clone(),
            repository: api.repository.clone(),
            content_selector: api.content_selector.clone(),
            script_name: api.script_name.clone(),
            pattern: api.pattern.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Privileges {
    pub privileges: Vec<PrivilegeItem>,
}

pub struct PrivilegesDataSource;

impl DataSource for PrivilegesDataSource {
    type Output = Privileges;

    fn type_name(&self) -> String {
        type_name("privileges")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every privilege, built-in and user-defined.").attribute(
            Attribute::object_list(
                "privileges",
                computed_view(vec![
                    Attribute::string("name"),
                    Attribute::string("description"),
                    Attribute::string("type"),
                    Attribute::bool("read_only"),
                    Attribute::string_list("actions"),
                    Attribute::string("domain"),
                    Attribute::string("format"),
                    Attribute::string("repository"),
                    Attribute::string("content_selector"),
                    Attribute::string("script_name"),
                    Attribute::string("pattern"),
                ]),
            )
            .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Privileges, CoreError> {
        let rows = client.list_privileges().await?;
        Ok(Privileges {
            privileges: rows.iter().map(PrivilegeItem::from).collect(),
        })
    }
}

// ── Roles ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Roles {
    pub roles: Vec<RoleModel>,
}

pub struct RolesDataSource;

impl DataSource for RolesDataSource {
    type Output = Roles;

    fn type_name(&self) -> String {
        type_name("roles")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every role.")
            .attribute(Attribute::object_list("roles", computed_view(role::attributes())).computed())
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Roles, CoreError> {
        let rows = client.list_roles().await?;
        Ok(Roles {
            roles: rows.iter().map(RoleModel::from).collect(),
        })
    }
}

/// One role by id.
pub struct RoleDataSource;

impl RoleDataSource {
    fn requested_id(config: &Value) -> &str {
        config.get("id").and_then(Value::as_str).unwrap_or_default()
    }
}

impl DataSource for RoleDataSource {
    type Output = RoleModel;

    fn type_name(&self) -> String {
        type_name("role")
    }

    fn schema(&self) -> Schema {
        let attributes = computed_view(role::attributes())
            .into_iter()
            .map(|a| {
                if a.name == "id" {
                    Attribute::string("id")
                        .required()
                        .min_length(1)
                        .description("Id of the role to look up.")
                } else {
                    a
                }
            });
        Schema::new("Look up a single role by id.").attributes(attributes)
    }

    async fn read(&self, client: &NexusClient, config: &Value) -> Result<RoleModel, CoreError> {
        let id = Self::requested_id(config);
        let role: Option<nxrm_api::types::Role> = found(client.get_role(id).await?)?;
        role.as_ref()
            .map(RoleModel::from)
            .ok_or_else(|| CoreError::validation("id", format!("no role with id {id:?} exists")))
    }

    fn id(&self, config: &Value) -> String {
        Self::requested_id(config).to_owned()
    }
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Users {
    pub users: Vec<UserModel>,
}

pub struct UsersDataSource;

impl DataSource for UsersDataSource {
    type Output = Users;

    fn type_name(&self) -> String {
        type_name("users")
    }

    fn schema(&self) -> Schema {
        Schema::new("List users from every configured user source.")
            .attribute(Attribute::object_list("users", computed_view(user::attributes())).computed())
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Users, CoreError> {
        let rows = client.list_users().await?;
        Ok(Users {
            users: rows.iter().map(UserModel::from).collect(),
        })
    }
}

// ── Realms ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealmItem {
    pub id: String,
    pub name: String,
}

impl From<&RealmSummary> for RealmItem {
    fn from(api: &RealmSummary) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Realms {
    pub available: Vec<RealmItem>,
    pub active: Vec<String>,
}

pub struct RealmsDataSource;

impl DataSource for RealmsDataSource {
    type Output = Realms;

    fn type_name(&self) -> String {
        type_name("security_realms")
    }

    fn schema(&self) -> Schema {
        Schema::new("Available security realms and the active ones in priority order.")
            .attribute(
                Attribute::object_list(
                    "available",
                    computed_view(vec![Attribute::string("id"), Attribute::string("name")]),
                )
                .computed(),
            )
            .attribute(Attribute::string_list("active").computed())
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Realms, CoreError> {
        let (available, active) =
            tokio::try_join!(client.list_available_realms(), client.list_active_realms())?;
        Ok(Realms {
            available: available.iter().map(RealmItem::from).collect(),
            active,
        })
    }
}

// ── LDAP servers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LdapServers {
    pub ldap_servers: Vec<LdapServerModel>,
}

pub struct LdapServersDataSource;

impl DataSource for LdapServersDataSource {
    type Output = LdapServers;

    fn type_name(&self) -> String {
        type_name("ldap_servers")
    }

    fn schema(&self) -> Schema {
        Schema::new("List LDAP server connections in lookup order.").attribute(
            Attribute::object_list("ldap_servers", computed_view(ldap::attributes())).computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<LdapServers, CoreError> {
        let mut rows = client.list_ldap_servers().await?;
        rows.sort_by_key(|s| s.order.unwrap_or(i64::MAX));
        Ok(LdapServers {
            ldap_servers: rows.iter().map(LdapServerModel::from).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn role_lookup_requires_an_id() {
        let schema = RoleDataSource.schema();
        assert!(schema.get("id").unwrap().required);
        assert!(schema.get("name").unwrap().computed);
        let diags = schema.validate(&json!({}));
        assert_eq!(diags[0].summary, "Missing required argument");
    }

    #[test]
    fn user_rows_never_carry_passwords() {
        let schema = UsersDataSource.schema();
        let users = schema.get("users").unwrap();
        let crate::schema::AttributeType::List { element } = &users.ty else {
            panic!("users is not a list");
        };
        let crate::schema::AttributeType::Object { attributes } = element.as_ref() else {
            panic!("users rows are not objects");
        };
        assert!(attributes.iter().all(|a| a.name != "password"));
    }
}
