// LDAP server connections.
//
// Create answers 201 with no body; the server-assigned `id` and `order`
// come from a follow-up GET by name.

use nxrm_api::NexusClient;
use nxrm_api::types::LdapServer;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

pub const LDAP_PROTOCOLS: &[&str] = &["LDAP", "LDAPS"];
pub const LDAP_AUTH_SCHEMES: &[&str] = &["NONE", "SIMPLE", "DIGEST_MD5", "CRAM_MD5"];
pub const LDAP_GROUP_TYPES: &[&str] = &["STATIC", "DYNAMIC"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapServerModel {
    pub id: Option<String>,
    pub order: Option<i64>,
    pub name: String,
    pub protocol: String,
    pub use_trust_store: bool,
    pub host: String,
    pub port: i64,
    pub search_base: String,
    pub auth_scheme: String,
    pub auth_realm: Option<String>,
    pub auth_username: Option<String>,
    pub auth_password: Option<String>,
    pub connection_timeout_seconds: i64,
    pub connection_retry_delay_seconds: i64,
    pub max_incidents_count: i64,
    pub user_base_dn: Option<String>,
    pub user_subtree: bool,
    pub user_object_class: Option<String>,
    pub user_ldap_filter: Option<String>,
    pub user_id_attribute: Option<String>,
    pub user_real_name_attribute: Option<String>,
    pub user_email_address_attribute: Option<String>,
    pub user_password_attribute: Option<String>,
    pub ldap_groups_as_roles: bool,
    pub group_type: Option<String>,
    pub group_base_dn: Option<String>,
    pub group_subtree: Option<bool>,
    pub group_object_class: Option<String>,
    pub group_id_attribute: Option<String>,
    pub group_member_attribute: Option<String>,
    pub group_member_format: Option<String>,
    pub user_member_of_attribute: Option<String>,
    pub last_updated: Option<String>,
}

stamped!(LdapServerModel);

impl From<&LdapServer> for LdapServerModel {
    fn from(api: &LdapServer) -> Self {
        Self {
            id: api.id.clone(),
            order: api.order,
            name: api.name.clone(),
            protocol: api.protocol.clone(),
            use_trust_store: api.use_trust_store,
            host: api.host.clone(),
            port: api.port,
            search_base: api.search_base.clone(),
            auth_scheme: api.auth_scheme.clone(),
            auth_realm: api.auth_realm.clone(),
            auth_username: api.auth_username.clone(),
            auth_password: None,
            connection_timeout_seconds: api.connection_timeout_seconds,
            connection_retry_delay_seconds: api.connection_retry_delay_seconds,
            max_incidents_count: api.max_incidents_count,
            user_base_dn: api.user_base_dn.clone(),
            user_subtree: api.user_subtree,
            user_object_class: api.user_object_class.clone(),
            user_ldap_filter: api.user_ldap_filter.clone(),
            user_id_attribute: api.user_id_attribute.clone(),
            user_real_name_attribute: api.user_real_name_attribute.clone(),
            user_email_address_attribute: api.user_email_address_attribute.clone(),
            user_password_attribute: api.user_password_attribute.clone(),
            ldap_groups_as_roles: api.ldap_groups_as_roles,
            group_type: api.group_type.clone(),
            group_base_dn: api.group_base_dn.clone(),
            group_subtree: api.group_subtree,
            group_object_class: api.group_object_class.clone(),
            group_id_attribute: api.group_id_attribute.clone(),
            group_member_attribute: api.group_member_attribute.clone(),
            group_member_format: api.group_member_format.clone(),
            user_member_of_attribute: api.user_member_of_attribute.clone(),
            last_updated: None,
        }
    }
}

impl LdapServerModel {
    pub fn to_api(&self) -> LdapServer {
        LdapServer {
            id: self.id.clone(),
            order: self.order,
            name: self.name.clone(),
            protocol: self.protocol.clone(),
            use_trust_store: self.use_trust_store,
            host: self.host.clone(),
            port: self.port,
            search_base: self.search_base.clone(),
            auth_scheme: self.auth_scheme.clone(),
            auth_realm: self.auth_realm.clone(),
            auth_username: self.auth_username.clone(),
            auth_password: self.auth_password.clone(),
            connection_timeout_seconds: self.connection_timeout_seconds,
            connection_retry_delay_seconds: self.connection_retry_delay_seconds,
            max_incidents_count: self.max_incidents_count,
            user_base_dn: self.user_base_dn.clone(),
            user_subtree: self.user_subtree,
            user_object_class: self.user_object_class.clone(),
            user_ldap_filter: self.user_ldap_filter.clone(),
            user_id_attribute: self.user_id_attribute.clone(),
            user_real_name_attribute: self.user_real_name_attribute.clone(),
            user_email_address_attribute: self.user_email_address_attribute.clone(),
            user_password_attribute: self.user_password_attribute.clone(),
            ldap_groups_as_roles: self.ldap_groups_as_roles,
            group_type: self.group_type.clone(),
            group_base_dn: self.group_base_dn.clone(),
            group_subtree: self.group_subtree,
            group_object_class: self.group_object_class.clone(),
            group_id_attribute: self.group_id_attribute.clone(),
            group_member_attribute: self.group_member_attribute.clone(),
            group_member_format: self.group_member_format.clone(),
            user_member_of_attribute: self.user_member_of_attribute.clone(),
        }
    }
}

pub(crate) fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("id").computed().use_state_for_unknown(),
        Attribute::int64("order")
            .computed()
            .use_state_for_unknown()
            .description("Position in the server's LDAP lookup order."),
        Attribute::string("name")
            .required()
            .min_length(1)
            .requires_replace(),
        Attribute::string("protocol").required().one_of(LDAP_PROTOCOLS),
        Attribute::bool("use_trust_store").default(false),
        Attribute::string("host").required().min_length(1),
        Attribute::int64("port").required().range(1, 65535),
        Attribute::string("search_base")
            .required()
            .description("LDAP location to be added to the connection URL."),
        Attribute::string("auth_scheme").required().one_of(LDAP_AUTH_SCHEMES),
        Attribute::string("auth_realm").description("SASL realm for DIGEST_MD5 and CRAM_MD5."),
        Attribute::string("auth_username"),
        Attribute::string("auth_password").write_only(),
        Attribute::int64("connection_timeout_seconds")
            .default(30)
            .range(1, 3600),
        Attribute::int64("connection_retry_delay_seconds")
            .default(300)
            .at_least(0),
        Attribute::int64("max_incidents_count").default(3).at_least(0),
        Attribute::string("user_base_dn"),
        Attribute::bool("user_subtree").default(false),
        Attribute::string("user_object_class"),
        Attribute::string("user_ldap_filter"),
        Attribute::string("user_id_attribute"),
        Attribute::string("user_real_name_attribute"),
        Attribute::string("user_email_address_attribute"),
        Attribute::string("user_password_attribute"),
        Attribute::bool("ldap_groups_as_roles").default(false),
        Attribute::string("group_type").one_of(LDAP_GROUP_TYPES),
        Attribute::string("group_base_dn"),
        Attribute::bool("group_subtree"),
        Attribute::string("group_object_class"),
        Attribute::string("group_id_attribute"),
        Attribute::string("group_member_attribute"),
        Attribute::string("group_member_format"),
        Attribute::string("user_member_of_attribute")
            .description("Member-of attribute for DYNAMIC group mapping."),
    ]
}

pub struct LdapServerResource;

impl LdapServerResource {
    async fn fetch(client: &NexusClient, name: &str) -> Result<Option<LdapServer>, CoreError> {
        found(client.get_ldap_server(name).await?)
    }
}

impl Resource for LdapServerResource {
    type Model = LdapServerModel;

    fn type_name(&self) -> String {
        type_name("ldap_server")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage an LDAP server connection.")
            .attributes(attributes())
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        if plan.auth_scheme != "NONE" && plan.auth_username.is_none() {
            return Err(CoreError::validation(
                "auth_username",
                format!("auth_username is required when auth_scheme is {:?}", plan.auth_scheme),
            ));
        }
        if plan.ldap_groups_as_roles && plan.group_type.is_none() {
            return Err(CoreError::validation(
                "group_type",
                "group_type is required when ldap_groups_as_roles is true",
            ));
        }
        Ok(())
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        let body = LdapServer {
            id: None,
            order: None,
            ..plan.to_api()
        };
        client.create_ldap_server(&body).await?.expect(&[200, 201])?;

        let created = Self::fetch(client, &plan.name).await?.ok_or_else(|| {
            CoreError::ContractViolation(format!(
                "LDAP server {:?} was accepted but cannot be read back",
                plan.name
            ))
        })?;
        Ok(LdapServerModel {
            id: created.id,
            order: created.order,
            ..plan.clone()
        })
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        Ok(Self::fetch(client, &state.name)
            .await?
            .as_ref()
            .map(LdapServerModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        let body = LdapServer {
            id: state.id.clone(),
            order: state.order,
            ..plan.to_api()
        };
        client
            .update_ldap_server(&state.name, &body)
            .await?
            .expect(&[200, 204])?;
        Ok(LdapServerModel {
            id: state.id.clone(),
            order: state.order,
            ..plan.clone()
        })
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client
            .delete_ldap_server(&state.name)
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(LdapServerModel {
            name: id.to_owned(),
            ..LdapServerModel::default()
        })
    }
}
