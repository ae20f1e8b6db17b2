//! Security singletons: anonymous access, user-token policy, active
//! realms and SAML.
//!
//! Each exists exactly once per server, so the key is a fixed synthetic
//! id and import accepts any string. Delete puts the server back to its
//! canonical defaults (SAML is the exception: it has a real DELETE).

use nxrm_api::NexusClient;
use nxrm_api::types::{AnonymousAccessSettings, SamlConfiguration, UserTokenSettings};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

pub const DEFAULT_REALM: &str = "NexusAuthenticatingRealm";
pub const DEFAULT_ANONYMOUS_USER: &str = "anonymous";

// ── Anonymous access ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymousAccessModel {
    pub enabled: bool,
    pub user_id: String,
    pub realm: String,
    pub last_updated: Option<String>,
}

stamped!(AnonymousAccessModel);

impl From<&AnonymousAccessSettings> for AnonymousAccessModel {
    fn from(api: &AnonymousAccessSettings) -> Self {
        Self {
            enabled: api.enabled,
            user_id: api.user_id.clone(),
            realm: api.realm_name.clone(),
            last_updated: None,
        }
    }
}

impl AnonymousAccessModel {
    pub fn to_api(&self) -> AnonymousAccessSettings {
        AnonymousAccessSettings {
            enabled: self.enabled,
            user_id: self.user_id.clone(),
            realm_name: self.realm.clone(),
        }
    }
}

pub struct AnonymousAccessResource;

impl AnonymousAccessResource {
    pub const ID: &'static str = "anonymous_access";

    async fn put(client: &NexusClient, model: &AnonymousAccessModel) -> Result<(), CoreError> {
        client
            .update_anonymous_access(&model.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }
}

impl Resource for AnonymousAccessResource {
    type Model = AnonymousAccessModel;

    fn type_name(&self) -> String {
        type_name("security_anonymous_access")
    }

    fn schema(&self) -> Schema {
        Schema::new("Configure anonymous access. Deleting disables it again.")
            .attributes([
                Attribute::bool("enabled").required(),
                Attribute::string("user_id")
                    .default(DEFAULT_ANONYMOUS_USER)
                    .min_length(1)
                    .description("User whose permissions anonymous requests receive."),
                Attribute::string("realm")
                    .default(DEFAULT_REALM)
                    .min_length(1),
            ])
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        Self::put(client, plan).await?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<AnonymousAccessSettings> = found(client.get_anonymous_access().await?)?;
        Ok(api.as_ref().map(AnonymousAccessModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        _state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        Self::put(client, plan).await?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        let defaults = AnonymousAccessModel {
            enabled: false,
            user_id: DEFAULT_ANONYMOUS_USER.to_owned(),
            realm: DEFAULT_REALM.to_owned(),
            last_updated: None,
        };
        Self::put(client, &defaults).await
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(AnonymousAccessModel::default())
    }
}

// ── User tokens ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserTokenModel {
    pub enabled: bool,
    pub protect_content: bool,
    pub expiration_enabled: bool,
    pub expiration_days: i64,
    pub last_updated: Option<String>,
}

stamped!(UserTokenModel);

impl From<&UserTokenSettings> for UserTokenModel {
    fn from(api: &UserTokenSettings) -> Self {
        Self {
            enabled: api.enabled,
            protect_content: api.protect_content,
            expiration_enabled: api.expiration_enabled,
            expiration_days: api.expiration_days,
            last_updated: None,
        }
    }
}

impl UserTokenModel {
    pub fn to_api(&self) -> UserTokenSettings {
        UserTokenSettings {
            enabled: self.enabled,
            protect_content: self.protect_content,
            expiration_enabled: self.expiration_enabled,
            expiration_days: self.expiration_days,
        }
    }

    /// What delete writes back.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            protect_content: false,
            expiration_enabled: false,
            expiration_days: 1,
            last_updated: None,
        }
    }
}

pub struct UserTokenResource;

impl UserTokenResource {
    pub const ID: &'static str = "user_token";

    async fn put(client: &NexusClient, model: &UserTokenModel) -> Result<(), CoreError> {
        client
            .update_user_token_settings(&model.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }
}

impl Resource for UserTokenResource {
    type Model = UserTokenModel;

    fn type_name(&self) -> String {
        type_name("security_user_token")
    }

    fn schema(&self) -> Schema {
        Schema::new("Configure the user-token policy (Pro only). Deleting disables user tokens.")
            .attributes([
                Attribute::bool("enabled").required(),
                Attribute::bool("protect_content")
                    .default(false)
                    .description("Require a user token for repository content access."),
                Attribute::bool("expiration_enabled").default(false),
                Attribute::int64("expiration_days")
                    .default(30)
                    .range(1, 999),
            ])
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        Self::put(client, plan).await?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<UserTokenSettings> = found(client.get_user_token_settings().await?)?;
        Ok(api.as_ref().map(UserTokenModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        _state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        Self::put(client, plan).await?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        Self::put(client, &UserTokenModel::disabled()).await
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(UserTokenModel::default())
    }
}

// ── Realms ───────────────────────────────────────────────────────────

/// Active realms in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmsModel {
    pub active: Vec<String>,
    pub last_updated: Option<String>,
}

stamped!(RealmsModel);

pub struct RealmsResource;

impl RealmsResource {
    pub const ID: &'static str = "security_realms";
}

impl Resource for RealmsResource {
    type Model = RealmsModel;

    fn type_name(&self) -> String {
        type_name("security_realms")
    }

    fn schema(&self) -> Schema {
        Schema::new(format!(
            "Activate security realms in order. Deleting leaves only {DEFAULT_REALM} active."
        ))
        .attribute(
            Attribute::string_list("active")
                .required()
                .min_size(1)
                .description("Realm ids in the order they are consulted."),
        )
        .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .set_active_realms(&plan.active)
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let active: Option<Vec<String>> = found(client.get_active_realms().await?)?;
        Ok(active.map(|active| RealmsModel {
            active,
            last_updated: None,
        }))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        _state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .set_active_realms(&plan.active)
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        client
            .set_active_realms(&[DEFAULT_REALM.to_owned()])
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(RealmsModel::default())
    }
}

// ── SAML ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamlModel {
    pub idp_metadata: String,
    pub entity_id: Option<String>,
    pub validate_response_signature: Option<bool>,
    pub validate_assertion_signature: Option<bool>,
    pub username_attribute: String,
    pub first_name_attribute: Option<String>,
    pub last_name_attribute: Option<String>,
    pub email_attribute: Option<String>,
    pub groups_attribute: Option<String>,
    pub last_updated: Option<String>,
}

stamped!(SamlModel);

impl From<&SamlConfiguration> for SamlModel {
    fn from(api: &SamlConfiguration) -> Self {
        Self {
            idp_metadata: api.idp_metadata.clone(),
            entity_id: api.entity_id.clone(),
            validate_response_signature: api.validate_response_signature,
            validate_assertion_signature: api.validate_assertion_signature,
            username_attribute: api.username_attribute.clone(),
            first_name_attribute: api.first_name_attribute.clone(),
            last_name_attribute: api.last_name_attribute.clone(),
            email_attribute: api.email_attribute.clone(),
            groups_attribute: api.groups_attribute.clone(),
            last_updated: None,
        }
    }
}

impl SamlModel {
    pub fn to_api(&self) -> SamlConfiguration {
        SamlConfiguration {
            idp_metadata: self.idp_metadata.clone(),
            entity_id: self.entity_id.clone(),
            validate_response_signature: self.validate_response_signature,
            validate_assertion_signature: self.validate_assertion_signature,
            username_attribute: self.username_attribute.clone(),
            first_name_attribute: self.first_name_attribute.clone(),
            last_name_attribute: self.last_name_attribute.clone(),
            email_attribute: self.email_attribute.clone(),
            groups_attribute: self.groups_attribute.clone(),
        }
    }
}

pub struct SamlResource;

impl SamlResource {
    pub const ID: &'static str = "saml";

    async fn put(client: &NexusClient, model: &SamlModel) -> Result<(), CoreError> {
        client
            .update_saml(&model.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }
}

impl Resource for SamlResource {
    type Model = SamlModel;

    fn type_name(&self) -> String {
        type_name("security_saml")
    }

    fn schema(&self) -> Schema {
        Schema::new("Configure SAML single sign-on (Pro only).")
            .attributes([
                Attribute::string("idp_metadata")
                    .required()
                    .min_length(1)
                    .description("Identity provider metadata XML."),
                Attribute::string("entity_id")
                    .optional_computed()
                    .use_state_for_unknown()
                    .description("Service provider entity id; the server derives one from the base URL."),
                Attribute::bool("validate_response_signature"),
                Attribute::bool("validate_assertion_signature"),
                Attribute::string("username_attribute").required().min_length(1),
                Attribute::string("first_name_attribute"),
                Attribute::string("last_name_attribute"),
                Attribute::string("email_attribute"),
                Attribute::string("groups_attribute"),
            ])
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        Self::put(client, plan).await?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<SamlConfiguration> = found(client.get_saml().await?)?;
        Ok(api.as_ref().map(SamlModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        Self::put(client, plan).await?;
        Ok(SamlModel {
            entity_id: plan.entity_id.clone().or_else(|| state.entity_id.clone()),
            ..plan.clone()
        })
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        client.delete_saml().await?.expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(SamlModel::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn anonymous_realm_maps_to_realm_name() {
        let model = AnonymousAccessModel {
            enabled: true,
            user_id: "anonymous-XYZ".into(),
            realm: DEFAULT_REALM.into(),
            last_updated: None,
        };
        assert_eq!(
            serde_json::to_value(model.to_api()).unwrap(),
            json!({
                "enabled": true,
                "userId": "anonymous-XYZ",
                "realmName": "NexusAuthenticatingRealm"
            })
        );
    }

    #[test]
    fn user_tokens_reset_to_one_day() {
        let disabled = UserTokenModel::disabled();
        assert!(!disabled.enabled);
        assert_eq!(disabled.expiration_days, 1);
    }

    #[test]
    fn singleton_keys_ignore_the_model() {
        assert_eq!(RealmsResource.key(&RealmsModel::default()), "security_realms");
        assert!(RealmsResource.import_model("anything").is_ok());
    }
}
