//! Capabilities: one dispatcher per capability type.
//!
//! Every capability shares `{id, notes, enabled}` and a `properties` block
//! that travels as a flat string bag. The block's shape is a
//! [`CapabilityProperties`] type; reads list every capability and pick the
//! one whose id matches state.

mod kinds;

use std::marker::PhantomData;
use std::sync::Arc;

use nxrm_api::types::{CapabilityRequest, CapabilityResponse};
use nxrm_api::{ApiResponse, NexusClient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dispatch::{Dispatcher, TypeDescriptor};
use crate::error::CoreError;
use crate::lifecycle::{Engine, ResourceHandler, Stamped};
use crate::property_bag::PropertyBag;
use crate::schema::Attribute;

pub use kinds::*;

/// Shape of one capability type's `properties` block.
pub trait CapabilityProperties:
    PropertyBag + Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// Server-side capability type id, e.g. `rapture.branding`.
    const TYPE_ID: &'static str;
    /// Resource name suffix after `capability_`.
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Attributes of the `properties` block. Empty means the type has no
    /// tunables and the block is left out of the schema.
    fn attributes() -> Vec<Attribute>;

    /// Scrub values the server never echoes truthfully.
    fn redact_read(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityModel<P> {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub properties: Option<P>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl<P> Default for CapabilityModel<P> {
    fn default() -> Self {
        Self {
            id: None,
            notes: None,
            enabled: false,
            properties: None,
            last_updated: None,
        }
    }
}

impl<P> Stamped for CapabilityModel<P> {
    fn set_last_updated(&mut self, at: String) {
        self.last_updated = Some(at);
    }
}

impl<P: CapabilityProperties> CapabilityModel<P> {
    pub fn to_api(&self) -> CapabilityRequest {
        CapabilityRequest {
            type_id: P::TYPE_ID.to_owned(),
            notes: self.notes.clone(),
            enabled: self.enabled,
            properties: self
                .properties
                .as_ref()
                .map(PropertyBag::to_properties)
                .unwrap_or_default(),
        }
    }

    /// Map a listed capability. A missing `enabled` is read as `false`.
    pub fn from_api(api: &CapabilityResponse) -> Self {
        let enabled = api.enabled.unwrap_or_else(|| {
            warn!(
                capability = P::TYPE_ID,
                id = ?api.id,
                "server omitted 'enabled'; assuming false"
            );
            false
        });
        let properties = (!P::attributes().is_empty()).then(|| {
            let mut props = P::from_properties(&api.properties.clone().unwrap_or_default());
            props.redact_read();
            props
        });
        Self {
            id: api.id.clone(),
            notes: api.notes.clone(),
            enabled,
            properties,
            last_updated: None,
        }
    }
}

/// Type descriptor for the capability type `P`.
pub struct CapabilityDescriptor<P> {
    _marker: PhantomData<fn() -> P>,
}

impl<P> CapabilityDescriptor<P> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<P> Default for CapabilityDescriptor<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn id_of(model: &CapabilityModel<impl Sized>) -> &str {
    model.id.as_deref().unwrap_or_default()
}

impl<P: CapabilityProperties> TypeDescriptor for CapabilityDescriptor<P> {
    type Model = CapabilityModel<P>;
    type Api = CapabilityResponse;

    fn resource_name(&self) -> String {
        format!("capability_{}", P::NAME)
    }

    fn description(&self) -> String {
        P::DESCRIPTION.to_owned()
    }

    fn base_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::string("id")
                .computed()
                .use_state_for_unknown()
                .description("Server-assigned capability id."),
            Attribute::string("notes"),
            Attribute::bool("enabled")
                .required()
                .description("Whether the capability is active."),
        ]
    }

    fn schema_fragment(&self) -> Vec<Attribute> {
        let attrs = P::attributes();
        if attrs.is_empty() {
            Vec::new()
        } else {
            vec![Attribute::object("properties", attrs).required()]
        }
    }

    fn key(&self, model: &Self::Model) -> String {
        id_of(model).to_owned()
    }

    async fn do_create(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.create_capability(&plan.to_api()).await
    }

    async fn do_read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.get_capabilities().await
    }

    async fn do_update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.update_capability(id_of(state), &plan.to_api()).await
    }

    async fn do_delete(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.delete_capability(id_of(state)).await
    }

    fn create_success_codes(&self) -> &'static [u16] {
        &[200, 201]
    }

    fn apply_create_response(
        &self,
        model: &mut Self::Model,
        response: &ApiResponse,
    ) -> Result<(), CoreError> {
        let created: CapabilityResponse = response.json()?;
        match created.id {
            Some(id) if !id.is_empty() => {
                model.id = Some(id);
                Ok(())
            }
            _ => Err(CoreError::ContractViolation(format!(
                "create response for capability {} carried no id",
                P::TYPE_ID
            ))),
        }
    }

    fn carry_over(&self, plan: &mut Self::Model, state: &Self::Model) {
        plan.id.clone_from(&state.id);
    }

    fn decode_read(
        &self,
        response: &ApiResponse,
        state: &Self::Model,
    ) -> Result<Option<Self::Api>, CoreError> {
        let all: Vec<CapabilityResponse> = response.json()?;
        let Some(id) = state.id.as_deref() else {
            return Ok(None);
        };
        Ok(all.into_iter().find(|c| c.id.as_deref() == Some(id)))
    }

    fn update_state_from_api(
        &self,
        model: &mut Self::Model,
        api: &Self::Api,
    ) -> Result<(), CoreError> {
        match api.type_id.as_deref() {
            Some(type_id) if type_id != P::TYPE_ID => {
                return Err(CoreError::ContractViolation(format!(
                    "capability {:?} has type {type_id:?}, expected {:?}",
                    api.id,
                    P::TYPE_ID
                )));
            }
            _ => {}
        }
        let fresh = CapabilityModel::<P>::from_api(api);
        model.id = fresh.id;
        model.notes = fresh.notes;
        model.enabled = fresh.enabled;
        model.properties = fresh.properties;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        if id.is_empty() {
            return Err(CoreError::validation("id", "capability import id must not be empty"));
        }
        Ok(CapabilityModel {
            id: Some(id.to_owned()),
            ..CapabilityModel::default()
        })
    }
}

fn handler<P: CapabilityProperties>() -> Arc<dyn ResourceHandler> {
    Arc::new(Engine::new(Dispatcher::new(CapabilityDescriptor::<P>::new())))
}

/// Handlers for every capability type.
pub fn capability_handlers() -> Vec<Arc<dyn ResourceHandler>> {
    vec![
        handler::<AuditProperties>(),
        handler::<BaseUrlProperties>(),
        handler::<DefaultRoleProperties>(),
        handler::<OutreachProperties>(),
        handler::<StorageSettingsProperties>(),
        handler::<FirewallAuditProperties>(),
        handler::<HealthcheckProperties>(),
        handler::<CustomS3RegionsProperties>(),
        handler::<RutAuthProperties>(),
        handler::<UiBrandingProperties>(),
        handler::<UiSettingsProperties>(),
        handler::<GlobalWebhookProperties>(),
        handler::<RepositoryWebhookProperties>(),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    use super::*;

    fn created(body: &'static str) -> ApiResponse {
        ApiResponse::new(
            "POST",
            "/service/rest/v1/capabilities",
            StatusCode::OK,
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[test]
    fn create_response_without_id_is_contract_violation() {
        let d = CapabilityDescriptor::<BaseUrlProperties>::new();
        let mut model = CapabilityModel::default();
        let err = d
            .apply_create_response(&mut model, &created(r#"{"type":"baseurl"}"#))
            .unwrap_err();
        assert!(matches!(err, CoreError::ContractViolation(_)));

        d.apply_create_response(&mut model, &created(r#"{"id":"abc"}"#))
            .unwrap();
        assert_eq!(model.id.as_deref(), Some("abc"));
    }

    #[test]
    fn missing_enabled_and_notes_read_as_defaults() {
        let api = CapabilityResponse {
            id: Some("1".into()),
            type_id: Some("defaultrole".into()),
            properties: Some(IndexMap::from([("role".to_owned(), "nx-anonymous".to_owned())])),
            ..CapabilityResponse::default()
        };
        let model = CapabilityModel::<DefaultRoleProperties>::from_api(&api);
        assert!(!model.enabled);
        assert_eq!(model.notes, None);
        assert_eq!(model.properties.unwrap().role, "nx-anonymous");
    }

    #[test]
    fn audit_has_no_properties_block() {
        let d = CapabilityDescriptor::<AuditProperties>::new();
        assert!(d.schema_fragment().is_empty());
        let model = CapabilityModel::<AuditProperties>::from_api(&CapabilityResponse {
            id: Some("a".into()),
            enabled: Some(true),
            ..CapabilityResponse::default()
        });
        assert_eq!(model.properties, None);
        assert!(model.to_api().properties.is_empty());
    }

    #[test]
    fn read_picks_matching_id() {
        let d = CapabilityDescriptor::<RutAuthProperties>::new();
        let response = ApiResponse::new(
            "GET",
            "/service/rest/v1/capabilities",
            StatusCode::OK,
            Bytes::from_static(
                br#"[{"id":"x","type":"rutauth"},{"id":"y","type":"rutauth","enabled":true}]"#,
            ),
        );
        let state = CapabilityModel {
            id: Some("y".into()),
            ..CapabilityModel::default()
        };
        let picked = d.decode_read(&response, &state).unwrap().unwrap();
        assert_eq!(picked.enabled, Some(true));

        let gone = CapabilityModel {
            id: Some("z".into()),
            ..CapabilityModel::default()
        };
        assert!(d.decode_read(&response, &gone).unwrap().is_none());
    }
}
