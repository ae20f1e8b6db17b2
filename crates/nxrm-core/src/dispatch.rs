//! Family dispatch: one lifecycle implementation for many resource shapes.
//!
//! Privileges, capabilities and tasks each come in many variants that
//! share a contract and differ only in endpoint, schema fragment and DTO
//! mapping. A [`TypeDescriptor`] supplies those differences; the
//! [`Dispatcher`] turns it into a [`Resource`] the [`Engine`] can run.
//!
//! [`Engine`]: crate::lifecycle::Engine

use std::future::Future;

use nxrm_api::{ApiResponse, NexusClient};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::lifecycle::{Resource, Stamped, timestamp, type_name};
use crate::schema::{Attribute, Schema};

/// The per-variant half of a family resource.
pub trait TypeDescriptor: Send + Sync + 'static {
    type Model: Serialize + DeserializeOwned + Clone + Stamped + Send + Sync;
    /// Decoded read response.
    type Api: DeserializeOwned + Send;

    /// Type name without the provider prefix, e.g. `privilege_wildcard`.
    fn resource_name(&self) -> String;

    fn description(&self) -> String;

    /// Attributes every member of the family shares.
    fn base_attributes(&self) -> Vec<Attribute>;

    /// Attributes specific to this variant.
    fn schema_fragment(&self) -> Vec<Attribute>;

    fn key(&self, model: &Self::Model) -> String;

    fn validate(&self, _plan: &Self::Model) -> Result<(), CoreError> {
        Ok(())
    }

    // ── Remote calls ─────────────────────────────────────────────────

    fn do_create(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
    ) -> impl Future<Output = Result<ApiResponse, nxrm_api::Error>> + Send;

    fn do_read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> impl Future<Output = Result<ApiResponse, nxrm_api::Error>> + Send;

    fn do_update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> impl Future<Output = Result<ApiResponse, nxrm_api::Error>> + Send;

    fn do_delete(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> impl Future<Output = Result<ApiResponse, nxrm_api::Error>> + Send;

    // ── Status sets ──────────────────────────────────────────────────

    fn create_success_codes(&self) -> &'static [u16];

    fn read_success_codes(&self) -> &'static [u16] {
        &[200]
    }

    fn update_success_codes(&self) -> &'static [u16] {
        &[200, 204]
    }

    fn delete_success_codes(&self) -> &'static [u16] {
        &[200, 204]
    }

    // ── Mapping shims ────────────────────────────────────────────────

    /// Copy server-assigned fields (ids) from the create response.
    fn apply_create_response(
        &self,
        _model: &mut Self::Model,
        _response: &ApiResponse,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    /// Carry fields the plan cannot know (server ids) over from state.
    fn carry_over(&self, _plan: &mut Self::Model, _state: &Self::Model) {}

    /// Pick this entity out of the read response; `None` means absent.
    fn decode_read(
        &self,
        response: &ApiResponse,
        _state: &Self::Model,
    ) -> Result<Option<Self::Api>, CoreError> {
        Ok(Some(response.json()?))
    }

    fn update_state_from_api(&self, model: &mut Self::Model, api: &Self::Api)
    -> Result<(), CoreError>;

    /// Writes `last_updated`.
    fn update_plan_for_state(&self, model: &mut Self::Model) {
        model.set_last_updated(timestamp());
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError>;

    fn is_deprecated(&self) -> bool {
        false
    }

    fn deprecation_message(&self) -> String {
        format!(
            "{} is deprecated and will be removed in a future release.",
            type_name(&self.resource_name())
        )
    }
}

/// Adapts a [`TypeDescriptor`] into a [`Resource`].
#[derive(Debug, Clone)]
pub struct Dispatcher<D> {
    descriptor: D,
}

impl<D: TypeDescriptor> Dispatcher<D> {
    pub fn new(descriptor: D) -> Self {
        Self { descriptor }
    }
}

impl<D: TypeDescriptor> Resource for Dispatcher<D> {
    type Model = D::Model;

    fn type_name(&self) -> String {
        type_name(&self.descriptor.resource_name())
    }

    fn schema(&self) -> Schema {
        let schema = Schema::new(self.descriptor.description())
            .attributes(self.descriptor.base_attributes())
            .attributes(self.descriptor.schema_fragment())
            .with_last_updated();
        if self.descriptor.is_deprecated() {
            schema.deprecated(self.descriptor.deprecation_message())
        } else {
            schema
        }
    }

    fn key(&self, model: &Self::Model) -> String {
        self.descriptor.key(model)
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        self.descriptor.validate(plan)
    }

    async fn create(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        let response = self
            .descriptor
            .do_create(client, plan)
            .await?
            .expect(self.descriptor.create_success_codes())?;
        let mut model = plan.clone();
        self.descriptor
            .apply_create_response(&mut model, &response)?;
        Ok(model)
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let response = self.descriptor.do_read(client, state).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        let response = response.expect(self.descriptor.read_success_codes())?;
        let Some(api) = self.descriptor.decode_read(&response, state)? else {
            return Ok(None);
        };
        let mut model = state.clone();
        self.descriptor.update_state_from_api(&mut model, &api)?;
        Ok(Some(model))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        let mut model = plan.clone();
        self.descriptor.carry_over(&mut model, state);
        self.descriptor
            .do_update(client, &model, state)
            .await?
            .expect(self.descriptor.update_success_codes())?;
        Ok(model)
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        self.descriptor
            .do_delete(client, state)
            .await?
            .expect(self.descriptor.delete_success_codes())?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        self.descriptor.import_model(id)
    }

    fn update_plan_for_state(&self, model: &mut Self::Model) {
        self.descriptor.update_plan_for_state(model);
    }
}
