// ── Provider facade ──
//
// The surface a host runtime drives: bind configuration once, then route
// lifecycle calls and data-source reads to the registered handler by type
// name. Cheaply cloneable; concurrent calls share only the immutable
// client snapshot taken at the start of each call.

use std::sync::Arc;

use indexmap::IndexMap;
use nxrm_api::NexusClient;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::data_sources::all_data_sources;
use crate::datasource::DataSourceHandler;
use crate::error::CoreError;
use crate::lifecycle::{OpContext, Outcome, PROVIDER_PREFIX, ResourceHandler};
use crate::resources::all_handlers;
use crate::schema::{Attribute, Schema};

/// Entry point for hosts.
#[derive(Clone)]
pub struct Provider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    client: RwLock<Option<NexusClient>>,
    resources: IndexMap<String, Arc<dyn ResourceHandler>>,
    data_sources: IndexMap<String, Arc<dyn DataSourceHandler>>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    /// Register every built-in resource and data source. Not yet bound
    /// to a server; call [`configure`](Self::configure) first.
    pub fn new() -> Self {
        Self::with_handlers(all_handlers(), all_data_sources())
    }

    pub fn with_handlers(
        resources: Vec<Arc<dyn ResourceHandler>>,
        data_sources: Vec<Arc<dyn DataSourceHandler>>,
    ) -> Self {
        let resources = resources.into_iter().map(|h| (h.type_name(), h)).collect();
        let data_sources = data_sources
            .into_iter()
            .map(|h| (h.type_name(), h))
            .collect();
        Self {
            inner: Arc::new(ProviderInner {
                client: RwLock::new(None),
                resources,
                data_sources,
            }),
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Bind the provider to a Nexus instance. Calls already in flight keep
    /// the client they started with.
    pub async fn configure(&self, config: &ProviderConfig) -> Result<(), CoreError> {
        let client = config.build_client()?;
        info!(url = %config.url, username = %config.username, "provider configured");
        self.bind(client).await;
        Ok(())
    }

    /// Bind a pre-built client.
    pub async fn bind(&self, client: NexusClient) {
        *self.inner.client.write().await = Some(client);
    }

    pub async fn is_configured(&self) -> bool {
        self.inner.client.read().await.is_some()
    }

    async fn context(&self, cancel: &CancellationToken) -> Result<OpContext, CoreError> {
        let client = self
            .inner
            .client
            .read()
            .await
            .clone()
            .ok_or(CoreError::NotConfigured)?;
        Ok(OpContext::new(client, cancel.clone()))
    }

    // ── Registry ─────────────────────────────────────────────────────

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.inner.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.inner.data_sources.keys().map(String::as_str)
    }

    pub fn resource(&self, type_name: &str) -> Result<&Arc<dyn ResourceHandler>, CoreError> {
        self.inner
            .resources
            .get(type_name)
            .ok_or_else(|| CoreError::UnknownResourceType(type_name.to_owned()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<&Arc<dyn DataSourceHandler>, CoreError> {
        self.inner
            .data_sources
            .get(type_name)
            .ok_or_else(|| CoreError::UnknownResourceType(type_name.to_owned()))
    }

    // ── Lifecycle routing ────────────────────────────────────────────

    pub async fn create(
        &self,
        type_name: &str,
        plan: Value,
        cancel: &CancellationToken,
    ) -> Result<Outcome, CoreError> {
        let handler = self.resource(type_name)?;
        let ctx = self.context(cancel).await?;
        debug!(resource = type_name, "create");
        Ok(handler.create(&ctx, plan).await)
    }

    pub async fn read(
        &self,
        type_name: &str,
        state: Value,
        cancel: &CancellationToken,
    ) -> Result<Outcome, CoreError> {
        let handler = self.resource(type_name)?;
        let ctx = self.context(cancel).await?;
        debug!(resource = type_name, "read");
        Ok(handler.read(&ctx, state).await)
    }

    pub async fn update(
        &self,
        type_name: &str,
        plan: Value,
        state: Value,
        cancel: &CancellationToken,
    ) -> Result<Outcome, CoreError> {
        let handler = self.resource(type_name)?;
        let ctx = self.context(cancel).await?;
        debug!(resource = type_name, "update");
        Ok(handler.update(&ctx, plan, state).await)
    }

    pub async fn delete(
        &self,
        type_name: &str,
        state: Value,
        cancel: &CancellationToken,
    ) -> Result<Outcome, CoreError> {
        let handler = self.resource(type_name)?;
        let ctx = self.context(cancel).await?;
        debug!(resource = type_name, "delete");
        Ok(handler.delete(&ctx, state).await)
    }

    pub async fn import(
        &self,
        type_name: &str,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Outcome, CoreError> {
        let handler = self.resource(type_name)?;
        let ctx = self.context(cancel).await?;
        debug!(resource = type_name, id, "import");
        Ok(handler.import(&ctx, id.to_owned()).await)
    }

    /// Rewrite persisted state to the current schema version. Pure; no
    /// configuration needed.
    pub fn upgrade_state(
        &self,
        type_name: &str,
        from_version: i64,
        state: Value,
    ) -> Result<Value, CoreError> {
        self.resource(type_name)?.upgrade_state(from_version, state)
    }

    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: Value,
        cancel: &CancellationToken,
    ) -> Result<Outcome, CoreError> {
        let handler = self.data_source(type_name)?;
        let ctx = self.context(cancel).await?;
        debug!(data_source = type_name, "read");
        Ok(handler.read(&ctx, config).await)
    }

    // ── Schema export ────────────────────────────────────────────────

    /// Attributes of the provider configuration block.
    pub fn config_schema() -> Schema {
        Schema::new("Connection to a Sonatype Nexus Repository instance.").attributes([
            Attribute::string("url")
                .required()
                .description("Base URL of the instance; the API root is {url}/service/rest."),
            Attribute::string("username").required().min_length(1),
            Attribute::string("password").required().sensitive(),
            Attribute::string("ca_cert").description("PEM file with an extra trusted CA."),
            Attribute::bool("insecure")
                .default(false)
                .description("Skip TLS certificate verification."),
            Attribute::int64("timeout_secs")
                .default(60)
                .at_least(1)
                .description("Per-request transport timeout."),
        ])
    }

    /// Every schema the provider serves, keyed by type name.
    pub fn schema_export(&self) -> Value {
        let resources: serde_json::Map<String, Value> = self
            .inner
            .resources
            .iter()
            .map(|(name, h)| (name.clone(), json!(h.schema())))
            .collect();
        let data_sources: serde_json::Map<String, Value> = self
            .inner
            .data_sources
            .iter()
            .map(|(name, h)| (name.clone(), json!(h.schema())))
            .collect();
        json!({
            "provider_name": PROVIDER_PREFIX,
            "provider": Self::config_schema(),
            "resource_schemas": resources,
            "data_source_schemas": data_sources,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn lifecycle_calls_need_configuration() {
        let provider = Provider::new();
        let err = provider
            .read(
                "sonatyperepo_security_realms",
                json!({ "active": [] }),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotConfigured));
    }

    #[tokio::test]
    async fn unknown_types_are_rejected_first() {
        let provider = Provider::new();
        let err = provider
            .create("sonatyperepo_nope", json!({}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownResourceType(name) if name == "sonatyperepo_nope"));
    }

    #[test]
    fn export_lists_every_type() {
        let provider = Provider::new();
        let export = provider.schema_export();
        let resources = export["resource_schemas"].as_object().unwrap();
        assert_eq!(resources.len(), provider.resource_types().count());
        assert!(resources.contains_key("sonatyperepo_repository_maven_proxy"));
        let s3 = &resources["sonatyperepo_blob_store_s3"];
        assert_eq!(s3["version"], 1);
        assert_eq!(
            export["data_source_schemas"].as_object().unwrap().len(),
            provider.data_source_types().count()
        );
        assert_eq!(export["provider"]["attributes"][2]["sensitive"], true);
    }

    #[test]
    fn upgrade_state_is_a_passthrough_at_the_current_version() {
        let provider = Provider::new();
        let state = json!({ "name": "r", "online": true });
        let upgraded = provider
            .upgrade_state("sonatyperepo_repository_raw_hosted", 0, state.clone())
            .unwrap();
        assert_eq!(upgraded, state);
    }
}
