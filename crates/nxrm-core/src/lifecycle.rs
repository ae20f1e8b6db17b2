//! The resource lifecycle engine.
//!
//! A [`Resource`] knows how to talk to one kind of remote entity using its
//! typed model. The [`Engine`] wraps it with the protocol every kind
//! shares and erases the model type behind [`ResourceHandler`] so the
//! provider can keep a heterogeneous registry:
//!
//! 1. fill schema defaults and validate the plan (no HTTP on failure)
//! 2. decode plan/state into the model and run the resource's pre-call guard
//! 3. run the remote call, racing it against the host's cancellation token
//! 4. classify the outcome (not-found becomes state removal plus a warning)
//! 5. stamp `last_updated` on create/update/import, preserve write-only
//!    attributes on read, prune keys the schema does not declare

use std::future::Future;

use futures::future::BoxFuture;
use nxrm_api::NexusClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CoreError, ErrorCategory};
use crate::merge;
use crate::schema::Schema;

/// Fixed prefix of every resource and data source type name.
pub const PROVIDER_PREFIX: &str = "sonatyperepo";

/// `sonatyperepo_<suffix>`
pub fn type_name(suffix: &str) -> String {
    format!("{PROVIDER_PREFIX}_{suffix}")
}

/// Human-readable `last_updated` value (RFC 850 layout, UTC).
pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%A, %d-%b-%y %H:%M:%S UTC")
        .to_string()
}

// ── Models ───────────────────────────────────────────────────────────

/// Models that record when this provider last mutated them.
pub trait Stamped {
    fn set_last_updated(&mut self, at: String);
}

/// Implement [`Stamped`] for models with a `last_updated: Option<String>`.
macro_rules! stamped {
    ($($model:ty),+ $(,)?) => {
        $(
            impl $crate::lifecycle::Stamped for $model {
                fn set_last_updated(&mut self, at: String) {
                    self.last_updated = Some(at);
                }
            }
        )+
    };
}
pub(crate) use stamped;

// ── Resource contract ────────────────────────────────────────────────

/// One remote entity kind, in terms of its typed model.
///
/// Implementations only perform the HTTP exchange and the DTO mapping;
/// status classification, timestamps, secret preservation and
/// cancellation belong to the [`Engine`].
pub trait Resource: Send + Sync + 'static {
    type Model: Serialize + DeserializeOwned + Clone + Stamped + Send + Sync;

    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    /// Natural key of an entity (synthetic and fixed for singletons).
    fn key(&self, model: &Self::Model) -> String;

    /// Pre-call guard for rules the schema cannot express.
    fn validate(&self, _plan: &Self::Model) -> Result<(), CoreError> {
        Ok(())
    }

    /// Create the entity; return the plan augmented with server-assigned fields.
    fn create(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
    ) -> impl Future<Output = Result<Self::Model, CoreError>> + Send;

    /// Fetch the entity; `None` means the server no longer has it.
    fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> impl Future<Output = Result<Option<Self::Model>, CoreError>> + Send;

    /// Apply `plan` to the entity addressed by `state`'s key.
    fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> impl Future<Output = Result<Self::Model, CoreError>> + Send;

    /// Delete the entity, or reset a singleton to its defaults.
    fn delete(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Minimal model carrying only the key, for import.
    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError>;

    /// Record the mutation time on a model about to become state.
    fn update_plan_for_state(&self, model: &mut Self::Model) {
        model.set_last_updated(timestamp());
    }

    /// Rewrite state persisted under an older schema version.
    fn upgrade_state(&self, from_version: i64, _state: Value) -> Result<Value, CoreError> {
        Err(CoreError::UnsupportedStateVersion {
            type_name: self.type_name(),
            from: from_version,
        })
    }
}

// ── Call context and outcome ─────────────────────────────────────────

/// Everything one lifecycle call needs from the provider and the host.
#[derive(Debug, Clone)]
pub struct OpContext {
    pub client: NexusClient,
    pub cancel: CancellationToken,
}

impl OpContext {
    pub fn new(client: NexusClient, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }
}

/// Result of a lifecycle call as seen by the host.
///
/// `state` is what the host should persist afterwards: `None` removes the
/// resource from state (after delete, or when a read finds it gone).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    pub id: Option<String>,
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl Outcome {
    fn ok(id: String, state: Value) -> Self {
        Self {
            id: Some(id),
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    fn removed(warning: Option<Diagnostic>) -> Self {
        Self {
            id: None,
            state: None,
            diagnostics: warning.into_iter().collect::<Vec<_>>().into(),
        }
    }

    /// Failure that leaves `state` (possibly nothing) untouched.
    fn failed(state: Option<Value>, diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            id: None,
            state,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Object-safe face of an [`Engine`], kept in the provider registry.
pub trait ResourceHandler: Send + Sync {
    fn type_name(&self) -> String;
    fn schema(&self) -> &Schema;
    fn create<'a>(&'a self, ctx: &'a OpContext, plan: Value) -> BoxFuture<'a, Outcome>;
    fn read<'a>(&'a self, ctx: &'a OpContext, state: Value) -> BoxFuture<'a, Outcome>;
    fn update<'a>(&'a self, ctx: &'a OpContext, plan: Value, state: Value)
    -> BoxFuture<'a, Outcome>;
    fn delete<'a>(&'a self, ctx: &'a OpContext, state: Value) -> BoxFuture<'a, Outcome>;
    fn import<'a>(&'a self, ctx: &'a OpContext, id: String) -> BoxFuture<'a, Outcome>;
    fn upgrade_state(&self, from_version: i64, state: Value) -> Result<Value, CoreError>;
}

/// Race a remote call against cancellation. Dropping the call future
/// aborts the in-flight request.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, CoreError>>,
) -> Result<T, CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::Cancelled),
        result = fut => result,
    }
}

// ── Engine ───────────────────────────────────────────────────────────

/// Runs the shared lifecycle protocol for one [`Resource`].
pub struct Engine<R: Resource> {
    resource: R,
    schema: Schema,
    type_name: String,
}

impl<R: Resource> Engine<R> {
    pub fn new(resource: R) -> Self {
        let schema = resource.schema();
        let type_name = resource.type_name();
        Self {
            resource,
            schema,
            type_name,
        }
    }

    /// Defaults, schema validation, decode and the resource's own guard.
    fn prepare_plan(&self, plan: &mut Value) -> Result<R::Model, Vec<Diagnostic>> {
        self.schema.apply_defaults(plan);
        let diags = self.schema.validate(plan);
        if diags.iter().any(Diagnostic::is_error) {
            return Err(diags);
        }
        let model = self
            .decode(plan, "plan")
            .map_err(|e| vec![e.to_diagnostic("Invalid plan")])?;
        self.resource
            .validate(&model)
            .map_err(|e| vec![e.to_diagnostic("Invalid plan")])?;
        Ok(model)
    }

    fn decode(&self, value: &Value, what: &str) -> Result<R::Model, CoreError> {
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::decode(format!("{} {what}", self.type_name), e))
    }

    fn encode(&self, model: &R::Model) -> Result<Value, CoreError> {
        let mut value = serde_json::to_value(model)
            .map_err(|e| CoreError::decode(format!("{} state", self.type_name), e))?;
        self.schema.retain_known(&mut value);
        Ok(value)
    }

    fn gone_warning(&self, key: &str) -> Diagnostic {
        Diagnostic::warning(
            format!("{} {key:?} no longer exists", self.type_name),
            "The remote entity was not found; it has been removed from state so the next plan recreates it.",
        )
    }

    pub async fn create(&self, ctx: &OpContext, mut plan: Value) -> Outcome {
        let model = match self.prepare_plan(&mut plan) {
            Ok(m) => m,
            Err(diags) => return Outcome::failed(None, diags),
        };
        let summary = format!("Error creating {}", self.type_name);

        let result = cancellable(&ctx.cancel, self.resource.create(&ctx.client, &model)).await;
        let mut created = match result {
            Ok(m) => m,
            Err(e) => return Outcome::failed(None, vec![e.to_diagnostic(summary)]),
        };
        self.resource.update_plan_for_state(&mut created);

        match self.encode(&created) {
            Ok(mut state) => {
                merge::map_missing_api_fields_from_plan(&self.schema, &plan, &mut state);
                let key = self.resource.key(&created);
                info!(resource = %self.type_name, key = %key, "created");
                Outcome::ok(key, state)
            }
            Err(e) => Outcome::failed(None, vec![e.to_diagnostic(summary)]),
        }
    }

    pub async fn read(&self, ctx: &OpContext, state: Value) -> Outcome {
        let summary = format!("Error reading {}", self.type_name);
        let prior = match self.decode(&state, "state") {
            Ok(m) => m,
            Err(e) => return Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        };
        let key = self.resource.key(&prior);

        match cancellable(&ctx.cancel, self.resource.read(&ctx.client, &prior)).await {
            Ok(Some(fresh)) => match self.encode(&fresh) {
                Ok(mut refreshed) => {
                    merge::preserve_unreadable(&self.schema, &state, &mut refreshed);
                    Outcome::ok(key, refreshed)
                }
                Err(e) => Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
            },
            Ok(None) => {
                warn!(resource = %self.type_name, key = %key, "remote entity vanished; removing from state");
                Outcome::removed(Some(self.gone_warning(&key)))
            }
            Err(e) if e.is_not_found() => {
                warn!(resource = %self.type_name, key = %key, "remote entity vanished; removing from state");
                Outcome::removed(Some(self.gone_warning(&key)))
            }
            Err(e) => Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        }
    }

    pub async fn update(&self, ctx: &OpContext, mut plan: Value, state: Value) -> Outcome {
        let summary = format!("Error updating {}", self.type_name);
        let planned = match self.prepare_plan(&mut plan) {
            Ok(m) => m,
            Err(diags) => return Outcome::failed(Some(state), diags),
        };
        let prior = match self.decode(&state, "state") {
            Ok(m) => m,
            Err(e) => return Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        };
        let key = self.resource.key(&prior);

        let result = cancellable(
            &ctx.cancel,
            self.resource.update(&ctx.client, &planned, &prior),
        )
        .await;
        let mut updated = match result {
            Ok(m) => m,
            Err(e) if e.is_not_found() => {
                warn!(resource = %self.type_name, key = %key, "update target vanished; removing from state");
                return Outcome::removed(Some(self.gone_warning(&key)));
            }
            Err(e) => return Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        };
        self.resource.update_plan_for_state(&mut updated);

        match self.encode(&updated) {
            Ok(mut new_state) => {
                merge::map_missing_api_fields_from_plan(&self.schema, &plan, &mut new_state);
                let key = self.resource.key(&updated);
                info!(resource = %self.type_name, key = %key, "updated");
                Outcome::ok(key, new_state)
            }
            Err(e) => Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        }
    }

    pub async fn delete(&self, ctx: &OpContext, state: Value) -> Outcome {
        let summary = format!("Error deleting {}", self.type_name);
        let prior = match self.decode(&state, "state") {
            Ok(m) => m,
            Err(e) => return Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        };
        let key = self.resource.key(&prior);

        match cancellable(&ctx.cancel, self.resource.delete(&ctx.client, &prior)).await {
            Ok(()) => {
                info!(resource = %self.type_name, key = %key, "deleted");
                Outcome::removed(None)
            }
            Err(e) if e.is_not_found() => {
                warn!(resource = %self.type_name, key = %key, "already absent on delete");
                Outcome::removed(Some(Diagnostic::warning(
                    format!("{} {key:?} was already deleted", self.type_name),
                    "The server reported the entity as absent; it has been removed from state.",
                )))
            }
            Err(e) => Outcome::failed(Some(state), vec![e.to_diagnostic(summary)]),
        }
    }

    pub async fn import(&self, ctx: &OpContext, id: String) -> Outcome {
        let summary = format!("Error importing {}", self.type_name);
        let seed = match self.resource.import_model(&id) {
            Ok(m) => m,
            Err(e) => return Outcome::failed(None, vec![e.to_diagnostic(summary)]),
        };

        let mut imported = match cancellable(&ctx.cancel, self.resource.read(&ctx.client, &seed)).await
        {
            Ok(Some(m)) => m,
            Ok(None) => {
                return Outcome::failed(
                    None,
                    vec![
                        Diagnostic::error(
                            summary,
                            format!("Cannot import non-existent remote object {id:?}"),
                        )
                        .with_category(ErrorCategory::NotFound),
                    ],
                );
            }
            Err(e) => return Outcome::failed(None, vec![e.to_diagnostic(summary)]),
        };
        self.resource.update_plan_for_state(&mut imported);

        match self.encode(&imported) {
            Ok(state) => {
                let key = self.resource.key(&imported);
                info!(resource = %self.type_name, key = %key, "imported");
                Outcome::ok(key, state)
            }
            Err(e) => Outcome::failed(None, vec![e.to_diagnostic(summary)]),
        }
    }
}

impl<R: Resource> ResourceHandler for Engine<R> {
    fn type_name(&self) -> String {
        self.type_name.clone()
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn create<'a>(&'a self, ctx: &'a OpContext, plan: Value) -> BoxFuture<'a, Outcome> {
        Box::pin(Engine::create(self, ctx, plan))
    }

    fn read<'a>(&'a self, ctx: &'a OpContext, state: Value) -> BoxFuture<'a, Outcome> {
        Box::pin(Engine::read(self, ctx, state))
    }

    fn update<'a>(
        &'a self,
        ctx: &'a OpContext,
        plan: Value,
        state: Value,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(Engine::update(self, ctx, plan, state))
    }

    fn delete<'a>(&'a self, ctx: &'a OpContext, state: Value) -> BoxFuture<'a, Outcome> {
        Box::pin(Engine::delete(self, ctx, state))
    }

    fn import<'a>(&'a self, ctx: &'a OpContext, id: String) -> BoxFuture<'a, Outcome> {
        Box::pin(Engine::import(self, ctx, id))
    }

    fn upgrade_state(&self, from_version: i64, state: Value) -> Result<Value, CoreError> {
        if from_version == self.schema.version {
            return Ok(state);
        }
        self.resource.upgrade_state(from_version, state)
    }
}
