//! Read-only data sources.
//!
//! A [`DataSource`] issues one or more GETs and renders the result as a
//! typed output. The [`DataSourceEngine`] validates the host's arguments,
//! races the call against cancellation and prunes the output to the
//! declared schema. Data sources never carry `last_updated`.

use std::future::Future;

use futures::future::BoxFuture;
use nxrm_api::NexusClient;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::CoreError;
use crate::lifecycle::{OpContext, Outcome, cancellable};
use crate::schema::Schema;

pub trait DataSource: Send + Sync + 'static {
    type Output: Serialize + Send;

    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    /// Fetch and render. `config` has already passed schema validation.
    fn read(
        &self,
        client: &NexusClient,
        config: &Value,
    ) -> impl Future<Output = Result<Self::Output, CoreError>> + Send;

    /// Identifier reported back to the host.
    fn id(&self, _config: &Value) -> String {
        self.type_name()
    }
}

/// Object-safe face of a [`DataSourceEngine`].
pub trait DataSourceHandler: Send + Sync {
    fn type_name(&self) -> String;
    fn schema(&self) -> &Schema;
    fn read<'a>(&'a self, ctx: &'a OpContext, config: Value) -> BoxFuture<'a, Outcome>;
}

pub struct DataSourceEngine<D: DataSource> {
    source: D,
    schema: Schema,
    type_name: String,
}

impl<D: DataSource> DataSourceEngine<D> {
    pub fn new(source: D) -> Self {
        let schema = source.schema();
        let type_name = source.type_name();
        Self {
            source,
            schema,
            type_name,
        }
    }

    fn failed(diagnostics: impl Into<Diagnostics>) -> Outcome {
        Outcome {
            id: None,
            state: None,
            diagnostics: diagnostics.into(),
        }
    }

    pub async fn read(&self, ctx: &OpContext, config: Value) -> Outcome {
        let config = if config.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            config
        };
        let diags = self.schema.validate(&config);
        if diags.iter().any(Diagnostic::is_error) {
            return Self::failed(diags);
        }

        let summary = format!("Error reading {}", self.type_name);
        let output = match cancellable(&ctx.cancel, self.source.read(&ctx.client, &config)).await {
            Ok(o) => o,
            Err(e) => return Self::failed(vec![e.to_diagnostic(summary)]),
        };

        let mut state = match serde_json::to_value(&output) {
            Ok(v) => v,
            Err(e) => {
                let err = CoreError::decode(format!("{} output", self.type_name), e);
                return Self::failed(vec![err.to_diagnostic(summary)]);
            }
        };
        self.schema.retain_known(&mut state);
        debug!(data_source = %self.type_name, "read");

        Outcome {
            id: Some(self.source.id(&config)),
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }
}

impl<D: DataSource> DataSourceHandler for DataSourceEngine<D> {
    fn type_name(&self) -> String {
        self.type_name.clone()
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn read<'a>(&'a self, ctx: &'a OpContext, config: Value) -> BoxFuture<'a, Outcome> {
        Box::pin(DataSourceEngine::read(self, ctx, config))
    }
}
