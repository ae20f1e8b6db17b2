//! Resource lifecycle core for a Sonatype Nexus Repository provider.
//!
//! This crate owns the domain models, the shared lifecycle protocol and
//! every managed resource kind:
//!
//! - **[`Provider`]**: Facade a host drives. Bind a [`ProviderConfig`]
//!   once, then route create/read/update/delete/import calls and data
//!   source reads by type name. Also renders every schema as JSON.
//!
//! - **[`Engine`]**: Runs the protocol shared by all resources (defaults,
//!   plan validation, cancellation, not-found handling, `last_updated`
//!   stamping, write-only preservation) around a typed [`Resource`].
//!
//! - **[`Dispatcher`]**: Turns a per-variant [`TypeDescriptor`] into a
//!   resource, so privilege, capability and task families share one
//!   implementation.
//!
//! - **[`Schema`]**: Declarative attribute descriptions driving
//!   validation, defaults, pruning and the exported schema.
//!
//! - **Resources** ([`resources`]) and **data sources** ([`data_sources`]).

pub mod config;
pub mod data_sources;
pub mod datasource;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod merge;
pub mod property_bag;
pub mod provider;
pub mod resources;
pub mod schema;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ProviderConfig, TlsVerification};
pub use datasource::{DataSource, DataSourceEngine, DataSourceHandler};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use dispatch::{Dispatcher, TypeDescriptor};
pub use error::{CoreError, ErrorCategory};
pub use lifecycle::{
    Engine, OpContext, Outcome, PROVIDER_PREFIX, Resource, ResourceHandler, Stamped, timestamp,
    type_name,
};
pub use provider::Provider;
pub use schema::{Attribute, AttributeType, LAST_UPDATED, Schema};

// Re-exported so hosts can build tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;
