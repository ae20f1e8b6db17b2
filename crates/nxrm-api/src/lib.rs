// nxrm-api: Async Rust client for the Sonatype Nexus Repository REST API
//
// Wire DTOs live under `types`; every endpoint group is an inherent
// `impl NexusClient` block in its own module under `endpoints`.

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod response;
pub mod transport;
pub mod types;

pub use auth::BasicAuth;
pub use client::NexusClient;
pub use endpoints::PrivilegeKind;
pub use error::{Error, StatusDetail};
pub use response::ApiResponse;
pub use transport::{TlsMode, TransportConfig};
