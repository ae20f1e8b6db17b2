//! Wire types for the Nexus Repository REST API (`/service/rest/v1`).
//!
//! Plain data containers. Field names follow the server's camelCase JSON via
//! `#[serde(rename_all = "camelCase")]`; optional fields are skipped when
//! absent so request bodies only carry what the caller set.

pub mod blob_store;
pub mod capability;
pub mod policy;
pub mod repository;
pub mod security;
pub mod system;
pub mod task;

pub use blob_store::*;
pub use capability::*;
pub use policy::*;
pub use repository::*;
pub use security::*;
pub use system::*;
pub use task::*;
