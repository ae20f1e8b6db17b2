// Endpoint groups, one inherent `impl NexusClient` block per API area.
//
// Mutating and single-entity calls return the raw `ApiResponse` so the
// lifecycle layer owns status interpretation. List helpers used by data
// sources decode directly and treat anything but 200 as an error.

mod blob_stores;
mod capabilities;
mod policies;
mod repositories;
mod security;
mod system;
mod tasks;

pub use security::PrivilegeKind;
