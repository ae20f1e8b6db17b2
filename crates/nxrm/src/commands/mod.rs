//! Command dispatch: bridges CLI args -> provider calls -> output formatting.

pub mod config_cmd;
pub mod lifecycle;
pub mod schema;
pub mod util;

use nxrm_core::Provider;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs a configured provider.
pub async fn dispatch(cmd: Command, provider: &Provider, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Create(args) => lifecycle::create(provider, args, global).await,
        Command::Read(args) => lifecycle::read(provider, args, global).await,
        Command::Update(args) => lifecycle::update(provider, args, global).await,
        Command::Delete(args) => lifecycle::delete(provider, args, global).await,
        Command::Import(args) => lifecycle::import(provider, args, global).await,
        Command::Data(args) => lifecycle::data(provider, args, global).await,
        // Offline commands are handled before a connection is made
        Command::Types(_)
        | Command::Schema(_)
        | Command::Upgrade(_)
        | Command::Config(_)
        | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "command does not need a connection".into(),
        }),
    }
}
