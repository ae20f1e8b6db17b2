//! Resource lifecycle and data-source commands.
//!
//! Each prints the outcome document (`id`, `state`, `diagnostics`) on
//! stdout, even on failure, so a host can persist whatever state survived.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use nxrm_core::{Outcome, Provider};

use crate::cli::{DataArgs, GlobalOpts, ImportArgs, PlanArgs, StateArgs, UpdateArgs, UpgradeArgs};
use crate::commands::util::read_json;
use crate::error::CliError;
use crate::output;

/// Token cancelled on Ctrl-C. The in-flight request is dropped and the
/// call reports a cancelled diagnostic.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received; cancelling");
            child.cancel();
        }
    });
    token
}

/// Print an outcome and turn error diagnostics into a failing exit.
fn report(outcome: &Outcome, cancel: &CancellationToken, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_document(global.output, outcome)?;
    output::print_output(&out, global.quiet);
    output::print_diagnostics(
        &outcome.diagnostics,
        output::should_color(global.color),
        global.quiet,
    );

    if !outcome.has_errors() {
        return Ok(());
    }
    if cancel.is_cancelled() {
        return Err(CliError::Cancelled);
    }
    let first = outcome.diagnostics.errors().next();
    Err(CliError::OperationFailed {
        summary: first.map_or_else(|| "Operation failed".to_owned(), |d| d.summary.clone()),
        category: first.and_then(|d| d.category),
    })
}

pub async fn create(provider: &Provider, args: PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let plan = read_json(&args.plan, "plan")?;
    let cancel = interrupt_token();
    let outcome = provider.create(&args.type_name, plan, &cancel).await?;
    report(&outcome, &cancel, global)
}

pub async fn read(provider: &Provider, args: StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let state = read_json(&args.state, "state")?;
    let cancel = interrupt_token();
    let outcome = provider.read(&args.type_name, state, &cancel).await?;
    report(&outcome, &cancel, global)
}

pub async fn update(provider: &Provider, args: UpdateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let plan = read_json(&args.plan, "plan")?;
    let state = read_json(&args.state, "state")?;
    let cancel = interrupt_token();
    let outcome = provider.update(&args.type_name, plan, state, &cancel).await?;
    report(&outcome, &cancel, global)
}

pub async fn delete(provider: &Provider, args: StateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let state = read_json(&args.state, "state")?;
    let cancel = interrupt_token();
    let outcome = provider.delete(&args.type_name, state, &cancel).await?;
    report(&outcome, &cancel, global)
}

pub async fn import(provider: &Provider, args: ImportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cancel = interrupt_token();
    let outcome = provider.import(&args.type_name, &args.id, &cancel).await?;
    report(&outcome, &cancel, global)
}

pub async fn data(provider: &Provider, args: DataArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = match args.args {
        Some(ref path) => read_json(path, "args")?,
        None => Value::Null,
    };
    let cancel = interrupt_token();
    let outcome = provider
        .read_data_source(&args.type_name, config, &cancel)
        .await?;
    report(&outcome, &cancel, global)
}

/// Pure state rewrite; needs no connection.
pub fn upgrade(provider: &Provider, args: &UpgradeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let state = read_json(&args.state, "state")?;
    let upgraded = provider.upgrade_state(&args.type_name, args.from_version, state)?;
    let out = output::render_document(global.output, &upgraded)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
