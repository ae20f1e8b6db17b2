mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use nxrm_config::Overrides;
use nxrm_core::Provider;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::{CliError, exit_code};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let provider = Provider::new();
    let global = &cli.global;

    match cli.command {
        // Offline commands never touch the server
        Command::Types(ref args) => commands::schema::types(&provider, args, global),
        Command::Schema(ref args) => commands::schema::schema(&provider, args, global),
        Command::Upgrade(ref args) => commands::lifecycle::upgrade(&provider, args, global),
        Command::Config(args) => commands::config_cmd::handle(args, global),

        Command::Completions(ref args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "nxrm", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            configure(&provider, global).await?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &provider, global).await
        }
    }
}

/// Bind the provider from the config file, profile and flag overrides.
async fn configure(provider: &Provider, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = nxrm_config::load_config(global.config.as_deref())?;
    let overrides = Overrides {
        profile: global.profile.clone(),
        url: global.url.clone(),
        username: global.username.clone(),
        password: global.password.clone().map(SecretString::from),
        ca_cert: global.ca_cert.clone(),
        insecure: global.insecure,
        timeout_secs: global.timeout,
    };
    let config = cfg.provider_config(&overrides)?;
    provider.configure(&config).await?;
    Ok(())
}
