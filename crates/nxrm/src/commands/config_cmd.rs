//! Config subcommand handlers.

use std::io::BufRead;

use nxrm_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, InitArgs};
use crate::error::CliError;
use crate::output;

fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(config::load_config(global.config.as_deref())?)
}

fn missing(field: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: format!("--{field} is required for config init"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init(init) => init_profile(&init, global),
        ConfigCommand::Show => {
            let mut cfg = load(global)?;
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("<redacted>".into());
                }
            }
            let out = output::render_document(global.output, &cfg)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config::config_path);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::SetPassword => {
            let name = load(global)?.profile_name(global.profile.as_deref());
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            let password = line.trim_end_matches(['\r', '\n']);
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "empty password on stdin".into(),
                });
            }
            config::store_password(&name, password)?;
            if !global.quiet {
                eprintln!("password for profile '{name}' stored in the system keyring");
            }
            Ok(())
        }
    }
}

/// Write (or replace) a profile from the global connection flags. A
/// `--password` goes to the keyring, never to the file.
fn init_profile(args: &InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let url = global.url.clone().ok_or_else(|| missing("url"))?;
    let username = global.username.clone().ok_or_else(|| missing("username"))?;
    url::Url::parse(&url).map_err(|e| CliError::Validation {
        field: "url".into(),
        reason: e.to_string(),
    })?;

    let mut cfg = load(global)?;
    let name = global.profile.clone().unwrap_or_else(|| "default".into());
    let first = cfg.profiles.is_empty();

    cfg.profiles.insert(
        name.clone(),
        Profile {
            url,
            username,
            password_env: args.password_env.clone(),
            ca_cert: global.ca_cert.clone(),
            insecure: global.insecure.then_some(true),
            timeout_secs: global.timeout,
            ..Profile::default()
        },
    );
    if args.default || first {
        cfg.default_profile = Some(name.clone());
    }

    if let Some(ref password) = global.password {
        config::store_password(&name, password)?;
    }
    let path = config::save_config(&cfg, global.config.as_deref())?;
    if !global.quiet {
        eprintln!("profile '{name}' written to {}", path.display());
    }
    Ok(())
}
