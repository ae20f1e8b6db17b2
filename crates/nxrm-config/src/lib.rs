//! Provider configuration for nxrm.
//!
//! TOML profiles layered with environment variables, password resolution
//! (flag, env, keyring, plaintext) and translation to
//! `nxrm_core::ProviderConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nxrm_core::{ProviderConfig, TlsVerification};

/// Keyring service under which passwords are stored, one entry per profile.
pub const KEYRING_SERVICE: &str = "nxrm";

/// Environment variable consulted before any stored password.
pub const PASSWORD_ENV: &str = "NXRM_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{0}' not found in config")]
    UnknownProfile(String),

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Nexus instances.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

/// One Nexus instance.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Base URL, e.g. `https://nexus.example.com:8081`.
    pub url: String,

    pub username: String,

    /// Plaintext password. Prefer the keyring or `password_env`.
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,

    /// PEM file with an extra trusted CA.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout_secs: Option<u64>,
}

/// Values given on the command line. Each one beats the profile.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub profile: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub ca_cert: Option<PathBuf>,
    pub insecure: bool,
    pub timeout_secs: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "nxrm", "nxrm").map_or_else(
        || PathBuf::from(".nxrm").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the configuration: built-in defaults, then the TOML file (the
/// explicit path or the platform one), then `NXRM_` variables. Nested keys
/// use a double underscore, e.g. `NXRM_DEFAULTS__TIMEOUT_SECS`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("NXRM_").split("__").ignore(&["password", "url", "username"]));

    Ok(figment.extract()?)
}

/// Serialize config to TOML and write it to `path` (or the platform path).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, toml::to_string_pretty(cfg)?)?;
    Ok(path)
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve the password: explicit flag, `NXRM_PASSWORD`, the profile's
/// `password_env`, the OS keyring, then the plaintext file entry.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    flag: Option<&SecretString>,
) -> Result<SecretString, ConfigError> {
    if let Some(pw) = flag {
        return Ok(pw.clone());
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(SecretString::from(pw));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile password in the OS keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Name of the profile a call should use.
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Build the provider configuration for the selected profile.
    ///
    /// Flags may stand in for a missing profile entirely, so
    /// `--url`, `--username` and a password are enough without any file.
    pub fn provider_config(&self, overrides: &Overrides) -> Result<ProviderConfig, ConfigError> {
        let name = self.profile_name(overrides.profile.as_deref());
        let profile = match self.profiles.get(&name) {
            Some(p) => p.clone(),
            None if overrides.url.is_some() => Profile::default(),
            None => return Err(ConfigError::UnknownProfile(name)),
        };

        let raw_url = overrides.url.clone().unwrap_or(profile.url.clone());
        let url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {raw_url:?}"),
        })?;

        let username = overrides
            .username
            .clone()
            .or_else(|| std::env::var("NXRM_USERNAME").ok())
            .unwrap_or(profile.username.clone());
        if username.is_empty() {
            return Err(ConfigError::Validation {
                field: "username".into(),
                reason: "must not be empty".into(),
            });
        }

        let password = resolve_password(&profile, &name, overrides.password.as_ref())?;

        let insecure = overrides.insecure || profile.insecure.unwrap_or(self.defaults.insecure);
        let tls = if insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ca) = overrides.ca_cert.clone().or(profile.ca_cert) {
            TlsVerification::CustomCa(ca)
        } else {
            TlsVerification::SystemDefaults
        };

        let timeout_secs = overrides
            .timeout_secs
            .or(profile.timeout_secs)
            .unwrap_or(self.defaults.timeout_secs);
        if timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        let mut config = ProviderConfig::new(url, username, password);
        config.tls = tls;
        config.timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::result_large_err)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
        default_profile = "lab"

        [defaults]
        timeout_secs = 15

        [profiles.lab]
        url = "https://nexus.lab:8443"
        username = "admin"
        password = "from-file"
        ca_cert = "/etc/ssl/lab.pem"

        [profiles.prod]
        url = "https://nexus.example.com"
        username = "deployer"
        password_env = "PROD_NEXUS_PW"
        timeout_secs = 120
    "#;

    fn load(jail: &Jail) -> Config {
        load_config(Some(&jail.directory().join("nxrm.toml"))).unwrap()
    }

    #[test]
    fn file_profile_becomes_provider_config() {
        Jail::expect_with(|jail| {
            jail.create_file("nxrm.toml", SAMPLE)?;
            let cfg = load(jail).provider_config(&Overrides::default()).unwrap();
            assert_eq!(cfg.url.as_str(), "https://nexus.lab:8443/");
            assert_eq!(cfg.username, "admin");
            assert_eq!(cfg.password.expose_secret(), "from-file");
            assert_eq!(cfg.tls, TlsVerification::CustomCa("/etc/ssl/lab.pem".into()));
            assert_eq!(cfg.timeout, Duration::from_secs(15));
            Ok(())
        });
    }

    #[test]
    fn password_env_indirection_and_profile_timeout() {
        Jail::expect_with(|jail| {
            jail.create_file("nxrm.toml", SAMPLE)?;
            jail.set_env("PROD_NEXUS_PW", "from-env");
            let overrides = Overrides {
                profile: Some("prod".into()),
                ..Overrides::default()
            };
            let cfg = load(jail).provider_config(&overrides).unwrap();
            assert_eq!(cfg.password.expose_secret(), "from-env");
            assert_eq!(cfg.timeout, Duration::from_secs(120));
            assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
            Ok(())
        });
    }

    #[test]
    fn nxrm_password_beats_the_file_and_flag_beats_both() {
        Jail::expect_with(|jail| {
            jail.create_file("nxrm.toml", SAMPLE)?;
            jail.set_env(PASSWORD_ENV, "from-nxrm-env");
            let config = load(jail);

            let cfg = config.provider_config(&Overrides::default()).unwrap();
            assert_eq!(cfg.password.expose_secret(), "from-nxrm-env");

            let overrides = Overrides {
                password: Some(SecretString::from("from-flag".to_owned())),
                insecure: true,
                ..Overrides::default()
            };
            let cfg = config.provider_config(&overrides).unwrap();
            assert_eq!(cfg.password.expose_secret(), "from-flag");
            assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("nxrm.toml", SAMPLE)?;
            jail.set_env("NXRM_DEFAULTS__TIMEOUT_SECS", "5");
            assert_eq!(load(jail).defaults.timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn flags_alone_are_enough_without_a_file() {
        Jail::expect_with(|jail| {
            let overrides = Overrides {
                url: Some("http://localhost:8081".into()),
                username: Some("admin".into()),
                password: Some(SecretString::from("admin123".to_owned())),
                ..Overrides::default()
            };
            let cfg = load(jail).provider_config(&overrides).unwrap();
            assert_eq!(cfg.timeout, Duration::from_secs(60));
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_and_bad_url_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("nxrm.toml", SAMPLE)?;
            let config = load(jail);
            let missing = Overrides {
                profile: Some("nope".into()),
                ..Overrides::default()
            };
            assert!(matches!(
                config.provider_config(&missing),
                Err(ConfigError::UnknownProfile(name)) if name == "nope"
            ));

            let bad = Overrides {
                url: Some("not a url".into()),
                ..Overrides::default()
            };
            assert!(matches!(
                config.provider_config(&bad),
                Err(ConfigError::Validation { field, .. }) if field == "url"
            ));
            Ok(())
        });
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                url: "http://localhost:8081".into(),
                username: "admin".into(),
                ..Profile::default()
            },
        );
        save_config(&config, Some(&path)).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.profiles["default"].username, "admin");
        assert_eq!(loaded.defaults.timeout_secs, 60);
    }
}
