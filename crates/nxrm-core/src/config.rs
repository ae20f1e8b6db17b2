// ── Provider connection configuration ──
//
// How to reach and authenticate against one Nexus instance. Built by the
// config crate (or a test) and handed to `Provider::configure`; core never
// reads files or the environment itself.

use std::path::PathBuf;
use std::time::Duration;

use nxrm_api::{BasicAuth, NexusClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Trust an extra CA certificate (PEM file).
    CustomCa(PathBuf),
    /// Skip verification. Lab instances with self-signed certificates only.
    DangerAcceptInvalid,
}

/// Everything the provider needs to talk to one Nexus instance.
///
/// Immutable once bound: every lifecycle call clones the client built
/// from it and never looks at the configuration again.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Nexus root URL, e.g. `https://nexus.example.com:8081`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request transport timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }

    /// Build the shared client. No request is sent.
    pub fn build_client(&self) -> Result<NexusClient, CoreError> {
        if self.username.is_empty() {
            return Err(CoreError::validation("username", "must not be empty"));
        }
        let auth = BasicAuth::new(self.username.clone(), self.password.clone());
        Ok(NexusClient::new(self.url.as_str(), auth, &self.transport())?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig::new(
            Url::parse("https://nexus.example.com:8081").unwrap(),
            "admin",
            SecretString::from("admin123".to_owned()),
        )
    }

    #[test]
    fn client_points_at_the_rest_root() {
        let client = config().build_client().unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://nexus.example.com:8081/service/rest/"
        );
        assert_eq!(client.username(), "admin");
    }

    #[test]
    fn empty_username_is_rejected() {
        let cfg = ProviderConfig {
            username: String::new(),
            ..config()
        };
        assert!(matches!(cfg.build_client(), Err(CoreError::Validation { .. })));
    }

    #[test]
    fn debug_output_redacts_the_password() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("admin123"));
    }
}
