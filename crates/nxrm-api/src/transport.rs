// Connection settings for a Nexus instance: certificate trust, request
// timeout and the User-Agent sent with every call.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// How the server certificate of a Nexus instance is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Platform trust roots only.
    #[default]
    System,
    /// Platform roots plus a PEM bundle, typically an internal CA that
    /// signed the repository manager's certificate.
    CustomCa(PathBuf),
    /// Skip verification. Only meant for lab instances serving a
    /// self-signed certificate.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Upper bound for a single request, including blob store and
    /// repository calls that Nexus answers slowly under load.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(60),
            user_agent: concat!("nxrm/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());
        self.tls
            .configure(builder)?
            .build()
            .map_err(|e| Error::Tls(format!("cannot initialise HTTP client for Nexus: {e}")))
    }
}

impl TlsMode {
    fn configure(&self, builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder, Error> {
        Ok(match self {
            Self::System => builder,
            Self::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("cannot read CA bundle {}: {e}", path.display()))
                })?;
                let ca = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    Error::Tls(format!("{} is not a PEM certificate: {e}", path.display()))
                })?;
                builder.add_root_certificate(ca)
            }
            Self::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/nexus-ca.pem")),
            ..TransportConfig::default()
        };
        let err = config.build_client().unwrap_err();
        assert!(matches!(err, Error::Tls(ref msg) if msg.contains("nexus-ca.pem")));
        assert!(err.is_transport());
    }

    #[test]
    fn lab_mode_builds() {
        let config = TransportConfig {
            tls: TlsMode::DangerAcceptInvalid,
            ..TransportConfig::default()
        };
        assert!(config.build_client().is_ok());
    }
}
