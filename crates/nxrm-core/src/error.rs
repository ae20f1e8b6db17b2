// ── Core error types ──
//
// Everything a lifecycle call can fail with. API failures stay wrapped so
// the diagnostic layer can still reach the remote status line and body;
// `category()` folds every variant into the reconciliation taxonomy.

use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// Coarse classification that decides how a failure is surfaced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected before any HTTP call, or a 400 from the server.
    Validation,
    /// The entity does not exist remotely.
    NotFound,
    /// 401 / 403.
    Unauthorized,
    /// 409, typically a duplicate name.
    Conflict,
    /// No HTTP status was produced (connect, TLS, timeout, cancellation).
    Transport,
    /// A status outside the set the call declared as success.
    UnexpectedStatus,
    /// Decode failures and broken server contracts.
    Internal,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Plan-time errors ─────────────────────────────────────────────
    #[error("Invalid value for {attribute}: {message}")]
    Validation { attribute: String, message: String },

    #[error("Cannot decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Remote errors ────────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] nxrm_api::Error),

    #[error("Server response violates the API contract: {0}")]
    ContractViolation(String),

    // ── Provider errors ──────────────────────────────────────────────
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Provider is not configured; call configure() before any lifecycle operation")]
    NotConfigured,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Cannot upgrade {type_name} state from schema version {from}")]
    UnsupportedStateVersion { type_name: String, from: i64 },
}

impl CoreError {
    pub fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn decode(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            what: what.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Api(e) => match e {
                nxrm_api::Error::BadRequest(_) => ErrorCategory::Validation,
                nxrm_api::Error::NotFound(_) => ErrorCategory::NotFound,
                nxrm_api::Error::Unauthorized(_) | nxrm_api::Error::Forbidden(_) => {
                    ErrorCategory::Unauthorized
                }
                nxrm_api::Error::Conflict(_) => ErrorCategory::Conflict,
                nxrm_api::Error::UnexpectedStatus { .. } => ErrorCategory::UnexpectedStatus,
                nxrm_api::Error::Transport(_)
                | nxrm_api::Error::Tls(_)
                | nxrm_api::Error::InvalidUrl(_) => ErrorCategory::Transport,
                nxrm_api::Error::Serialization(_) | nxrm_api::Error::Deserialization { .. } => {
                    ErrorCategory::Internal
                }
            },
            Self::Cancelled => ErrorCategory::Transport,
            Self::Decode { .. }
            | Self::ContractViolation(_)
            | Self::UnknownResourceType(_)
            | Self::NotConfigured
            | Self::UnsupportedStateVersion { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Render as an error diagnostic: `summary` names the operation, the
    /// detail carries the remote status line and body excerpt when there
    /// is one.
    pub fn to_diagnostic(&self, summary: impl Into<String>) -> Diagnostic {
        let detail = match self {
            Self::Api(e) => match e.detail() {
                Some(d) => {
                    let headline = match self.category() {
                        ErrorCategory::Unauthorized => {
                            "The configured credentials are not sufficient for this call."
                        }
                        ErrorCategory::Conflict => {
                            "The server reports a conflicting entity, usually a duplicate name."
                        }
                        _ => "The server rejected the request.",
                    };
                    format!("{headline}\n{}\n{}", d.status_line(), d.body)
                }
                None => e.to_string(),
            },
            Self::Validation { attribute, message } => format!("{attribute}: {message}"),
            other => other.to_string(),
        };
        let mut diag = Diagnostic::error(summary, detail).with_category(self.category());
        if let Self::Validation { attribute, .. } = self {
            diag = diag.with_attribute(attribute.clone());
        }
        diag
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nxrm_api::StatusDetail;

    use super::*;

    fn api(status: u16) -> CoreError {
        let detail = StatusDetail::new("POST", "/service/rest/v1/security/roles", status, "boom");
        CoreError::Api(match status {
            400 => nxrm_api::Error::BadRequest(detail),
            401 => nxrm_api::Error::Unauthorized(detail),
            403 => nxrm_api::Error::Forbidden(detail),
            404 => nxrm_api::Error::NotFound(detail),
            409 => nxrm_api::Error::Conflict(detail),
            _ => nxrm_api::Error::UnexpectedStatus {
                detail,
                expected: vec![201],
            },
        })
    }

    #[test]
    fn status_codes_map_to_categories() {
        assert_eq!(api(400).category(), ErrorCategory::Validation);
        assert_eq!(api(401).category(), ErrorCategory::Unauthorized);
        assert_eq!(api(403).category(), ErrorCategory::Unauthorized);
        assert_eq!(api(404).category(), ErrorCategory::NotFound);
        assert_eq!(api(409).category(), ErrorCategory::Conflict);
        assert_eq!(api(500).category(), ErrorCategory::UnexpectedStatus);
        assert_eq!(CoreError::Cancelled.category(), ErrorCategory::Transport);
    }

    #[test]
    fn diagnostic_detail_carries_status_line_and_body() {
        let diag = api(409).to_diagnostic("Error creating role");
        assert_eq!(diag.summary, "Error creating role");
        assert!(diag.detail.contains("POST /service/rest/v1/security/roles -> HTTP 409"));
        assert!(diag.detail.ends_with("boom"));
    }

    #[test]
    fn validation_diagnostic_points_at_attribute() {
        let diag = CoreError::validation("repository_firewall.pccs_enabled", "requires enabled")
            .to_diagnostic("Invalid plan");
        assert_eq!(diag.attribute.as_deref(), Some("repository_firewall.pccs_enabled"));
    }
}
