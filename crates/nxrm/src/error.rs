//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError` and failed outcomes into user-facing
//! errors with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use nxrm_config::ConfigError;
use nxrm_core::{CoreError, ErrorCategory};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const CANCELLED: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("{summary}")]
    #[diagnostic(
        code(nxrm::operation_failed),
        help("The outcome printed on stdout carries the full diagnostics; prior state is unchanged.")
    )]
    OperationFailed {
        summary: String,
        category: Option<ErrorCategory>,
    },

    #[error("Operation cancelled")]
    #[diagnostic(code(nxrm::cancelled))]
    Cancelled,

    // ── Provider ─────────────────────────────────────────────────────
    #[error("Unknown type '{name}'")]
    #[diagnostic(
        code(nxrm::unknown_type),
        help("Run: nxrm types to list every resource and data source")
    )]
    UnknownType { name: String },

    #[error(transparent)]
    #[diagnostic(code(nxrm::core))]
    Core(CoreError),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nxrm::profile_not_found),
        help(
            "Create one with: nxrm --url <URL> --username <USER> config init\n\
             Or pass --url, --username and set NXRM_PASSWORD."
        )
    )]
    ProfileNotFound { name: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(nxrm::no_credentials),
        help(
            "Store one with: nxrm config set-password --profile {profile}\n\
             Or set NXRM_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error(transparent)]
    #[diagnostic(code(nxrm::config))]
    Config(ConfigError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nxrm::validation))]
    Validation { field: String, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(nxrm::json), help("Check the JSON document and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Cannot render YAML: {0}")]
    #[diagnostic(code(nxrm::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

fn category_exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Validation => exit_code::USAGE,
        ErrorCategory::Unauthorized => exit_code::AUTH,
        ErrorCategory::NotFound => exit_code::NOT_FOUND,
        ErrorCategory::Conflict => exit_code::CONFLICT,
        ErrorCategory::Transport => exit_code::CONNECTION,
        ErrorCategory::UnexpectedStatus | ErrorCategory::Internal => exit_code::GENERAL,
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OperationFailed {
                category: Some(category),
                ..
            } => category_exit_code(*category),
            Self::Core(err) => category_exit_code(err.category()),
            Self::Cancelled => exit_code::CANCELLED,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::UnknownType { .. }
            | Self::Validation { .. }
            | Self::Json(_)
            | Self::ProfileNotFound { .. }
            | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownResourceType(name) => Self::UnknownType { name },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::Validation { attribute, message } => Self::Validation {
                field: attribute,
                reason: message,
            },
            other => Self::Core(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile(name) => Self::ProfileNotFound { name },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_stable_exit_codes() {
        let failed = |category| CliError::OperationFailed {
            summary: "Error creating sonatyperepo_role".into(),
            category: Some(category),
        };
        assert_eq!(failed(ErrorCategory::Conflict).exit_code(), 6);
        assert_eq!(failed(ErrorCategory::Unauthorized).exit_code(), 3);
        assert_eq!(failed(ErrorCategory::NotFound).exit_code(), 4);
        assert_eq!(failed(ErrorCategory::Transport).exit_code(), 7);
        assert_eq!(CliError::Cancelled.exit_code(), 8);
    }

    #[test]
    fn core_errors_keep_their_meaning() {
        let err = CliError::from(CoreError::UnknownResourceType("sonatyperepo_x".into()));
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(matches!(
            CliError::from(CoreError::NotConfigured),
            CliError::Core(CoreError::NotConfigured)
        ));
    }
}
