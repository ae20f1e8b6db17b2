use std::fmt;

use thiserror::Error;

/// Maximum number of body bytes kept in an error for diagnostics.
pub const BODY_EXCERPT_LIMIT: usize = 200;

/// The remote side of a failed call: request line, status and a body excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDetail {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl StatusDetail {
    pub fn new(method: &str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
            status,
            body: excerpt(body),
        }
    }

    /// `"PUT /service/rest/v1/security/anonymous -> HTTP 403"`
    pub fn status_line(&self) -> String {
        format!("{} {} -> HTTP {}", self.method, self.path, self.status)
    }
}

impl fmt::Display for StatusDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "{}", self.status_line())
        } else {
            write!(f, "{}: {}", self.status_line(), self.body)
        }
    }
}

/// Cut a response body down to [`BODY_EXCERPT_LIMIT`] bytes on a char boundary.
pub fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_LIMIT {
        return trimmed.to_owned();
    }
    let mut end = BODY_EXCERPT_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}

/// Top-level error type for the `nxrm-api` crate.
///
/// Status-derived variants carry a [`StatusDetail`] so callers can render
/// the remote status line and body without holding on to the response.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Status classification ───────────────────────────────────────
    /// 400 -- the server rejected the payload.
    #[error("Bad request ({0})")]
    BadRequest(StatusDetail),

    /// 401 -- credentials missing or wrong.
    #[error("Unauthorized ({0})")]
    Unauthorized(StatusDetail),

    /// 403 -- credentials valid but lacking privileges.
    #[error("Forbidden ({0})")]
    Forbidden(StatusDetail),

    /// 404 -- the entity (or endpoint) does not exist.
    #[error("Not found ({0})")]
    NotFound(StatusDetail),

    /// 409 -- typically a duplicate name.
    #[error("Conflict ({0})")]
    Conflict(StatusDetail),

    /// Any status outside the accepted set for the call.
    #[error("Unexpected status, expected one of {expected:?} ({detail})")]
    UnexpectedStatus {
        detail: StatusDetail,
        expected: Vec<u16>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server reported the entity as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for 401 and 403.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }

    /// Returns `true` if the request never produced an HTTP status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_) | Self::InvalidUrl(_))
    }

    /// The remote status detail, when the failure came from a response.
    pub fn detail(&self) -> Option<&StatusDetail> {
        match self {
            Self::BadRequest(d)
            | Self::Unauthorized(d)
            | Self::Forbidden(d)
            | Self::NotFound(d)
            | Self::Conflict(d)
            | Self::UnexpectedStatus { detail: d, .. } => Some(d),
            _ => None,
        }
    }

    /// HTTP status code, if available.
    pub fn status(&self) -> Option<u16> {
        self.detail()
            .map(|d| d.status)
            .or_else(|| match self {
                Self::Transport(e) => e.status().map(|s| s.as_u16()),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("  oops \n"), "oops");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(150);
        let cut = excerpt(&body);
        assert!(cut.ends_with('…'));
        assert!(cut.len() <= BODY_EXCERPT_LIMIT + '…'.len_utf8());
    }

    #[test]
    fn status_line_format() {
        let detail = StatusDetail::new("DELETE", "/service/rest/v1/email", 403, "");
        assert_eq!(detail.to_string(), "DELETE /service/rest/v1/email -> HTTP 403");
        let err = Error::Forbidden(detail);
        assert!(err.is_auth_failure());
        assert_eq!(err.status(), Some(403));
    }
}
