// HTTP response envelope.
//
// Endpoint methods return the raw envelope so callers decide which status
// codes count as success for a given call. `expect` turns anything else
// into the classified `Error`.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{Error, StatusDetail, excerpt};

/// A fully consumed HTTP response: request line, status and body bytes.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    method: String,
    path: String,
    status: StatusCode,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(method: &str, path: &str, status: StatusCode, body: Bytes) -> Self {
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
            status,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| {
            let body = self.text();
            let preview = excerpt(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    pub fn detail(&self) -> StatusDetail {
        StatusDetail::new(&self.method, &self.path, self.status(), &self.text())
    }

    /// Keep the response if its status is in `accepted`, otherwise classify
    /// it into an [`Error`].
    pub fn expect(self, accepted: &[u16]) -> Result<Self, Error> {
        if accepted.contains(&self.status()) {
            Ok(self)
        } else {
            Err(self.into_error(accepted))
        }
    }

    /// Classify a non-accepted status.
    pub fn into_error(self, accepted: &[u16]) -> Error {
        let detail = self.detail();
        match self.status {
            StatusCode::BAD_REQUEST => Error::BadRequest(detail),
            StatusCode::UNAUTHORIZED => Error::Unauthorized(detail),
            StatusCode::FORBIDDEN => Error::Forbidden(detail),
            StatusCode::NOT_FOUND => Error::NotFound(detail),
            StatusCode::CONFLICT => Error::Conflict(detail),
            _ => Error::UnexpectedStatus {
                detail,
                expected: accepted.to_vec(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> ApiResponse {
        ApiResponse::new(
            "POST",
            "/service/rest/v1/security/roles",
            StatusCode::from_u16(status).unwrap_or(StatusCode::IM_A_TEAPOT),
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[test]
    fn expect_accepts_declared_codes() {
        assert!(response(204, "").expect(&[200, 204]).is_ok());
    }

    #[test]
    fn expect_classifies_conflict() {
        let err = response(409, "duplicate").expect(&[201]).unwrap_err();
        assert!(matches!(err, Error::Conflict(ref d) if d.body == "duplicate"));
    }

    #[test]
    fn expect_flags_unlisted_success_code() {
        let err = response(200, "{}").expect(&[201]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus { ref expected, .. } if expected == &[201]));
    }

    #[test]
    fn whitespace_body_is_empty() {
        assert!(response(204, " \n").is_empty());
    }
}
