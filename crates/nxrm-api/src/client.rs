// Async HTTP client for the Nexus Repository REST API.
//
// Base path: {base}/service/rest/
// Auth: HTTP basic, attached per request
//
// Verbs here never interpret the status code -- they hand back the
// consumed `ApiResponse` and let the endpoint or lifecycle layer decide
// which codes it accepts.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::auth::BasicAuth;
use crate::error::Error;
use crate::response::ApiResponse;
use crate::transport::TransportConfig;

const REST_PREFIX: &str = "service/rest/";

/// Async client for the Nexus administrative API.
///
/// Holds no mutable state: it is safe to share one instance across
/// concurrent lifecycle operations.
#[derive(Clone)]
pub struct NexusClient {
    http: reqwest::Client,
    base_url: Url,
    auth: BasicAuth,
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl NexusClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` (the Nexus root, e.g. `https://nexus:8081`).
    pub fn new(base_url: &str, auth: BasicAuth, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http, auth)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client, auth: BasicAuth) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// Append `/service/rest/` unless the caller already pointed at it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/service/rest") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/{REST_PREFIX}"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        self.auth.username()
    }

    /// Join a relative path (e.g. `"v1/security/roles"`) onto the REST root.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn execute(
        &self,
        method: Method,
        url: Url,
        decorate: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<ApiResponse, Error> {
        debug!("{method} {url}");
        let path = url.path().to_owned();
        let builder = self.auth.apply(self.http.request(method.clone(), url));
        let resp = decorate(builder).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(ApiResponse::new(method.as_str(), &path, status, body))
    }

    pub(crate) async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        self.execute(Method::GET, url, |b| b).await
    }

    pub(crate) async fn get_with_params(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        self.execute(Method::GET, url, |b| b.query(params)).await
    }

    pub(crate) async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        let payload = serde_json::to_vec(body)?;
        self.execute(Method::POST, url, |b| json_body(b, payload)).await
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        self.execute(Method::POST, url, |b| b).await
    }

    /// POST a raw binary body (`application/octet-stream`).
    pub(crate) async fn post_bytes(&self, path: &str, body: Bytes) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        self.execute(Method::POST, url, |b| {
            b.header(CONTENT_TYPE, "application/octet-stream").body(body)
        })
        .await
    }

    pub(crate) async fn put<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        let payload = serde_json::to_vec(body)?;
        self.execute(Method::PUT, url, |b| json_body(b, payload)).await
    }

    /// PUT a `text/plain` body (password change).
    pub(crate) async fn put_text(&self, path: &str, body: String) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        self.execute(Method::PUT, url, |b| b.header(CONTENT_TYPE, "text/plain").body(body))
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        let url = self.url(path)?;
        self.execute(Method::DELETE, url, |b| b).await
    }
}

fn json_body(builder: reqwest::RequestBuilder, payload: Vec<u8>) -> reqwest::RequestBuilder {
    builder
        .header(CONTENT_TYPE, "application/json")
        .body(payload)
}

/// Percent-encode a single path segment (repository names may contain `.`,
/// user ids may contain `@`).
pub(crate) fn segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(char::from(byte));
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn auth() -> BasicAuth {
        BasicAuth::new("admin", SecretString::from("pw".to_owned()))
    }

    #[test]
    fn base_url_gets_rest_prefix() {
        let client = NexusClient::with_client("https://nexus:8081", reqwest::Client::new(), auth())
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://nexus:8081/service/rest/");
    }

    #[test]
    fn base_url_keeps_context_path() {
        let client =
            NexusClient::with_client("https://host/nexus/", reqwest::Client::new(), auth()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://host/nexus/service/rest/");
    }

    #[test]
    fn base_url_already_rest() {
        let client = NexusClient::with_client(
            "https://host/service/rest",
            reqwest::Client::new(),
            auth(),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://host/service/rest/");
    }

    #[test]
    fn segment_escapes_reserved_characters() {
        assert_eq!(segment("maven-releases"), "maven-releases");
        assert_eq!(segment("jane@corp"), "jane%40corp");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }
}
