// System endpoints: mail, outbound HTTP, IQ connection, license
//
// All singletons. Each has its own reset verb: mail and HTTP use DELETE,
// IQ uses `POST /disable`, the license uses DELETE.

use bytes::Bytes;
use tracing::debug;

use crate::client::NexusClient;
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::{EmailConfiguration, HttpSettings, IqConnection};

impl NexusClient {
    // ── Mail ─────────────────────────────────────────────────────────

    /// `GET /v1/email`
    pub async fn get_email(&self) -> Result<ApiResponse, Error> {
        self.get("v1/email").await
    }

    /// `PUT /v1/email`
    pub async fn update_email(&self, body: &EmailConfiguration) -> Result<ApiResponse, Error> {
        debug!("updating email configuration");
        self.put("v1/email", body).await
    }

    /// `DELETE /v1/email` -- disables and clears the SMTP settings.
    pub async fn reset_email(&self) -> Result<ApiResponse, Error> {
        debug!("resetting email configuration");
        self.delete("v1/email").await
    }

    // ── HTTP ─────────────────────────────────────────────────────────

    /// `GET /v1/http`
    pub async fn get_http_settings(&self) -> Result<ApiResponse, Error> {
        self.get("v1/http").await
    }

    /// `PUT /v1/http`
    pub async fn update_http_settings(&self, body: &HttpSettings) -> Result<ApiResponse, Error> {
        debug!("updating http settings");
        self.put("v1/http", body).await
    }

    /// `DELETE /v1/http` -- factory reset.
    pub async fn reset_http_settings(&self) -> Result<ApiResponse, Error> {
        debug!("resetting http settings");
        self.delete("v1/http").await
    }

    // ── IQ server ────────────────────────────────────────────────────

    /// `GET /v1/iq`
    pub async fn get_iq_connection(&self) -> Result<ApiResponse, Error> {
        self.get("v1/iq").await
    }

    /// `PUT /v1/iq`
    pub async fn update_iq_connection(&self, body: &IqConnection) -> Result<ApiResponse, Error> {
        debug!("updating IQ connection");
        self.put("v1/iq", body).await
    }

    /// `POST /v1/iq/disable`
    pub async fn disable_iq_connection(&self) -> Result<ApiResponse, Error> {
        debug!("disabling IQ connection");
        self.post_empty("v1/iq/disable").await
    }

    // ── License ──────────────────────────────────────────────────────

    /// `GET /v1/system/license`
    pub async fn get_license(&self) -> Result<ApiResponse, Error> {
        self.get("v1/system/license").await
    }

    /// `POST /v1/system/license` with the decoded license bytes.
    pub async fn install_license(&self, license: Bytes) -> Result<ApiResponse, Error> {
        debug!(bytes = license.len(), "installing license");
        self.post_bytes("v1/system/license", license).await
    }

    /// `DELETE /v1/system/license`
    pub async fn remove_license(&self) -> Result<ApiResponse, Error> {
        debug!("removing license");
        self.delete("v1/system/license").await
    }
}
