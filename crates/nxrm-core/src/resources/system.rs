//! System singletons: SMTP mail, outbound HTTP, the IQ server connection
//! and the product license.
//!
//! Delete resets each to factory state through its dedicated endpoint.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use nxrm_api::NexusClient;
use nxrm_api::types::{
    EmailConfiguration, HttpSettings, IqConnection, LicenseDetails, ProxyAuthInfo, ProxySettings,
};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::{found, keep_set_order};
use crate::schema::{Attribute, Schema};

pub const IQ_AUTHENTICATION_TYPES: &[&str] = &["USER", "PKI"];
pub const PROXY_AUTH_SCHEMES: &[&str] = &["username", "ntlm"];

// ── Mail ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailModel {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub subject_prefix: Option<String>,
    pub start_tls_enabled: bool,
    pub start_tls_required: bool,
    pub ssl_on_connect_enabled: bool,
    pub ssl_server_identity_check_enabled: bool,
    pub nexus_trust_store_enabled: bool,
    pub last_updated: Option<String>,
}

stamped!(MailModel);

impl From<&EmailConfiguration> for MailModel {
    fn from(api: &EmailConfiguration) -> Self {
        Self {
            enabled: api.enabled,
            host: api.host.clone(),
            port: api.port,
            username: api.username.clone().filter(|u| !u.is_empty()),
            password: None,
            from_address: api.from_address.clone(),
            subject_prefix: api.subject_prefix.clone(),
            start_tls_enabled: api.start_tls_enabled,
            start_tls_required: api.start_tls_required,
            ssl_on_connect_enabled: api.ssl_on_connect_enabled,
            ssl_server_identity_check_enabled: api.ssl_server_identity_check_enabled,
            nexus_trust_store_enabled: api.nexus_trust_store_enabled,
            last_updated: None,
        }
    }
}

impl MailModel {
    pub fn to_api(&self) -> EmailConfiguration {
        EmailConfiguration {
            enabled: self.enabled,
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            from_address: self.from_address.clone(),
            subject_prefix: self.subject_prefix.clone(),
            start_tls_enabled: self.start_tls_enabled,
            start_tls_required: self.start_tls_required,
            ssl_on_connect_enabled: self.ssl_on_connect_enabled,
            ssl_server_identity_check_enabled: self.ssl_server_identity_check_enabled,
            nexus_trust_store_enabled: self.nexus_trust_store_enabled,
        }
    }
}

pub(crate) fn mail_attributes() -> Vec<Attribute> {
    vec![
        Attribute::bool("enabled").required(),
        Attribute::string("host").description("SMTP host name."),
        Attribute::int64("port").required().range(1, 65535),
        Attribute::string("username"),
        Attribute::string("password").write_only(),
        Attribute::string("from_address").description("Sender address for notifications."),
        Attribute::string("subject_prefix"),
        Attribute::bool("start_tls_enabled").default(false),
        Attribute::bool("start_tls_required").default(false),
        Attribute::bool("ssl_on_connect_enabled").default(false),
        Attribute::bool("ssl_server_identity_check_enabled").default(false),
        Attribute::bool("nexus_trust_store_enabled").default(false),
    ]
}

pub struct MailResource;

impl MailResource {
    pub const ID: &'static str = "system_mail";
}

impl Resource for MailResource {
    type Model = MailModel;

    fn type_name(&self) -> String {
        type_name("system_mail")
    }

    fn schema(&self) -> Schema {
        Schema::new("Configure the SMTP server used for notifications. Deleting resets it.")
            .attributes(mail_attributes())
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        if plan.enabled && plan.host.is_none() {
            return Err(CoreError::validation("host", "host is required when enabled is true"));
        }
        Ok(())
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client.update_email(&plan.to_api()).await?.expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<EmailConfiguration> = found(client.get_email().await?)?;
        Ok(api.as_ref().map(MailModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        _state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client.update_email(&plan.to_api()).await?.expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        client.reset_email().await?.expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(MailModel::default())
    }
}

// ── HTTP ─────────────────────────────────────────────────────────────

/// `password` is write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyAuthModel {
    pub auth_scheme: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ntlm_host: Option<String>,
    pub ntlm_domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyServerModel {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub authentication: Option<ProxyAuthModel>,
}

impl From<&ProxySettings> for ProxyServerModel {
    fn from(api: &ProxySettings) -> Self {
        Self {
            enabled: api.enabled,
            host: api.host.clone(),
            port: api.port,
            authentication: api.auth_info.as_ref().map(|a| ProxyAuthModel {
                auth_scheme: a.auth_scheme.clone(),
                username: a.username.clone(),
                password: None,
                ntlm_host: a.ntlm_host.clone(),
                ntlm_domain: a.ntlm_domain.clone(),
            }),
        }
    }
}

impl ProxyServerModel {
    fn to_api(&self) -> ProxySettings {
        ProxySettings {
            enabled: self.enabled,
            host: self.host.clone(),
            port: self.port,
            auth_info: self.authentication.as_ref().map(|a| ProxyAuthInfo {
                auth_scheme: a.auth_scheme.clone(),
                username: a.username.clone(),
                password: a.password.clone(),
                ntlm_host: a.ntlm_host.clone(),
                ntlm_domain: a.ntlm_domain.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSystemModel {
    pub user_agent: Option<String>,
    pub timeout: Option<i64>,
    pub retries: Option<i64>,
    pub http_proxy: Option<ProxyServerModel>,
    pub https_proxy: Option<ProxyServerModel>,
    pub non_proxy_hosts: Vec<String>,
    pub last_updated: Option<String>,
}

stamped!(HttpSystemModel);

impl From<&HttpSettings> for HttpSystemModel {
    fn from(api: &HttpSettings) -> Self {
        Self {
            user_agent: api.user_agent.clone().filter(|u| !u.is_empty()),
            timeout: api.timeout,
            retries: api.retries,
            http_proxy: api.http_proxy.as_ref().map(ProxyServerModel::from),
            https_proxy: api.https_proxy.as_ref().map(ProxyServerModel::from),
            non_proxy_hosts: api.non_proxy_hosts.clone().unwrap_or_default(),
            last_updated: None,
        }
    }
}

impl HttpSystemModel {
    pub fn to_api(&self) -> HttpSettings {
        HttpSettings {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            retries: self.retries,
            http_proxy: self.http_proxy.as_ref().map(ProxyServerModel::to_api),
            https_proxy: self.https_proxy.as_ref().map(ProxyServerModel::to_api),
            non_proxy_hosts: Some(self.non_proxy_hosts.clone()),
        }
    }
}

fn proxy_server_attribute(name: &'static str) -> Attribute {
    Attribute::object(
        name,
        vec![
            Attribute::bool("enabled").required(),
            Attribute::string("host"),
            Attribute::int64("port").range(1, 65535),
            Attribute::object(
                "authentication",
                vec![
                    Attribute::string("auth_scheme").required().one_of(PROXY_AUTH_SCHEMES),
                    Attribute::string("username"),
                    Attribute::string("password").write_only(),
                    Attribute::string("ntlm_host"),
                    Attribute::string("ntlm_domain"),
                ],
            ),
        ],
    )
}

pub struct HttpSystemResource;

impl HttpSystemResource {
    pub const ID: &'static str = "system_http";
}

impl Resource for HttpSystemResource {
    type Model = HttpSystemModel;

    fn type_name(&self) -> String {
        type_name("system_http")
    }

    fn schema(&self) -> Schema {
        Schema::new("Configure outbound HTTP settings. Deleting restores the factory defaults.")
            .attributes([
                Attribute::string("user_agent").description("Suffix appended to the User-Agent header."),
                Attribute::int64("timeout").range(1, 3600).description("Seconds."),
                Attribute::int64("retries").range(0, 10),
                proxy_server_attribute("http_proxy"),
                proxy_server_attribute("https_proxy"),
                Attribute::string_set("non_proxy_hosts")
                    .default(serde_json::json!([]))
                    .description("Hosts reached without the proxy."),
            ])
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        for (attr, proxy) in [("http_proxy", &plan.http_proxy), ("https_proxy", &plan.https_proxy)] {
            if let Some(p) = proxy {
                if p.enabled && (p.host.is_none() || p.port.is_none()) {
                    return Err(CoreError::validation(
                        attr,
                        "host and port are required when the proxy is enabled",
                    ));
                }
            }
        }
        if plan.https_proxy.as_ref().is_some_and(|p| p.enabled)
            && !plan.http_proxy.as_ref().is_some_and(|p| p.enabled)
        {
            return Err(CoreError::validation(
                "https_proxy",
                "an HTTPS proxy requires an enabled HTTP proxy",
            ));
        }
        Ok(())
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .update_http_settings(&plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<HttpSettings> = found(client.get_http_settings().await?)?;
        Ok(api.map(|a| {
            let mut fresh = HttpSystemModel::from(&a);
            fresh.non_proxy_hosts = keep_set_order(&state.non_proxy_hosts, fresh.non_proxy_hosts);
            fresh
        }))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        _state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_http_settings(&plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        client.reset_http_settings().await?.expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(HttpSystemModel::default())
    }
}

// ── IQ connection ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IqConnectionModel {
    pub enabled: bool,
    pub show_link: bool,
    pub url: Option<String>,
    pub authentication_type: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_trust_store_for_url: bool,
    pub timeout_seconds: Option<i64>,
    pub properties: Option<String>,
    pub last_updated: Option<String>,
}

stamped!(IqConnectionModel);

impl From<&IqConnection> for IqConnectionModel {
    fn from(api: &IqConnection) -> Self {
        Self {
            enabled: api.enabled,
            show_link: api.show_link,
            url: api.url.clone(),
            authentication_type: api.authentication_type.clone(),
            username: api.username.clone(),
            password: None,
            use_trust_store_for_url: api.use_trust_store_for_url,
            timeout_seconds: api.timeout_seconds,
            properties: api.properties.clone(),
            last_updated: None,
        }
    }
}

impl IqConnectionModel {
    pub fn to_api(&self) -> IqConnection {
        IqConnection {
            enabled: self.enabled,
            show_link: self.show_link,
            url: self.url.clone(),
            authentication_type: self.authentication_type.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            use_trust_store_for_url: self.use_trust_store_for_url,
            timeout_seconds: self.timeout_seconds,
            properties: self.properties.clone(),
        }
    }
}

pub(crate) fn iq_attributes() -> Vec<Attribute> {
    vec![
        Attribute::bool("enabled").required(),
        Attribute::bool("show_link")
            .default(false)
            .description("Show the IQ server link in the UI menu."),
        Attribute::string("url"),
        Attribute::string("authentication_type")
            .required()
            .one_of(IQ_AUTHENTICATION_TYPES),
        Attribute::string("username"),
        Attribute::string("password").write_only(),
        Attribute::bool("use_trust_store_for_url").default(false),
        Attribute::int64("timeout_seconds").range(1, 3600),
        Attribute::string("properties").description("Extra connection properties, one key=value per line."),
    ]
}

pub struct IqConnectionResource;

impl IqConnectionResource {
    pub const ID: &'static str = "iq_connection";
}

impl Resource for IqConnectionResource {
    type Model = IqConnectionModel;

    fn type_name(&self) -> String {
        type_name("iq_connection")
    }

    fn schema(&self) -> Schema {
        Schema::new("Configure the connection to Sonatype IQ Server. Deleting disables it.")
            .attributes(iq_attributes())
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        if plan.enabled && plan.url.is_none() {
            return Err(CoreError::validation("url", "url is required when enabled is true"));
        }
        if plan.authentication_type == "USER" && plan.enabled && plan.username.is_none() {
            return Err(CoreError::validation(
                "username",
                "username is required for USER authentication",
            ));
        }
        Ok(())
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .update_iq_connection(&plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<IqConnection> = found(client.get_iq_connection().await?)?;
        Ok(api.as_ref().map(IqConnectionModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        _state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_iq_connection(&plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        client.disable_iq_connection().await?.expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(IqConnectionModel::default())
    }
}

// ── Product license ──────────────────────────────────────────────────

/// `license_data` is the base64 license file and is never read back;
/// everything else is reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseModel {
    pub license_data: Option<String>,
    pub contact_email: Option<String>,
    pub contact_company: Option<String>,
    pub contact_name: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub license_type: Option<String>,
    pub licensed_users: Option<String>,
    pub fingerprint: Option<String>,
    pub features: Option<String>,
    pub last_updated: Option<String>,
}

stamped!(LicenseModel);

impl From<&LicenseDetails> for LicenseModel {
    fn from(api: &LicenseDetails) -> Self {
        Self {
            license_data: None,
            contact_email: api.contact_email.clone(),
            contact_company: api.contact_company.clone(),
            contact_name: api.contact_name.clone(),
            effective_date: api.effective_date.clone(),
            expiration_date: api.expiration_date.clone(),
            license_type: api.license_type.clone(),
            licensed_users: api.licensed_users.clone(),
            fingerprint: api.fingerprint.clone(),
            features: api.features.clone(),
            last_updated: None,
        }
    }
}

impl LicenseModel {
    /// Decode `license_data` into the bytes the upload endpoint expects.
    pub fn license_bytes(&self) -> Result<Bytes, CoreError> {
        let encoded = self.license_data.as_deref().unwrap_or_default();
        let compact: String = encoded.split_whitespace().collect();
        STANDARD
            .decode(compact)
            .map(Bytes::from)
            .map_err(|e| CoreError::validation("license_data", format!("not valid base64: {e}")))
    }

    fn with_details(&self, details: Self) -> Self {
        Self {
            license_data: self.license_data.clone(),
            last_updated: self.last_updated.clone(),
            ..details
        }
    }
}

pub(crate) fn license_attributes() -> Vec<Attribute> {
    let computed = |name| Attribute::string(name).computed();
    vec![
        Attribute::string("license_data")
            .required()
            .min_length(1)
            .write_only()
            .description("Base64-encoded license file (.lic)."),
        computed("contact_email"),
        computed("contact_company"),
        computed("contact_name"),
        computed("effective_date"),
        computed("expiration_date"),
        computed("license_type"),
        computed("licensed_users"),
        computed("fingerprint"),
        computed("features"),
    ]
}

pub struct LicenseResource;

impl LicenseResource {
    pub const ID: &'static str = "product_license";

    /// Unlicensed instances answer 402 or an empty document.
    async fn details(client: &NexusClient) -> Result<Option<LicenseModel>, CoreError> {
        let resp = client.get_license().await?;
        if resp.status() == 402 {
            return Ok(None);
        }
        let api: Option<LicenseDetails> = found(resp)?;
        Ok(api
            .filter(|d| d.fingerprint.is_some() || d.license_type.is_some())
            .as_ref()
            .map(LicenseModel::from))
    }

    async fn install(client: &NexusClient, plan: &LicenseModel) -> Result<LicenseModel, CoreError> {
        let bytes = plan.license_bytes()?;
        client.install_license(bytes).await?.expect(&[200, 201, 204])?;
        let details = Self::details(client).await?.unwrap_or_default();
        Ok(plan.with_details(details))
    }
}

impl Resource for LicenseResource {
    type Model = LicenseModel;

    fn type_name(&self) -> String {
        type_name("system_license")
    }

    fn schema(&self) -> Schema {
        Schema::new("Install the product license. Deleting removes it.")
            .attributes(license_attributes())
            .with_last_updated()
    }

    fn key(&self, _model: &Self::Model) -> String {
        Self::ID.to_owned()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        plan.license_bytes().map(|_| ())
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        Self::install(client, plan).await
    }

    async fn read(
        &self,
        client: &NexusClient,
        _state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        Self::details(client).await
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        if plan.license_data == state.license_data {
            return Ok(state.clone());
        }
        Self::install(client, plan).await
    }

    async fn delete(&self, client: &NexusClient, _state: &Self::Model) -> Result<(), CoreError> {
        client.remove_license().await?.expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, _id: &str) -> Result<Self::Model, CoreError> {
        Ok(LicenseModel::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn license_data_decodes_across_line_breaks() {
        let model = LicenseModel {
            license_data: Some("bGlj\nZW5z\r\nZQ==".into()),
            ..LicenseModel::default()
        };
        assert_eq!(model.license_bytes().unwrap(), Bytes::from_static(b"license"));
    }

    #[test]
    fn bad_license_data_is_a_validation_error() {
        let model = LicenseModel {
            license_data: Some("not base64!".into()),
            ..LicenseModel::default()
        };
        let err = LicenseResource.validate(&model).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Validation);
    }

    #[test]
    fn cleared_non_proxy_hosts_are_sent_as_empty_list() {
        let api = HttpSettings {
            non_proxy_hosts: Some(vec!["a.local".into()]),
            ..HttpSettings::default()
        };
        let mut model = HttpSystemModel::from(&api);
        model.non_proxy_hosts.clear();
        let body = serde_json::to_value(model.to_api()).unwrap();
        assert_eq!(body["nonProxyHosts"], serde_json::json!([]));
    }

    #[test]
    fn https_proxy_needs_http_proxy() {
        let plan = HttpSystemModel {
            https_proxy: Some(ProxyServerModel {
                enabled: true,
                host: Some("proxy".into()),
                port: Some(3128),
                authentication: None,
            }),
            ..HttpSystemModel::default()
        };
        assert!(HttpSystemResource.validate(&plan).is_err());
    }

    #[test]
    fn mail_password_is_write_only() {
        let plan = MailModel {
            enabled: true,
            host: Some("smtp.example.com".into()),
            port: 587,
            password: Some("secret".into()),
            ..MailModel::default()
        };
        let api = plan.to_api();
        assert_eq!(api.password.as_deref(), Some("secret"));
        assert_eq!(MailModel::from(&api).password, None);
    }
}
