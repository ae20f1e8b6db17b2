// Property blocks of the individual capability types.

use serde::{Deserialize, Serialize};

use super::CapabilityProperties;
use crate::property_bag::{
    PropertyBag, PropertyField, join_list, parse_bool, parse_int, parse_string, split_list,
};
use crate::schema::Attribute;

// ── audit ────────────────────────────────────────────────────────────

/// The audit capability has no tunables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditProperties {}

impl PropertyBag for AuditProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        Vec::new()
    }
}

impl CapabilityProperties for AuditProperties {
    const TYPE_ID: &'static str = "audit";
    const NAME: &'static str = "audit";
    const DESCRIPTION: &'static str = "Enable or disable audit logging.";

    fn attributes() -> Vec<Attribute> {
        Vec::new()
    }
}

// ── baseurl ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseUrlProperties {
    pub url: String,
}

impl PropertyBag for BaseUrlProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "url",
            read: |m| Some(m.url.clone()),
            write: |m, raw| m.url = raw.unwrap_or_default().to_owned(),
        }]
    }
}

impl CapabilityProperties for BaseUrlProperties {
    const TYPE_ID: &'static str = "baseurl";
    const NAME: &'static str = "core_base_url";
    const DESCRIPTION: &'static str = "Set the base URL the server advertises in links.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("url")
                .required()
                .min_length(1)
                .description("Public base URL, e.g. https://nexus.example.com."),
        ]
    }
}

// ── defaultrole ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultRoleProperties {
    pub role: String,
}

impl PropertyBag for DefaultRoleProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "role",
            read: |m| Some(m.role.clone()),
            write: |m, raw| m.role = raw.unwrap_or_default().to_owned(),
        }]
    }
}

impl CapabilityProperties for DefaultRoleProperties {
    const TYPE_ID: &'static str = "defaultrole";
    const NAME: &'static str = "default_role";
    const DESCRIPTION: &'static str = "Grant a role to every authenticated user.";

    fn attributes() -> Vec<Attribute> {
        vec![Attribute::string("role").required().min_length(1)]
    }
}

// ── outreach ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutreachProperties {
    pub always_remote: bool,
    pub override_url: Option<String>,
}

impl PropertyBag for OutreachProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "alwaysRemote",
                read: |m| Some(m.always_remote.to_string()),
                write: |m, raw| m.always_remote = parse_bool(raw, false),
            },
            PropertyField {
                key: "overrideUrl",
                read: |m| m.override_url.clone(),
                write: |m, raw| m.override_url = parse_string(raw).filter(|s| !s.is_empty()),
            },
        ]
    }
}

impl CapabilityProperties for OutreachProperties {
    const TYPE_ID: &'static str = "OutreachManagementCapability";
    const NAME: &'static str = "outreach";
    const DESCRIPTION: &'static str = "Configure the outreach (welcome page) content source.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::bool("always_remote").default(false),
            Attribute::string("override_url"),
        ]
    }
}

// ── storage-settings ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettingsProperties {
    pub last_downloaded_interval: i64,
}

impl PropertyBag for StorageSettingsProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "lastDownloadedInterval",
            read: |m| Some(m.last_downloaded_interval.to_string()),
            write: |m, raw| m.last_downloaded_interval = parse_int(raw, 12),
        }]
    }
}

impl CapabilityProperties for StorageSettingsProperties {
    const TYPE_ID: &'static str = "storage-settings";
    const NAME: &'static str = "storage_settings";
    const DESCRIPTION: &'static str = "Tune how often asset last-downloaded times are recorded.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::int64("last_downloaded_interval")
                .default(12)
                .at_least(1)
                .description("Hours between last-downloaded updates for the same asset."),
        ]
    }
}

// ── firewall.audit ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallAuditProperties {
    pub repository: String,
    pub quarantine: bool,
}

impl PropertyBag for FirewallAuditProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "repository",
                read: |m| Some(m.repository.clone()),
                write: |m, raw| m.repository = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "quarantine",
                read: |m| Some(m.quarantine.to_string()),
                write: |m, raw| m.quarantine = parse_bool(raw, false),
            },
        ]
    }
}

impl CapabilityProperties for FirewallAuditProperties {
    const TYPE_ID: &'static str = "firewall.audit";
    const NAME: &'static str = "firewall_audit_quarantine";
    const DESCRIPTION: &'static str = "Enable firewall audit and quarantine for one repository.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("repository").required().min_length(1),
            Attribute::bool("quarantine").default(false),
        ]
    }
}

// ── healthcheck ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthcheckProperties {
    pub configure_all_repositories: bool,
    pub use_nexus_truststore: bool,
}

impl PropertyBag for HealthcheckProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "configAllRepositories",
                read: |m| Some(m.configure_all_repositories.to_string()),
                write: |m, raw| m.configure_all_repositories = parse_bool(raw, true),
            },
            PropertyField {
                key: "useNexusTruststore",
                read: |m| Some(m.use_nexus_truststore.to_string()),
                write: |m, raw| m.use_nexus_truststore = parse_bool(raw, false),
            },
        ]
    }
}

impl CapabilityProperties for HealthcheckProperties {
    const TYPE_ID: &'static str = "healthcheck";
    const NAME: &'static str = "healthcheck";
    const DESCRIPTION: &'static str = "Configure Repository Health Check.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::bool("configure_all_repositories").default(true),
            Attribute::bool("use_nexus_truststore").default(false),
        ]
    }
}

// ── customs3regions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomS3RegionsProperties {
    pub regions: Vec<String>,
}

impl PropertyBag for CustomS3RegionsProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "regions",
            read: |m| Some(join_list(&m.regions)),
            write: |m, raw| m.regions = split_list(raw).unwrap_or_default(),
        }]
    }
}

impl CapabilityProperties for CustomS3RegionsProperties {
    const TYPE_ID: &'static str = "customs3regions";
    const NAME: &'static str = "custom_s3_regions";
    const DESCRIPTION: &'static str = "Declare additional S3 regions for blob stores.";

    fn attributes() -> Vec<Attribute> {
        vec![Attribute::string_set("regions").required().min_size(1)]
    }
}

// ── rutauth ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RutAuthProperties {
    pub http_header: String,
}

impl PropertyBag for RutAuthProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "httpHeader",
            read: |m| Some(m.http_header.clone()),
            write: |m, raw| m.http_header = raw.unwrap_or_default().to_owned(),
        }]
    }
}

impl CapabilityProperties for RutAuthProperties {
    const TYPE_ID: &'static str = "rutauth";
    const NAME: &'static str = "rut_auth";
    const DESCRIPTION: &'static str = "Authenticate users from a trusted remote-user HTTP header.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("http_header")
                .required()
                .min_length(1)
                .description("Header carrying the authenticated user id, e.g. X-Remote-User."),
        ]
    }
}

// ── rapture.branding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiBrandingProperties {
    pub header_enabled: bool,
    pub header_html: Option<String>,
    pub footer_enabled: bool,
    pub footer_html: Option<String>,
}

impl PropertyBag for UiBrandingProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "footerEnabled",
                read: |m| Some(m.footer_enabled.to_string()),
                write: |m, raw| m.footer_enabled = parse_bool(raw, false),
            },
            PropertyField {
                key: "footerHtml",
                read: |m| m.footer_html.clone(),
                write: |m, raw| m.footer_html = parse_string(raw),
            },
            PropertyField {
                key: "headerEnabled",
                read: |m| Some(m.header_enabled.to_string()),
                write: |m, raw| m.header_enabled = parse_bool(raw, false),
            },
            PropertyField {
                key: "headerHtml",
                read: |m| m.header_html.clone(),
                write: |m, raw| m.header_html = parse_string(raw),
            },
        ]
    }
}

impl CapabilityProperties for UiBrandingProperties {
    const TYPE_ID: &'static str = "rapture.branding";
    const NAME: &'static str = "ui_branding";
    const DESCRIPTION: &'static str = "Add a custom HTML header and footer to the UI.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::bool("header_enabled").default(false),
            Attribute::string("header_html"),
            Attribute::bool("footer_enabled").default(false),
            Attribute::string("footer_html"),
        ]
    }
}

// ── rapture.settings ─────────────────────────────────────────────────

pub const DEFAULT_UI_TITLE: &str = "Sonatype Nexus Repository";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettingsProperties {
    pub title: String,
    pub debug_allowed: bool,
    pub long_request_timeout: i64,
    pub request_timeout: i64,
    pub search_request_timeout: i64,
    pub status_interval_anonymous: i64,
    pub status_interval_authenticated: i64,
    pub session_timeout: i64,
}

impl PropertyBag for UiSettingsProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "title",
                read: |m| Some(m.title.clone()),
                write: |m, raw| {
                    m.title = raw
                        .filter(|s| !s.is_empty())
                        .unwrap_or(DEFAULT_UI_TITLE)
                        .to_owned();
                },
            },
            PropertyField {
                key: "debugAllowed",
                read: |m| Some(m.debug_allowed.to_string()),
                write: |m, raw| m.debug_allowed = parse_bool(raw, true),
            },
            PropertyField {
                key: "longRequestTimeout",
                read: |m| Some(m.long_request_timeout.to_string()),
                write: |m, raw| m.long_request_timeout = parse_int(raw, 180),
            },
            PropertyField {
                key: "requestTimeout",
                read: |m| Some(m.request_timeout.to_string()),
                write: |m, raw| m.request_timeout = parse_int(raw, 60),
            },
            PropertyField {
                key: "searchRequestTimeout",
                read: |m| Some(m.search_request_timeout.to_string()),
                write: |m, raw| m.search_request_timeout = parse_int(raw, 0),
            },
            PropertyField {
                key: "statusIntervalAnonymous",
                read: |m| Some(m.status_interval_anonymous.to_string()),
                write: |m, raw| m.status_interval_anonymous = parse_int(raw, 60),
            },
            PropertyField {
                key: "statusIntervalAuthenticated",
                read: |m| Some(m.status_interval_authenticated.to_string()),
                write: |m, raw| m.status_interval_authenticated = parse_int(raw, 5),
            },
            PropertyField {
                key: "sessionTimeout",
                read: |m| Some(m.session_timeout.to_string()),
                write: |m, raw| m.session_timeout = parse_int(raw, 30),
            },
        ]
    }
}

impl CapabilityProperties for UiSettingsProperties {
    const TYPE_ID: &'static str = "rapture.settings";
    const NAME: &'static str = "ui_settings";
    const DESCRIPTION: &'static str = "Tune UI title, debugging and timeouts.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("title").default(DEFAULT_UI_TITLE),
            Attribute::bool("debug_allowed").default(true),
            Attribute::int64("long_request_timeout")
                .default(180)
                .at_least(0)
                .description("Seconds."),
            Attribute::int64("request_timeout")
                .default(60)
                .at_least(0)
                .description("Seconds."),
            Attribute::int64("search_request_timeout")
                .default(0)
                .at_least(0)
                .description("Seconds; 0 uses request_timeout."),
            Attribute::int64("status_interval_anonymous").default(60).at_least(1),
            Attribute::int64("status_interval_authenticated").default(5).at_least(1),
            Attribute::int64("session_timeout")
                .default(30)
                .at_least(1)
                .description("Minutes of inactivity before the UI session expires."),
        ]
    }
}

// ── webhooks ─────────────────────────────────────────────────────────

pub const GLOBAL_WEBHOOK_EVENTS: &[&str] = &["audit", "repository"];
pub const REPOSITORY_WEBHOOK_EVENTS: &[&str] = &["asset", "component"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalWebhookProperties {
    pub names: Vec<String>,
    pub url: String,
    pub secret: Option<String>,
}

impl PropertyBag for GlobalWebhookProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "names",
                read: |m| Some(join_list(&m.names)),
                write: |m, raw| m.names = split_list(raw).unwrap_or_default(),
            },
            PropertyField {
                key: "url",
                read: |m| Some(m.url.clone()),
                write: |m, raw| m.url = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "secret",
                read: |m| m.secret.clone(),
                write: |m, raw| m.secret = parse_string(raw),
            },
        ]
    }
}

impl CapabilityProperties for GlobalWebhookProperties {
    const TYPE_ID: &'static str = "webhook.global";
    const NAME: &'static str = "webhook_global";
    const DESCRIPTION: &'static str = "Send global audit or repository events to a URL.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string_set("names")
                .required()
                .min_size(1)
                .each_one_of(GLOBAL_WEBHOOK_EVENTS),
            Attribute::string("url").required().min_length(1),
            Attribute::string("secret")
                .write_only()
                .description("HMAC key used to sign payloads."),
        ]
    }

    fn redact_read(&mut self) {
        self.secret = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryWebhookProperties {
    pub repository: String,
    pub names: Vec<String>,
    pub url: String,
    pub secret: Option<String>,
}

impl PropertyBag for RepositoryWebhookProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "repository",
                read: |m| Some(m.repository.clone()),
                write: |m, raw| m.repository = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "names",
                read: |m| Some(join_list(&m.names)),
                write: |m, raw| m.names = split_list(raw).unwrap_or_default(),
            },
            PropertyField {
                key: "url",
                read: |m| Some(m.url.clone()),
                write: |m, raw| m.url = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "secret",
                read: |m| m.secret.clone(),
                write: |m, raw| m.secret = parse_string(raw),
            },
        ]
    }
}

impl CapabilityProperties for RepositoryWebhookProperties {
    const TYPE_ID: &'static str = "webhook.repository";
    const NAME: &'static str = "webhook_repository";
    const DESCRIPTION: &'static str = "Send component or asset events of one repository to a URL.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("repository").required().min_length(1),
            Attribute::string_set("names")
                .required()
                .min_size(1)
                .each_one_of(REPOSITORY_WEBHOOK_EVENTS),
            Attribute::string("url").required().min_length(1),
            Attribute::string("secret").write_only(),
        ]
    }

    fn redact_read(&mut self) {
        self.secret = None;
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;

    fn bag(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn branding_serialises_exact_keys() {
        let props = UiBrandingProperties {
            header_enabled: false,
            header_html: Some(String::new()),
            footer_enabled: true,
            footer_html: Some("<p>X</p>".into()),
        };
        assert_eq!(
            props.to_properties(),
            bag(&[
                ("footerEnabled", "true"),
                ("footerHtml", "<p>X</p>"),
                ("headerEnabled", "false"),
                ("headerHtml", ""),
            ])
        );
    }

    #[test]
    fn branding_booleans_fall_back_to_defaults() {
        let props = UiBrandingProperties::from_properties(&bag(&[("footerHtml", "<p>X</p>")]));
        assert!(!props.footer_enabled);
        assert!(!props.header_enabled);
        assert_eq!(props.header_html, None);
    }

    #[test]
    fn ui_settings_defaults_and_unknown_keys() {
        let props = UiSettingsProperties::from_properties(&bag(&[
            ("requestTimeout", "90"),
            ("somethingNew", "1"),
        ]));
        assert_eq!(props.title, DEFAULT_UI_TITLE);
        assert_eq!(props.request_timeout, 90);
        assert_eq!(props.long_request_timeout, 180);
        assert_eq!(props.session_timeout, 30);
        assert!(!props.to_properties().contains_key("somethingNew"));
    }

    #[test]
    fn regions_round_trip_through_comma_list() {
        let props = CustomS3RegionsProperties {
            regions: vec!["eu-1".into(), "eu-2".into()],
        };
        let encoded = props.to_properties();
        assert_eq!(encoded.get("regions").map(String::as_str), Some("eu-1,eu-2"));
        assert_eq!(CustomS3RegionsProperties::from_properties(&bag(&[("regions", "eu-1, eu-2")])), props);
    }

    #[test]
    fn webhook_secret_is_scrubbed_on_read() {
        let mut props = GlobalWebhookProperties::from_properties(&bag(&[
            ("names", "audit"),
            ("url", "https://hooks.example.com"),
            ("secret", "#~NXRM~PLACEHOLDER~PASSWORD~#"),
        ]));
        props.redact_read();
        assert_eq!(props.secret, None);
        assert_eq!(props.names, vec!["audit".to_owned()]);
    }
}
