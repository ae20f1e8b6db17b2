// Capability and task listings, and the system singletons.

use nxrm_api::NexusClient;
use nxrm_api::types::{CapabilityResponse, TaskSummary};
use serde::Serialize;
use serde_json::Value;

use super::Singleton;
use crate::datasource::DataSource;
use crate::error::CoreError;
use crate::lifecycle::type_name;
use crate::resources::system::{
    HttpSystemResource, IqConnectionResource, LicenseResource, MailResource,
};
use crate::schema::{Attribute, Schema, computed_view};

// ── Capabilities ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyItem {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityItem {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    pub notes: Option<String>,
    pub enabled: bool,
    /// The raw property bag, in server order.
    pub properties: Vec<PropertyItem>,
}

impl From<&CapabilityResponse> for CapabilityItem {
    fn from(api: &CapabilityResponse) -> Self {
        Self {
            id: api.id.clone(),
            type_id: api.type_id.clone(),
            notes: api.notes.clone(),
            enabled: api.enabled.unwrap_or_default(),
            properties: api
                .properties
                .iter()
                .flatten()
                .map(|(key, value)| PropertyItem {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub capabilities: Vec<CapabilityItem>,
}

pub struct CapabilitiesDataSource;

impl DataSource for CapabilitiesDataSource {
    type Output = Capabilities;

    fn type_name(&self) -> String {
        type_name("capabilities")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every configured capability with its raw properties.").attribute(
            Attribute::object_list(
                "capabilities",
                computed_view(vec![
                    Attribute::string("id"),
                    Attribute::string("type"),
                    Attribute::string("notes"),
                    Attribute::bool("enabled"),
                    Attribute::object_list(
                        "properties",
                        vec![Attribute::string("key"), Attribute::string("value")],
                    ),
                ]),
            )
            .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Capabilities, CoreError> {
        let rows = client.list_capabilities().await?;
        Ok(Capabilities {
            capabilities: rows.iter().map(CapabilityItem::from).collect(),
        })
    }
}

// ── Tasks ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub message: Option<String>,
    pub current_state: Option<String>,
    pub last_run_result: Option<String>,
    pub next_run: Option<String>,
    pub last_run: Option<String>,
}

impl From<&TaskSummary> for TaskItem {
    fn from(api: &TaskSummary) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            type_id: api.type_id.clone(),
            message: api.message.clone(),
            current_state: api.current_state.clone(),
            last_run_result: api.last_run_result.clone(),
            next_run: api.next_run.clone(),
            last_run: api.last_run.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Tasks {
    pub tasks: Vec<TaskItem>,
}

pub struct TasksDataSource;

impl DataSource for TasksDataSource {
    type Output = Tasks;

    fn type_name(&self) -> String {
        type_name("tasks")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every scheduled task with its run status.").attribute(
            Attribute::object_list(
                "tasks",
                computed_view(vec![
                    Attribute::string("id"),
                    Attribute::string("name"),
                    Attribute::string("type"),
                    Attribute::string("message"),
                    Attribute::string("current_state"),
                    Attribute::string("last_run_result"),
                    Attribute::string("next_run"),
                    Attribute::string("last_run"),
                ]),
            )
            .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Tasks, CoreError> {
        let rows = client.list_tasks().await?;
        Ok(Tasks {
            tasks: rows.iter().map(TaskItem::from).collect(),
        })
    }
}

// ── Singletons ───────────────────────────────────────────────────────

pub fn license() -> Singleton<LicenseResource> {
    Singleton::new(
        LicenseResource,
        "Installed product license. Every attribute is null on an unlicensed instance.",
    )
}

pub fn mail() -> Singleton<MailResource> {
    Singleton::new(MailResource, "Current SMTP settings.")
}

pub fn http() -> Singleton<HttpSystemResource> {
    Singleton::new(HttpSystemResource, "Current outbound HTTP and proxy settings.")
}

pub fn iq_connection() -> Singleton<IqConnectionResource> {
    Singleton::new(IqConnectionResource, "Current IQ Server connection.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn capability_rows_keep_property_order() {
        let api: CapabilityResponse = serde_json::from_value(json!({
            "id": "abc",
            "type": "webhook.global",
            "enabled": true,
            "properties": { "url": "https://hooks", "names": "audit" }
        }))
        .unwrap();
        let item = CapabilityItem::from(&api);
        assert_eq!(item.notes, None);
        let keys: Vec<_> = item.properties.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["url", "names"]);
    }

    #[test]
    fn capability_without_enabled_reads_as_disabled() {
        let api: CapabilityResponse = serde_json::from_value(json!({ "id": "x" })).unwrap();
        let item = CapabilityItem::from(&api);
        assert!(!item.enabled);
        assert!(item.properties.is_empty());
    }
}
