//! Scheduled tasks: one dispatcher per task template.
//!
//! Every task shares a name, alerting settings and a `frequency` block;
//! template-specific settings live in a `properties` block that travels as
//! a flat string bag.

mod kinds;

use std::marker::PhantomData;
use std::sync::Arc;

use nxrm_api::types::{CreatedTask, TaskFrequency, TaskRequest, TaskResponse};
use nxrm_api::{ApiResponse, NexusClient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, TypeDescriptor};
use crate::error::CoreError;
use crate::lifecycle::{Engine, ResourceHandler, Stamped};
use crate::property_bag::PropertyBag;
use crate::schema::Attribute;

pub use kinds::*;

pub const SCHEDULES: &[&str] = &[
    "manual", "once", "hourly", "daily", "weekly", "monthly", "cron",
];
pub const NOTIFICATION_CONDITIONS: &[&str] = &["FAILURE", "SUCCESS_FAILURE"];

/// Shape of one task template's `properties` block.
pub trait TaskProperties:
    PropertyBag + Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// Server-side template id, e.g. `repository.docker.gc`.
    const TYPE_ID: &'static str;
    /// Resource name suffix after `task_`.
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// Attributes of the `properties` block; empty leaves it out.
    fn attributes() -> Vec<Attribute>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyModel {
    pub schedule: String,
    pub start_date: Option<i64>,
    pub time_zone_offset: Option<String>,
    pub recurring_days: Option<Vec<i64>>,
    pub cron_expression: Option<String>,
}

impl From<&TaskFrequency> for FrequencyModel {
    fn from(api: &TaskFrequency) -> Self {
        Self {
            schedule: api.schedule.clone(),
            start_date: api.start_date,
            time_zone_offset: api.time_zone_offset.clone(),
            recurring_days: api.recurring_days.clone(),
            cron_expression: api.cron_expression.clone(),
        }
    }
}

impl FrequencyModel {
    pub fn to_api(&self) -> TaskFrequency {
        TaskFrequency {
            schedule: self.schedule.clone(),
            start_date: self.start_date,
            time_zone_offset: self.time_zone_offset.clone(),
            recurring_days: self.recurring_days.clone(),
            cron_expression: self.cron_expression.clone(),
        }
    }

    /// Cross-field rules of the schedule.
    pub fn check(&self) -> Result<(), CoreError> {
        let needs_start = matches!(
            self.schedule.as_str(),
            "once" | "hourly" | "daily" | "weekly" | "monthly"
        );
        if needs_start && self.start_date.is_none() {
            return Err(CoreError::validation(
                "frequency.start_date",
                format!("start_date is required for schedule {:?}", self.schedule),
            ));
        }
        if self.schedule == "cron" && self.cron_expression.as_deref().is_none_or(str::is_empty) {
            return Err(CoreError::validation(
                "frequency.cron_expression",
                "cron_expression is required when schedule is \"cron\"",
            ));
        }
        if self.schedule != "cron" && self.cron_expression.is_some() {
            return Err(CoreError::validation(
                "frequency.cron_expression",
                "cron_expression is only valid when schedule is \"cron\"",
            ));
        }
        let days = self.recurring_days.as_deref().unwrap_or_default();
        match self.schedule.as_str() {
            "weekly" | "monthly" if days.is_empty() => Err(CoreError::validation(
                "frequency.recurring_days",
                format!("recurring_days is required for schedule {:?}", self.schedule),
            )),
            "weekly" if days.iter().any(|d| !(1..=7).contains(d)) => Err(CoreError::validation(
                "frequency.recurring_days",
                "weekly recurring_days must be between 1 (Monday) and 7 (Sunday)",
            )),
            "monthly" if days.iter().any(|d| !(1..=31).contains(d)) => Err(CoreError::validation(
                "frequency.recurring_days",
                "monthly recurring_days must be between 1 and 31",
            )),
            "weekly" | "monthly" => Ok(()),
            _ if !days.is_empty() => Err(CoreError::validation(
                "frequency.recurring_days",
                "recurring_days is only valid for weekly or monthly schedules",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskModel<P> {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub alert_email: Option<String>,
    #[serde(default)]
    pub notification_condition: String,
    #[serde(default)]
    pub frequency: FrequencyModel,
    #[serde(default)]
    pub properties: Option<P>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl<P> Default for TaskModel<P> {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            enabled: false,
            alert_email: None,
            notification_condition: String::new(),
            frequency: FrequencyModel::default(),
            properties: None,
            last_updated: None,
        }
    }
}

impl<P> Stamped for TaskModel<P> {
    fn set_last_updated(&mut self, at: String) {
        self.last_updated = Some(at);
    }
}

impl<P: TaskProperties> TaskModel<P> {
    pub fn to_api(&self) -> TaskRequest {
        TaskRequest {
            type_id: P::TYPE_ID.to_owned(),
            name: self.name.clone(),
            enabled: self.enabled,
            alert_email: self.alert_email.clone(),
            notification_condition: self.notification_condition.clone(),
            frequency: self.frequency.to_api(),
            properties: self
                .properties
                .as_ref()
                .map(PropertyBag::to_properties)
                .unwrap_or_default(),
        }
    }

    /// Overwrite everything the server reports. `frequency` is replaced
    /// as a whole when echoed; an absent `enabled`, `notification_condition`
    /// or `frequency` keeps the current value.
    fn refresh(&mut self, api: &TaskResponse) {
        self.id = Some(api.id.clone());
        self.name.clone_from(&api.name);
        if let Some(enabled) = api.enabled {
            self.enabled = enabled;
        }
        self.alert_email.clone_from(&api.alert_email);
        if let Some(condition) = &api.notification_condition {
            self.notification_condition.clone_from(condition);
        }
        if let Some(frequency) = &api.frequency {
            self.frequency = FrequencyModel::from(frequency);
        }
        self.properties = (!P::attributes().is_empty())
            .then(|| P::from_properties(&api.properties.clone().unwrap_or_default()));
    }
}

/// Type descriptor for the task template `P`.
pub struct TaskDescriptor<P> {
    _marker: PhantomData<fn() -> P>,
}

impl<P> TaskDescriptor<P> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<P> Default for TaskDescriptor<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn id_of(model: &TaskModel<impl Sized>) -> &str {
    model.id.as_deref().unwrap_or_default()
}

fn frequency_attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("schedule").required().one_of(SCHEDULES),
        Attribute::int64("start_date")
            .at_least(0)
            .description("First run, in seconds since the Unix epoch."),
        Attribute::string("time_zone_offset").description("UTC offset such as +02:00."),
        Attribute::int_set("recurring_days")
            .description("Weekdays (1-7) for weekly schedules, days of month (1-31) for monthly."),
        Attribute::string("cron_expression"),
    ]
}

impl<P: TaskProperties> TypeDescriptor for TaskDescriptor<P> {
    type Model = TaskModel<P>;
    type Api = TaskResponse;

    fn resource_name(&self) -> String {
        format!("task_{}", P::NAME)
    }

    fn description(&self) -> String {
        P::DESCRIPTION.to_owned()
    }

    fn base_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::string("id").computed().use_state_for_unknown(),
            Attribute::string("name").required().min_length(1),
            Attribute::bool("enabled").default(true),
            Attribute::string("alert_email"),
            Attribute::string("notification_condition")
                .default("FAILURE")
                .one_of(NOTIFICATION_CONDITIONS),
            Attribute::object("frequency", frequency_attributes()).required(),
        ]
    }

    fn schema_fragment(&self) -> Vec<Attribute> {
        let attrs = P::attributes();
        if attrs.is_empty() {
            Vec::new()
        } else {
            vec![Attribute::object("properties", attrs).required()]
        }
    }

    fn key(&self, model: &Self::Model) -> String {
        id_of(model).to_owned()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        plan.frequency.check()
    }

    async fn do_create(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.create_task(&plan.to_api()).await
    }

    async fn do_read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.get_task(id_of(state)).await
    }

    async fn do_update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.update_task(id_of(state), &plan.to_api()).await
    }

    async fn do_delete(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.delete_task(id_of(state)).await
    }

    fn create_success_codes(&self) -> &'static [u16] {
        &[200, 201]
    }

    fn apply_create_response(
        &self,
        model: &mut Self::Model,
        response: &ApiResponse,
    ) -> Result<(), CoreError> {
        let created: CreatedTask = response.json()?;
        if created.id.is_empty() {
            return Err(CoreError::ContractViolation(format!(
                "create response for task {} carried an empty id",
                P::TYPE_ID
            )));
        }
        model.id = Some(created.id);
        Ok(())
    }

    fn carry_over(&self, plan: &mut Self::Model, state: &Self::Model) {
        plan.id.clone_from(&state.id);
    }

    fn update_state_from_api(
        &self,
        model: &mut Self::Model,
        api: &Self::Api,
    ) -> Result<(), CoreError> {
        match api.type_id.as_deref() {
            Some(type_id) if type_id != P::TYPE_ID => Err(CoreError::ContractViolation(format!(
                "task {:?} has type {type_id:?}, expected {:?}",
                api.id,
                P::TYPE_ID
            ))),
            _ => {
                model.refresh(api);
                Ok(())
            }
        }
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        if id.is_empty() {
            return Err(CoreError::validation("id", "task import id must not be empty"));
        }
        Ok(TaskModel {
            id: Some(id.to_owned()),
            ..TaskModel::default()
        })
    }
}

fn handler<P: TaskProperties>() -> Arc<dyn ResourceHandler> {
    Arc::new(Engine::new(Dispatcher::new(TaskDescriptor::<P>::new())))
}

/// Handlers for every task template.
pub fn task_handlers() -> Vec<Arc<dyn ResourceHandler>> {
    vec![
        handler::<LicenseExpirationProperties>(),
        handler::<DockerGcProperties>(),
        handler::<DockerUploadPurgeProperties>(),
        handler::<MavenRemoveSnapshotsProperties>(),
        handler::<BlobStoreCompactProperties>(),
        handler::<PurgeUnusedProperties>(),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;

    fn daily() -> FrequencyModel {
        FrequencyModel {
            schedule: "daily".into(),
            start_date: Some(1_700_000_000),
            ..FrequencyModel::default()
        }
    }

    #[test]
    fn frequency_rules() {
        assert!(daily().check().is_ok());
        assert!(
            FrequencyModel {
                schedule: "manual".into(),
                ..FrequencyModel::default()
            }
            .check()
            .is_ok()
        );

        let cron = FrequencyModel {
            schedule: "cron".into(),
            ..FrequencyModel::default()
        };
        assert!(cron.check().is_err());

        let weekly = FrequencyModel {
            schedule: "weekly".into(),
            start_date: Some(0),
            recurring_days: Some(vec![1, 8]),
            ..FrequencyModel::default()
        };
        assert!(weekly.check().is_err());

        let missing_start = FrequencyModel {
            start_date: None,
            ..daily()
        };
        assert!(missing_start.check().is_err());
    }

    #[test]
    fn refresh_replaces_echoed_frequency_and_keeps_absent_one() {
        let mut model = TaskModel::<DockerGcProperties> {
            frequency: daily(),
            ..TaskModel::default()
        };
        let silent = TaskResponse {
            id: "t1".into(),
            name: "gc".into(),
            ..TaskResponse::default()
        };
        model.refresh(&silent);
        assert_eq!(model.frequency, daily());

        let echoed = TaskResponse {
            frequency: Some(TaskFrequency {
                schedule: "manual".into(),
                ..TaskFrequency::default()
            }),
            ..silent
        };
        model.refresh(&echoed);
        assert_eq!(model.frequency.schedule, "manual");
        assert_eq!(model.frequency.start_date, None);
    }

    #[test]
    fn request_carries_template_id_and_properties() {
        let model = TaskModel::<DockerGcProperties> {
            name: "gc".into(),
            enabled: true,
            notification_condition: "FAILURE".into(),
            frequency: daily(),
            properties: Some(DockerGcProperties {
                repository_name: "docker-hosted".into(),
                deploy_offset: 24,
            }),
            ..TaskModel::default()
        };
        let req = model.to_api();
        assert_eq!(req.type_id, "repository.docker.gc");
        assert_eq!(
            req.properties,
            IndexMap::from([
                ("repositoryName".to_owned(), "docker-hosted".to_owned()),
                ("deployOffset".to_owned(), "24".to_owned()),
            ])
        );
    }

    #[test]
    fn read_drops_unknown_property_keys() {
        let d = TaskDescriptor::<DockerUploadPurgeProperties>::new();
        let api = TaskResponse {
            id: "t1".into(),
            name: "purge".into(),
            type_id: Some("repository.docker.upload-purge".into()),
            enabled: Some(true),
            properties: Some(IndexMap::from([
                ("age".to_owned(), "48".to_owned()),
                (".name".to_owned(), "purge".to_owned()),
            ])),
            ..TaskResponse::default()
        };
        let mut model = TaskModel::default();
        d.update_state_from_api(&mut model, &api).unwrap();
        assert_eq!(model.properties, Some(DockerUploadPurgeProperties { age: 48 }));
        assert_eq!(model.id.as_deref(), Some("t1"));
    }
}
