// Routing rules: path matchers that block or allow proxy requests.

use nxrm_api::NexusClient;
use nxrm_api::types::RoutingRule;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingRuleModel {
    pub name: String,
    pub description: Option<String>,
    pub mode: String,
    pub matchers: Vec<String>,
    pub last_updated: Option<String>,
}

stamped!(RoutingRuleModel);

impl From<&RoutingRule> for RoutingRuleModel {
    fn from(api: &RoutingRule) -> Self {
        Self {
            name: api.name.clone(),
            description: api.description.clone(),
            mode: api.mode.clone(),
            matchers: api.matchers.clone(),
            last_updated: None,
        }
    }
}

impl RoutingRuleModel {
    pub fn to_api(&self) -> RoutingRule {
        RoutingRule {
            name: self.name.clone(),
            description: self.description.clone(),
            mode: self.mode.clone(),
            matchers: self.matchers.clone(),
        }
    }
}

pub(crate) fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("name")
            .required()
            .min_length(1)
            .requires_replace()
            .description("Name of the routing rule."),
        Attribute::string("description"),
        Attribute::string("mode")
            .required()
            .one_of(&["BLOCK", "ALLOW"])
            .description("Whether matching requests are blocked or exclusively allowed."),
        Attribute::string_list("matchers")
            .required()
            .min_size(1)
            .description("Regular expressions matched against the request path."),
    ]
}

pub struct RoutingRuleResource;

impl Resource for RoutingRuleResource {
    type Model = RoutingRuleModel;

    fn type_name(&self) -> String {
        type_name("routing_rule")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a routing rule.")
            .attributes(attributes())
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_routing_rule(&plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<RoutingRule> = found(client.get_routing_rule(&state.name).await?)?;
        Ok(api.as_ref().map(RoutingRuleModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_routing_rule(&state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client
            .delete_routing_rule(&state.name)
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(RoutingRuleModel {
            name: id.to_owned(),
            ..RoutingRuleModel::default()
        })
    }
}
