// Content selectors: CSEL expressions referenced by
// repository-content-selector privileges.

use nxrm_api::NexusClient;
use nxrm_api::types::ContentSelector;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSelectorModel {
    pub name: String,
    pub description: Option<String>,
    pub expression: String,
    pub last_updated: Option<String>,
}

stamped!(ContentSelectorModel);

impl From<&ContentSelector> for ContentSelectorModel {
    fn from(api: &ContentSelector) -> Self {
        Self {
            name: api.name.clone(),
            description: api.description.clone(),
            expression: api.expression.clone(),
            last_updated: None,
        }
    }
}

impl ContentSelectorModel {
    pub fn to_api(&self) -> ContentSelector {
        ContentSelector {
            name: self.name.clone(),
            description: self.description.clone(),
            expression: self.expression.clone(),
            selector_type: None,
        }
    }
}

pub(crate) fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("name").required().min_length(1).requires_replace(),
        Attribute::string("description"),
        Attribute::string("expression")
            .required()
            .min_length(1)
            .description("CSEL expression, e.g. format == \"maven2\" and path =^ \"/org/\"."),
    ]
}

pub struct ContentSelectorResource;

impl Resource for ContentSelectorResource {
    type Model = ContentSelectorModel;

    fn type_name(&self) -> String {
        type_name("content_selector")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a content selector.")
            .attributes(attributes())
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_content_selector(&plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<ContentSelector> = found(client.get_content_selector(&state.name).await?)?;
        Ok(api.as_ref().map(ContentSelectorModel::from))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_content_selector(&state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client
            .delete_content_selector(&state.name)
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(ContentSelectorModel {
            name: id.to_owned(),
            ..ContentSelectorModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn server_type_is_not_persisted() {
        let api = ContentSelector {
            name: "maven-org".into(),
            description: None,
            expression: "format == \"maven2\"".into(),
            selector_type: Some("csel".into()),
        };
        let model = ContentSelectorModel::from(&api);
        assert_eq!(model.expression, "format == \"maven2\"");
        assert_eq!(model.to_api().selector_type, None);
    }

    #[test]
    fn empty_expression_is_rejected() {
        let diags = ContentSelectorResource
            .schema()
            .validate(&json!({ "name": "s", "expression": "" }));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute.as_deref(), Some("expression"));
    }
}
