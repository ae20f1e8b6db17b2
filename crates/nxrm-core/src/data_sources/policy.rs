// Cleanup policy and routing rule listings. Rows share the resource
// models so a listed entity renders exactly like managed state.

use nxrm_api::NexusClient;
use serde::Serialize;
use serde_json::Value;

use crate::datasource::DataSource;
use crate::error::CoreError;
use crate::lifecycle::type_name;
use crate::resources::cleanup_policy::{self, CleanupPolicyModel};
use crate::resources::routing_rule::{self, RoutingRuleModel};
use crate::schema::{Attribute, Schema, computed_view};

#[derive(Debug, Clone, Serialize)]
pub struct CleanupPolicies {
    pub cleanup_policies: Vec<CleanupPolicyModel>,
}

pub struct CleanupPoliciesDataSource;

impl DataSource for CleanupPoliciesDataSource {
    type Output = CleanupPolicies;

    fn type_name(&self) -> String {
        type_name("cleanup_policies")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every cleanup policy.").attribute(
            Attribute::object_list("cleanup_policies", computed_view(cleanup_policy::attributes()))
                .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<CleanupPolicies, CoreError> {
        let rows = client.list_cleanup_policies().await?;
        Ok(CleanupPolicies {
            cleanup_policies: rows.iter().map(CleanupPolicyModel::from).collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutingRules {
    pub routing_rules: Vec<RoutingRuleModel>,
}

pub struct RoutingRulesDataSource;

impl DataSource for RoutingRulesDataSource {
    type Output = RoutingRules;

    fn type_name(&self) -> String {
        type_name("routing_rules")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every routing rule.").attribute(
            Attribute::object_list("routing_rules", computed_view(routing_rule::attributes()))
                .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<RoutingRules, CoreError> {
        let rows = client.list_routing_rules().await?;
        Ok(RoutingRules {
            routing_rules: rows.iter().map(RoutingRuleModel::from).collect(),
        })
    }
}
