// Repository firewall sub-block of proxy repositories.
//
// The server has no firewall field on the repository itself. Audit and
// quarantine live in a `firewall.audit` capability and policy-compliant
// component selection in a `firewall.pccs` capability, each keyed by its
// `repository` property.

use indexmap::IndexMap;
use nxrm_api::NexusClient;
use nxrm_api::types::{CapabilityRequest, CapabilityResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::property_bag::parse_bool;
use crate::schema::Attribute;

pub const AUDIT_TYPE: &str = "firewall.audit";
pub const PCCS_TYPE: &str = "firewall.pccs";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallModel {
    pub enabled: bool,
    pub quarantine: bool,
    pub pccs_enabled: bool,
}

impl FirewallModel {
    pub fn check(&self) -> Result<(), CoreError> {
        if !self.enabled && self.pccs_enabled {
            return Err(CoreError::validation(
                "repository_firewall.pccs_enabled",
                "pccs_enabled cannot be true when enabled is false",
            ));
        }
        if !self.enabled && self.quarantine {
            return Err(CoreError::validation(
                "repository_firewall.quarantine",
                "quarantine cannot be true when enabled is false",
            ));
        }
        Ok(())
    }
}

pub(crate) fn attribute() -> Attribute {
    Attribute::object(
        "repository_firewall",
        vec![
            Attribute::bool("enabled")
                .default(false)
                .description("Audit this repository with Sonatype Repository Firewall."),
            Attribute::bool("quarantine")
                .default(false)
                .description("Quarantine components that violate policy."),
            Attribute::bool("pccs_enabled")
                .default(false)
                .description("Enable policy-compliant component selection."),
        ],
    )
    .description("Repository Firewall settings (requires a configured IQ connection).")
}

fn for_repository<'a>(
    all: &'a [CapabilityResponse],
    type_id: &str,
    repository: &str,
) -> Option<&'a CapabilityResponse> {
    all.iter().find(|c| {
        c.type_id.as_deref() == Some(type_id) && c.property("repository") == Some(repository)
    })
}

/// Derive the block from the capabilities bound to `repository`.
pub(crate) async fn read(
    client: &NexusClient,
    repository: &str,
) -> Result<Option<FirewallModel>, CoreError> {
    let all = client.list_capabilities().await?;
    let audit = for_repository(&all, AUDIT_TYPE, repository);
    let pccs = for_repository(&all, PCCS_TYPE, repository);
    if audit.is_none() && pccs.is_none() {
        return Ok(None);
    }
    Ok(Some(FirewallModel {
        enabled: audit.is_some_and(|c| c.enabled.unwrap_or(false)),
        quarantine: audit.is_some_and(|c| parse_bool(c.property("quarantine"), false)),
        pccs_enabled: pccs.is_some_and(|c| c.enabled.unwrap_or(false)),
    }))
}

async fn converge(
    client: &NexusClient,
    existing: Option<&CapabilityResponse>,
    wanted: Option<CapabilityRequest>,
) -> Result<(), CoreError> {
    match (existing.and_then(|c| c.id.as_deref()), wanted) {
        (Some(id), Some(body)) => {
            client.update_capability(id, &body).await?.expect(&[200, 204])?;
        }
        (None, Some(body)) => {
            client.create_capability(&body).await?.expect(&[200, 201])?;
        }
        (Some(id), None) => {
            client.delete_capability(id).await?.expect(&[200, 204, 404])?;
        }
        (None, None) => {}
    }
    Ok(())
}

/// Create, update or delete the firewall capabilities so they match
/// `desired`. `None` removes both.
pub(crate) async fn apply(
    client: &NexusClient,
    repository: &str,
    desired: Option<&FirewallModel>,
) -> Result<(), CoreError> {
    let all = client.list_capabilities().await?;
    let desired = desired.cloned().unwrap_or_default();
    debug!(repository, ?desired, "syncing repository firewall capabilities");

    let audit = desired.enabled.then(|| CapabilityRequest {
        type_id: AUDIT_TYPE.to_owned(),
        notes: None,
        enabled: true,
        properties: IndexMap::from([
            ("repository".to_owned(), repository.to_owned()),
            ("quarantine".to_owned(), desired.quarantine.to_string()),
        ]),
    });
    converge(client, for_repository(&all, AUDIT_TYPE, repository), audit).await?;

    let pccs = desired.pccs_enabled.then(|| CapabilityRequest {
        type_id: PCCS_TYPE.to_owned(),
        notes: None,
        enabled: true,
        properties: IndexMap::from([("repository".to_owned(), repository.to_owned())]),
    });
    converge(client, for_repository(&all, PCCS_TYPE, repository), pccs).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_orphan_flags() {
        let pccs = FirewallModel {
            enabled: false,
            quarantine: false,
            pccs_enabled: true,
        };
        assert!(pccs.check().is_err());

        let quarantine = FirewallModel {
            enabled: false,
            quarantine: true,
            pccs_enabled: false,
        };
        assert!(quarantine.check().is_err());

        let ok = FirewallModel {
            enabled: true,
            quarantine: true,
            pccs_enabled: true,
        };
        assert!(ok.check().is_ok());
    }
}
