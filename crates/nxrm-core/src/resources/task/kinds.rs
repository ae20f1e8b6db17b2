// Property blocks of the individual task templates.

use serde::{Deserialize, Serialize};

use super::TaskProperties;
use crate::property_bag::{PropertyBag, PropertyField, parse_bool, parse_int};
use crate::schema::Attribute;

// ── license.expiration.notification ──────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseExpirationProperties {}

impl PropertyBag for LicenseExpirationProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        Vec::new()
    }
}

impl TaskProperties for LicenseExpirationProperties {
    const TYPE_ID: &'static str = "license.expiration.notification";
    const NAME: &'static str = "license_expiration_notification";
    const DESCRIPTION: &'static str = "Schedule e-mail notifications about license expiry.";

    fn attributes() -> Vec<Attribute> {
        Vec::new()
    }
}

// ── repository.docker.gc ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerGcProperties {
    pub repository_name: String,
    pub deploy_offset: i64,
}

impl PropertyBag for DockerGcProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "repositoryName",
                read: |m| Some(m.repository_name.clone()),
                write: |m, raw| m.repository_name = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "deployOffset",
                read: |m| Some(m.deploy_offset.to_string()),
                write: |m, raw| m.deploy_offset = parse_int(raw, 24),
            },
        ]
    }
}

impl TaskProperties for DockerGcProperties {
    const TYPE_ID: &'static str = "repository.docker.gc";
    const NAME: &'static str = "repository_docker_gc";
    const DESCRIPTION: &'static str = "Delete unused Docker manifests and images.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("repository_name")
                .required()
                .min_length(1)
                .description("Docker repository to clean, or * for all."),
            Attribute::int64("deploy_offset")
                .default(24)
                .at_least(0)
                .description("Hours a manifest must be unreferenced before removal."),
        ]
    }
}

// ── repository.docker.upload-purge ───────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerUploadPurgeProperties {
    pub age: i64,
}

impl PropertyBag for DockerUploadPurgeProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "age",
            read: |m| Some(m.age.to_string()),
            write: |m, raw| m.age = parse_int(raw, 24),
        }]
    }
}

impl TaskProperties for DockerUploadPurgeProperties {
    const TYPE_ID: &'static str = "repository.docker.upload-purge";
    const NAME: &'static str = "repository_docker_upload_purge";
    const DESCRIPTION: &'static str = "Purge incomplete Docker uploads.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::int64("age")
                .default(24)
                .at_least(1)
                .description("Hours after which an unfinished upload is purged."),
        ]
    }
}

// ── repository.maven.remove-snapshots ────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenRemoveSnapshotsProperties {
    pub repository_name: String,
    pub minimum_retained: i64,
    pub snapshot_retention_days: i64,
    pub remove_if_released: bool,
    /// `0` means unset and is never sent.
    pub grace_period_in_days: i64,
}

impl PropertyBag for MavenRemoveSnapshotsProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "repositoryName",
                read: |m| Some(m.repository_name.clone()),
                write: |m, raw| m.repository_name = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "minimumRetained",
                read: |m| Some(m.minimum_retained.to_string()),
                write: |m, raw| m.minimum_retained = parse_int(raw, 1),
            },
            PropertyField {
                key: "snapshotRetentionDays",
                read: |m| Some(m.snapshot_retention_days.to_string()),
                write: |m, raw| m.snapshot_retention_days = parse_int(raw, 30),
            },
            PropertyField {
                key: "removeIfReleased",
                read: |m| Some(m.remove_if_released.to_string()),
                write: |m, raw| m.remove_if_released = parse_bool(raw, false),
            },
            PropertyField {
                key: "gracePeriodInDays",
                read: |m| (m.grace_period_in_days != 0).then(|| m.grace_period_in_days.to_string()),
                write: |m, raw| m.grace_period_in_days = parse_int(raw, 0),
            },
        ]
    }
}

impl TaskProperties for MavenRemoveSnapshotsProperties {
    const TYPE_ID: &'static str = "repository.maven.remove-snapshots";
    const NAME: &'static str = "repository_maven_remove_snapshots";
    const DESCRIPTION: &'static str = "Remove old Maven snapshot versions.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("repository_name").required().min_length(1),
            Attribute::int64("minimum_retained").default(1).at_least(0),
            Attribute::int64("snapshot_retention_days").default(30).at_least(0),
            Attribute::bool("remove_if_released").default(false),
            Attribute::int64("grace_period_in_days")
                .default(0)
                .at_least(0)
                .description("Days to keep snapshots once a release exists; 0 leaves it unset."),
        ]
    }
}

// ── blobstore.compact ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobStoreCompactProperties {
    pub blob_store_name: String,
}

impl PropertyBag for BlobStoreCompactProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![PropertyField {
            key: "blobstoreName",
            read: |m| Some(m.blob_store_name.clone()),
            write: |m, raw| m.blob_store_name = raw.unwrap_or_default().to_owned(),
        }]
    }
}

impl TaskProperties for BlobStoreCompactProperties {
    const TYPE_ID: &'static str = "blobstore.compact";
    const NAME: &'static str = "blobstore_compact";
    const DESCRIPTION: &'static str = "Hard-delete soft-deleted blobs from a blob store.";

    fn attributes() -> Vec<Attribute> {
        vec![Attribute::string("blob_store_name").required().min_length(1)]
    }
}

// ── repository.purge-unused ──────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeUnusedProperties {
    pub repository_name: String,
    pub last_used: i64,
}

impl PropertyBag for PurgeUnusedProperties {
    fn fields() -> Vec<PropertyField<Self>> {
        vec![
            PropertyField {
                key: "repositoryName",
                read: |m| Some(m.repository_name.clone()),
                write: |m, raw| m.repository_name = raw.unwrap_or_default().to_owned(),
            },
            PropertyField {
                key: "lastUsed",
                read: |m| Some(m.last_used.to_string()),
                write: |m, raw| m.last_used = parse_int(raw, 0),
            },
        ]
    }
}

impl TaskProperties for PurgeUnusedProperties {
    const TYPE_ID: &'static str = "repository.purge-unused";
    const NAME: &'static str = "repository_purge_unused";
    const DESCRIPTION: &'static str = "Purge components and assets of a proxy repository not used recently.";

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("repository_name").required().min_length(1),
            Attribute::int64("last_used")
                .required()
                .at_least(1)
                .description("Days since last use."),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn zero_grace_period_is_elided() {
        let mut props = MavenRemoveSnapshotsProperties {
            repository_name: "maven-snapshots".into(),
            minimum_retained: 2,
            snapshot_retention_days: 10,
            remove_if_released: true,
            grace_period_in_days: 0,
        };
        assert!(!props.to_properties().contains_key("gracePeriodInDays"));

        props.grace_period_in_days = 3;
        assert_eq!(
            props.to_properties().get("gracePeriodInDays").map(String::as_str),
            Some("3")
        );
    }

    #[test]
    fn missing_keys_use_declared_defaults() {
        let props = MavenRemoveSnapshotsProperties::from_properties(&indexmap::IndexMap::new());
        assert_eq!(props.minimum_retained, 1);
        assert_eq!(props.snapshot_retention_days, 30);
        assert!(!props.remove_if_released);
        assert_eq!(props.grace_period_in_days, 0);
    }
}
