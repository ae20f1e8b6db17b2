//! Blob store bodies for `/v1/blobstores/{file,group,s3,google}`.
//!
//! `name` is optional on every shape: the server omits it from some GET
//! responses and ignores it on PUT.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftQuota {
    /// `spaceRemainingQuota` or `spaceUsedQuota`.
    #[serde(rename = "type")]
    pub quota_type: String,
    /// Bytes.
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBlobStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBlobStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
    #[serde(default)]
    pub members: Vec<String>,
    /// `roundRobin` or `writeToFirst`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_policy: Option<String>,
}

// ── S3 ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Bucket {
    pub region: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Days before soft-deleted blobs are purged; `-1` disables.
    pub expiration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Encryption {
    /// `s3ManagedEncryption` or `kmsManagedEncryption`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BucketSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Write-only: never echoed by GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Write-only: never echoed by GET.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3AdvancedBucketConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_path_style: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connection_pool_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BucketConfiguration {
    pub bucket: S3Bucket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<S3Encryption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_security: Option<S3BucketSecurity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_bucket_connection: Option<S3AdvancedBucketConnection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3BlobStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
    pub bucket_configuration: S3BucketConfiguration,
}

// ── Google Cloud ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleBucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleBucketSecurity {
    /// `applicationDefault` or `accountKey`.
    pub authentication_method: String,
    /// Write-only service account JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEncryption {
    /// `default` or `kmsManagedEncryption`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleBucketConfiguration {
    pub bucket: GoogleBucket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_security: Option<GoogleBucketSecurity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<GoogleEncryption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleBlobStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota: Option<SoftQuota>,
    pub bucket_configuration: GoogleBucketConfiguration,
}

// ── Listing ──────────────────────────────────────────────────────────

/// Row from `GET /v1/blobstores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobStoreSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub store_type: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub blob_count: i64,
    #[serde(default)]
    pub total_size_in_bytes: i64,
    #[serde(default)]
    pub available_space_in_bytes: i64,
    #[serde(default)]
    pub soft_quota: Option<SoftQuota>,
}
