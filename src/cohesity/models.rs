//! Wire types for the Cohesity v1 public API
//!
//! Only the fields this tool reads or writes are modelled. Protection jobs
//! keep every other server field in `extra` so a read-modify-write update
//! sends the object back intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Environment tag for VMware sources
pub const ENV_VMWARE: &str = "kVMware";

/// Source tree type tags used by restore targets
pub const TYPE_RESOURCE_POOL: &str = "kResourcePool";
pub const TYPE_DATASTORE: &str = "kDatastore";
pub const TYPE_HOST_SYSTEM: &str = "kHostSystem";
pub const TYPE_VIRTUAL_MACHINE: &str = "kVirtualMachine";

// =============================================================================
// Authentication
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub domain: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// =============================================================================
// Storage domains and policies
// =============================================================================

/// A storage domain (view box)
#[derive(Debug, Clone, Deserialize)]
pub struct ViewBox {
    pub id: i64,
    pub name: String,
}

/// Policy ids are `clusterId:incarnationId:id` strings
#[derive(Debug, Clone, Deserialize)]
pub struct ProtectionPolicy {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Protection sources
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionSource {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(
        default,
        rename = "vmWareProtectionSource",
        skip_serializing_if = "Option::is_none"
    )]
    pub vmware_protection_source: Option<VmwareProtectionSource>,
}

impl ProtectionSource {
    /// VMware object type (`kVCenter`, `kResourcePool`, ...), if any
    pub fn vmware_type(&self) -> Option<&str> {
        self.vmware_protection_source
            .as_ref()
            .and_then(|s| s.kind.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmwareProtectionSource {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessInfo {
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInfo {
    #[serde(default)]
    pub access_info: Option<AccessInfo>,
}

/// One node of a protection source tree
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionSourceNode {
    pub protection_source: ProtectionSource,
    #[serde(default)]
    pub registration_info: Option<RegistrationInfo>,
    #[serde(default)]
    pub nodes: Vec<ProtectionSourceNode>,
}

impl ProtectionSourceNode {
    /// Endpoint the source was registered with
    pub fn endpoint(&self) -> Option<&str> {
        self.registration_info
            .as_ref()
            .and_then(|r| r.access_info.as_ref())
            .and_then(|a| a.endpoint.as_deref())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSourceRequest<'a> {
    pub endpoint: &'a str,
    pub environment: &'static str,
    pub username: &'a str,
    pub password: &'a str,
    pub vmware_type: &'static str,
}

// =============================================================================
// Protection jobs
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_box_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_source_id: Option<i64>,
    #[serde(default)]
    pub source_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ChangeJobStateParam {
    pub pause: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobsStateRequest {
    pub action: &'static str,
    pub job_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunJobParam {
    pub run_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobParam {
    pub delete_snapshots: bool,
}

// =============================================================================
// Protection runs
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    #[serde(default)]
    pub start_time_usecs: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRun {
    pub job_run_id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stats: Option<RunStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionRun {
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub backup_run: Option<BackupRun>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRunParam {
    pub job_run_id: i64,
}

// =============================================================================
// Snapshots and recovery
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalId {
    pub cluster_id: i64,
    pub cluster_incarnation_id: i64,
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotVersion {
    pub job_run_id: i64,
    pub started_time_usecs: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSnapshotInfo {
    pub job_id: i64,
    #[serde(default)]
    pub job_uid: UniversalId,
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub snapshotted_source: Option<ProtectionSource>,
    #[serde(default)]
    pub versions: Vec<SnapshotVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSearchResults {
    #[serde(default)]
    pub object_snapshot_info: Vec<ObjectSnapshotInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreObject {
    pub environment: &'static str,
    pub job_id: i64,
    pub job_run_id: i64,
    pub job_uid: UniversalId,
    pub protection_source_id: i64,
    pub source_name: String,
    pub started_time_usecs: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmwareRestoreParameters {
    pub powered_on: bool,
    pub recovery_process_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_pool_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastore_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverTaskRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub objects: Vec<RestoreObject>,
    pub vmware_parameters: VmwareRestoreParameters,
}
