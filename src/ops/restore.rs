//! VM restore from the latest snapshot

use crate::cohesity::client::CohesityClient;
use crate::cohesity::models::{
    ObjectSnapshotInfo, RecoverTaskRequest, RestoreObject, UniversalId, VmwareRestoreParameters,
    ENV_VMWARE, TYPE_DATASTORE, TYPE_RESOURCE_POOL,
};
use crate::error::{CohesityError, Result};
use crate::source::{self, NamedEntity};
use chrono::{DateTime, Utc};

/// Parameters for [`restore_vms`]
#[derive(Debug, Clone)]
pub struct RestoreVms {
    pub task_name: String,
    pub vcenter: String,
    pub vm_names: Vec<String>,
    /// Target resource pool; empty restores in place
    pub resource_pool: String,
    /// Target datastore; empty restores in place
    pub datastore: String,
    pub prefix: String,
    pub suffix: String,
    pub powered_on: bool,
}

impl RestoreVms {
    pub fn new(task_name: &str, vcenter: &str, vm_names: Vec<String>) -> Self {
        Self {
            task_name: task_name.to_string(),
            vcenter: vcenter.to_string(),
            vm_names,
            resource_pool: String::new(),
            datastore: String::new(),
            prefix: String::new(),
            suffix: String::new(),
            powered_on: true,
        }
    }

    fn has_target(&self) -> bool {
        !self.resource_pool.is_empty() || !self.datastore.is_empty()
    }
}

/// Default task name when none is given
pub fn default_task_name(now: DateTime<Utc>) -> String {
    format!("Recover_VMs_{}", now.format("%b_%d_%Y_%H-%M"))
}

/// The snapshot a restore object points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    pub job_id: i64,
    pub job_run_id: i64,
    pub job_uid: UniversalId,
    pub started_time_usecs: i64,
}

/// Newest snapshot version of `vm` among search results.
///
/// Entries count when their snapshotted source id equals the VM id, or, when
/// the source is missing, when the object name equals the VM name. Equal
/// timestamps resolve to the later entry.
pub fn latest_snapshot(infos: &[ObjectSnapshotInfo], vm: &NamedEntity<i64>) -> Option<SnapshotRef> {
    let mut best: Option<SnapshotRef> = None;

    let belongs = |info: &ObjectSnapshotInfo| match &info.snapshotted_source {
        Some(source) => source.id == vm.id,
        None => info.object_name.as_deref() == Some(vm.name.as_str()),
    };

    for info in infos.iter().filter(|i| belongs(*i)) {
        for version in &info.versions {
            let newer = best
                .as_ref()
                .map_or(true, |b| version.started_time_usecs >= b.started_time_usecs);
            if newer {
                best = Some(SnapshotRef {
                    job_id: info.job_id,
                    job_run_id: version.job_run_id,
                    job_uid: info.job_uid.clone(),
                    started_time_usecs: version.started_time_usecs,
                });
            }
        }
    }

    best
}

fn format_usecs(usecs: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(usecs)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| usecs.to_string())
}

fn target_name(name: &str) -> Option<&str> {
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Recover VMs from their latest snapshots with one recover task
pub async fn restore_vms(client: &CohesityClient, req: &RestoreVms) -> Result<String> {
    let (parent_id, vms) = source::require_sources(client, &req.vcenter, &req.vm_names).await?;

    let mut params = VmwareRestoreParameters {
        powered_on: req.powered_on,
        recovery_process_type: "kInstantRecovery",
        prefix: target_name(&req.prefix).map(str::to_string),
        suffix: target_name(&req.suffix).map(str::to_string),
        ..Default::default()
    };

    if req.has_target() {
        let tree = client.list_source_tree(parent_id).await?;
        let pool = target_name(&req.resource_pool);
        let resource_pool_id = source::resolve_leaf(&tree, TYPE_RESOURCE_POOL, pool)
            .ok_or_else(|| CohesityError::not_found("Resource pool", pool.unwrap_or("<any>")))?;
        let datastore = target_name(&req.datastore);
        let datastore_id = source::resolve_leaf(&tree, TYPE_DATASTORE, datastore)
            .ok_or_else(|| CohesityError::not_found("Datastore", datastore.unwrap_or("<any>")))?;

        params.resource_pool_id = Some(resource_pool_id);
        params.datastore_id = Some(datastore_id);
        params.new_parent_id = Some(parent_id);
    }

    let mut objects = Vec::with_capacity(vms.len());
    for vm in &vms {
        let results = client.search_objects(&vm.name, parent_id).await?;
        let snapshot = latest_snapshot(&results.object_snapshot_info, vm)
            .ok_or_else(|| CohesityError::NoSnapshot(vm.name.clone()))?;

        tracing::info!(
            "Restoring {} from run {} of job {} taken at {}",
            vm.name,
            snapshot.job_run_id,
            snapshot.job_id,
            format_usecs(snapshot.started_time_usecs)
        );

        objects.push(RestoreObject {
            environment: ENV_VMWARE,
            job_id: snapshot.job_id,
            job_run_id: snapshot.job_run_id,
            job_uid: snapshot.job_uid,
            protection_source_id: vm.id,
            source_name: vm.name.clone(),
            started_time_usecs: snapshot.started_time_usecs,
        });
    }

    let body = RecoverTaskRequest {
        name: req.task_name.clone(),
        kind: "kRecoverVMs",
        objects,
        vmware_parameters: params,
    };
    client.create_recover_task(&body).await?;

    Ok(format!("Successfully created restore task '{}'.", req.task_name))
}
