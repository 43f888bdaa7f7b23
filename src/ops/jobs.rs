//! Protection job operations
//!
//! Each operation resolves the job (and any sources) by name, issues the
//! mutating call and returns the status line for the user.

use crate::cohesity::client::CohesityClient;
use crate::cohesity::models::{
    CancelRunParam, ChangeJobStateParam, DeleteJobParam, ProtectionJob, RunJobParam,
    UpdateJobsStateRequest, ENV_VMWARE,
};
use crate::error::{CohesityError, Result};
use crate::source;
use std::fmt;
use std::str::FromStr;

/// Run statuses that can still be cancelled
const CANCELLABLE_STATUSES: &[&str] = &["kRunning", "kAccepted"];

/// Parameters for [`create_job`]
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub name: String,
    pub vcenter: String,
    pub sources: Vec<String>,
    pub policy: String,
    pub storage_domain: String,
    /// Pause the job right after creation
    pub pause: bool,
    pub timezone: String,
    pub description: String,
}

impl CreateJob {
    pub fn new(name: &str, vcenter: &str, sources: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            vcenter: vcenter.to_string(),
            sources,
            policy: "Gold".to_string(),
            storage_domain: "DefaultStorageDomain".to_string(),
            pause: true,
            timezone: "Europe/Berlin".to_string(),
            description: String::new(),
        }
    }
}

/// Parameters for [`update_job`]
#[derive(Debug, Clone)]
pub struct UpdateJob {
    pub name: String,
    pub vcenter: String,
    pub sources: Vec<String>,
    /// Replace the member list instead of adding to it
    pub replace_existing: bool,
}

/// State transitions accepted by [`change_job_state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Activate,
    Deactivate,
    Pause,
    Resume,
}

impl JobAction {
    pub const SUPPORTED: [&'static str; 4] = ["activate", "deactivate", "pause", "resume"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Pause => "pause",
            Self::Resume => "resume",
        }
    }

    /// Action name as the batch state endpoint expects it
    pub fn wire_verb(&self) -> &'static str {
        match self {
            Self::Activate => "kActivate",
            Self::Deactivate => "kDeactivate",
            Self::Pause => "kPause",
            Self::Resume => "kResume",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = CohesityError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "activate" => Ok(Self::Activate),
            "deactivate" => Ok(Self::Deactivate),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            other => Err(CohesityError::UnsupportedState {
                state: other.to_string(),
                supported: Self::SUPPORTED.join(", "),
            }),
        }
    }
}

/// Append `new_ids` to `existing`, skipping ids already present
pub fn merge_source_ids(existing: &[i64], new_ids: &[i64], replace_existing: bool) -> Vec<i64> {
    let mut merged: Vec<i64> = if replace_existing {
        Vec::new()
    } else {
        existing.to_vec()
    };
    for id in new_ids {
        if !merged.contains(id) {
            merged.push(*id);
        }
    }
    merged
}

/// Create a VMware protection job, optionally leaving it paused
pub async fn create_job(client: &CohesityClient, req: &CreateJob) -> Result<String> {
    match source::select_job(client.list_jobs(&req.name).await?, &req.name) {
        Ok(_) | Err(CohesityError::Ambiguous { .. }) => {
            return Err(CohesityError::already_exists("Job", &req.name));
        }
        Err(CohesityError::NotFound { .. }) => {}
        Err(other) => return Err(other),
    }

    let policy = source::policy(client, &req.policy).await?;
    let storage_domain = source::storage_domain(client, &req.storage_domain).await?;
    let (parent_id, sources) =
        source::require_sources(client, &req.vcenter, &req.sources).await?;

    let body = ProtectionJob {
        name: req.name.clone(),
        description: Some(req.description.clone()),
        policy_id: Some(policy.id),
        view_box_id: Some(storage_domain.id),
        environment: Some(ENV_VMWARE.to_string()),
        parent_source_id: Some(parent_id),
        source_ids: sources.iter().map(|s| s.id).collect(),
        timezone: Some(req.timezone.clone()),
        ..Default::default()
    };

    tracing::info!(
        "Creating protection job {} with {} sources",
        body.name,
        body.source_ids.len()
    );
    let created = client.create_job(&body).await?;

    if req.pause {
        let job_id = created
            .id
            .ok_or_else(|| CohesityError::Parse(format!("Created job {} has no id", req.name)))?;
        tracing::info!("Pausing protection job {} ({})", req.name, job_id);
        client
            .change_job_state(job_id, &ChangeJobStateParam { pause: true })
            .await?;
    }

    Ok(format!("Successfully created ProtectionGroup: {}", req.name))
}

/// Replace or extend the VMs protected by a job
pub async fn update_job(client: &CohesityClient, req: &UpdateJob) -> Result<String> {
    let (job_id, mut job) = source::find_job(client, &req.name).await?;
    let (_, sources) = source::require_sources(client, &req.vcenter, &req.sources).await?;
    let new_ids: Vec<i64> = sources.iter().map(|s| s.id).collect();

    job.source_ids = merge_source_ids(&job.source_ids, &new_ids, req.replace_existing);

    tracing::info!(
        "Updating protection job {} ({}), {} sources",
        req.name,
        job_id,
        job.source_ids.len()
    );
    client.update_job(job_id, &job).await?;

    Ok(format!("Successfully Updated ProtectionGroup: {}", job.name))
}

/// Activate, deactivate, pause or resume future runs of a job
pub async fn change_job_state(client: &CohesityClient, name: &str, state: &str) -> Result<String> {
    let action: JobAction = state.parse()?;
    let (job_id, _) = source::find_job(client, name).await?;

    let body = UpdateJobsStateRequest {
        action: action.wire_verb(),
        job_ids: vec![job_id],
    };
    tracing::info!("Sending {} for protection job {} ({})", body.action, name, job_id);
    client.update_jobs_state(&body).await?;

    Ok(format!("Successfully {}d future run for job {}", action, name))
}

/// Cancel the latest run of a job if it is still running or queued
pub async fn cancel_job_run(client: &CohesityClient, name: &str) -> Result<String> {
    let (job_id, _) = source::find_job(client, name).await?;

    let runs = client.list_runs(job_id).await?;
    let Some(latest) = runs.into_iter().next() else {
        return Err(CohesityError::NoRuns(name.to_string()));
    };
    let Some(latest) = latest.backup_run else {
        tracing::info!("Latest run of {} has no backup run, nothing to cancel", name);
        return Err(CohesityError::NoActiveRun(name.to_string()));
    };

    let status = latest.status.as_deref().unwrap_or_default();
    if !CANCELLABLE_STATUSES.contains(&status) {
        tracing::info!("Latest run {} of {} is {}, nothing to cancel", latest.job_run_id, name, status);
        return Err(CohesityError::NoActiveRun(name.to_string()));
    }

    tracing::info!("Cancelling run {} of protection job {}", latest.job_run_id, name);
    client
        .cancel_run(
            job_id,
            &CancelRunParam {
                job_run_id: latest.job_run_id,
            },
        )
        .await?;

    Ok(format!("Successfully cancelled the run for job {}", name))
}

/// Start an ad-hoc run of a job
pub async fn run_job(client: &CohesityClient, name: &str) -> Result<String> {
    let (job_id, _) = source::find_job(client, name).await?;

    tracing::info!("Starting run of protection job {} ({})", name, job_id);
    client
        .run_job(job_id, &RunJobParam { run_type: "kRegular" })
        .await?;

    Ok(format!("Successfully started run for job {}", name))
}

/// Delete a job, optionally with its snapshots
pub async fn delete_job(client: &CohesityClient, name: &str, delete_snapshots: bool) -> Result<String> {
    let (job_id, _) = source::find_job(client, name).await?;

    tracing::info!(
        "Deleting protection job {} ({}), delete_snapshots={}",
        name,
        job_id,
        delete_snapshots
    );
    client
        .delete_job(job_id, &DeleteJobParam { delete_snapshots })
        .await?;

    Ok(format!("Successfully deleted job {}", name))
}
