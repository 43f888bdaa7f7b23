//! Cluster operations
//!
//! Every operation takes the shared [`CohesityClient`](crate::cohesity::client::CohesityClient)
//! and returns the status line to show the user, or a [`CohesityError`](crate::error::CohesityError).

pub mod jobs;
pub mod register;
pub mod restore;

pub use jobs::{
    cancel_job_run, change_job_state, create_job, delete_job, merge_source_ids, run_job,
    update_job, CreateJob, JobAction, UpdateJob,
};
pub use register::register_vcenter;
pub use restore::{default_task_name, latest_snapshot, restore_vms, RestoreVms, SnapshotRef};
