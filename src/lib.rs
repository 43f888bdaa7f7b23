//! Automation for Cohesity data protection
//!
//! Registers VMware sources, manages VMware protection jobs and restores
//! VMs through the cluster's v1 REST API. Every operation in [`ops`] takes
//! one explicitly constructed [`CohesityClient`] and yields a one-line
//! status message.

pub mod cohesity;
pub mod config;
pub mod error;
pub mod ops;
pub mod source;

pub use cohesity::client::{ClusterConnection, CohesityClient};
pub use error::{report, CohesityError, Result};
