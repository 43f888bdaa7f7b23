//! Cohesity API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - access token login and caching
//! - [`client`] - main client, one typed method per REST endpoint used
//! - [`http`] - HTTP utilities for REST API calls
//! - [`models`] - request and response bodies
//!
//! # Example
//!
//! ```ignore
//! use cohesity_ops::cohesity::client::{ClusterConnection, CohesityClient};
//!
//! async fn example(conn: &ClusterConnection) -> cohesity_ops::error::Result<()> {
//!     let client = CohesityClient::new(conn)?;
//!     let jobs = client.list_jobs("nightly").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod models;
