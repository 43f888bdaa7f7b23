//! Cohesity Client
//!
//! Main client for interacting with the cluster API, combining authentication
//! and HTTP functionality. One client is built per process from a
//! [`ClusterConnection`] and passed to every operation.

use super::auth::CohesityCredentials;
use super::http::CohesityHttpClient;
use super::models::*;
use crate::error::{CohesityError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const API_PREFIX: &str = "/irisservices/api/v1/public";

/// Connection settings for one cluster
#[derive(Clone)]
pub struct ClusterConnection {
    /// Cluster VIP, hostname or full base URL
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Authentication domain, `LOCAL` for cluster users
    pub domain: String,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClusterConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterConnection")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("verify_tls", &self.verify_tls)
            .finish_non_exhaustive()
    }
}

impl ClusterConnection {
    /// Base URL for the cluster. Bare hosts get `https://`.
    pub fn base_url(&self) -> Result<String> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(CohesityError::Config(
                "No cluster endpoint configured".to_string(),
            ));
        }
        let raw = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };
        let url = Url::parse(&raw)
            .map_err(|e| CohesityError::Config(format!("Invalid cluster endpoint {}: {}", endpoint, e)))?;
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

/// Main Cohesity client
#[derive(Clone)]
pub struct CohesityClient {
    pub credentials: CohesityCredentials,
    pub http: CohesityHttpClient,
}

impl CohesityClient {
    /// Create a new client. No network traffic happens until the first call.
    pub fn new(connection: &ClusterConnection) -> Result<Self> {
        let base_url = connection.base_url()?;
        let http = CohesityHttpClient::new(&base_url, connection.verify_tls, connection.timeout)?;
        let credentials = CohesityCredentials::new(
            &connection.username,
            &connection.password,
            &connection.domain,
        );

        Ok(Self { credentials, http })
    }

    async fn token(&self) -> Result<String> {
        self.credentials.get_token(&self.http).await
    }

    /// Drop a token the cluster no longer accepts so the next call logs in again
    async fn check_auth<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(CohesityError::Auth(ref message)) = result {
            tracing::warn!("Access token rejected ({}), clearing cached token", message);
            self.credentials.invalidate().await;
        }
        result
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<R> {
        let token = self.token().await?;
        let result = self.http.get(path, &token, query).await;
        self.check_auth(result).await
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let token = self.token().await?;
        let result = self.http.post(path, &token, body).await;
        self.check_auth(result).await
    }

    async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let token = self.token().await?;
        let result = self.http.put(path, &token, body).await;
        self.check_auth(result).await
    }

    async fn delete<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let token = self.token().await?;
        let result = self.http.delete(path, &token, body).await;
        self.check_auth(result).await
    }

    /// Build a public API path
    pub fn api_path(path: &str) -> String {
        format!("{}/{}", API_PREFIX, path.trim_start_matches('/'))
    }

    // =========================================================================
    // Storage domains and policies
    // =========================================================================

    pub async fn list_view_boxes(&self, name: &str) -> Result<Vec<ViewBox>> {
        let boxes: Option<Vec<ViewBox>> = self
            .get(&Self::api_path("viewBoxes"), &[("names", name.to_string())])
            .await?;
        Ok(boxes.unwrap_or_default())
    }

    pub async fn list_protection_policies(&self, name: &str) -> Result<Vec<ProtectionPolicy>> {
        let policies: Option<Vec<ProtectionPolicy>> = self
            .get(
                &Self::api_path("protectionPolicies"),
                &[("names", name.to_string())],
            )
            .await?;
        Ok(policies.unwrap_or_default())
    }

    // =========================================================================
    // Protection sources
    // =========================================================================

    /// Registered root sources of one environment
    pub async fn list_root_sources(&self, environment: &str) -> Result<Vec<ProtectionSourceNode>> {
        let roots: Option<Vec<ProtectionSourceNode>> = self
            .get(
                &Self::api_path("protectionSources/rootNodes"),
                &[("environments", environment.to_string())],
            )
            .await?;
        Ok(roots.unwrap_or_default())
    }

    /// Virtual machines under a vCenter, filtered by name
    pub async fn list_virtual_machines(
        &self,
        vcenter_id: i64,
        names: &[String],
    ) -> Result<Vec<ProtectionSource>> {
        let mut query = vec![("vCenterId", vcenter_id.to_string())];
        query.extend(names.iter().map(|n| ("names", n.clone())));
        let vms: Option<Vec<ProtectionSource>> = self
            .get(&Self::api_path("protectionSources/virtualMachines"), &query)
            .await?;
        Ok(vms.unwrap_or_default())
    }

    /// Source tree under `id`, datastores included, hosts and VMs excluded
    pub async fn list_source_tree(&self, id: i64) -> Result<Vec<ProtectionSourceNode>> {
        let query = [
            ("id", id.to_string()),
            ("includeDatastores", "true".to_string()),
            ("excludeTypes", TYPE_HOST_SYSTEM.to_string()),
            ("excludeTypes", TYPE_VIRTUAL_MACHINE.to_string()),
            ("environment", ENV_VMWARE.to_string()),
        ];
        let tree: Option<Vec<ProtectionSourceNode>> = self
            .get(&Self::api_path("protectionSources"), &query)
            .await?;
        Ok(tree.unwrap_or_default())
    }

    pub async fn register_source(&self, body: &RegisterSourceRequest<'_>) -> Result<Value> {
        self.post(&Self::api_path("protectionSources/register"), body).await
    }

    // =========================================================================
    // Protection jobs
    // =========================================================================

    /// Non-deleted jobs matching `name`
    pub async fn list_jobs(&self, name: &str) -> Result<Vec<ProtectionJob>> {
        let query = [
            ("names", name.to_string()),
            ("isDeleted", "false".to_string()),
        ];
        let jobs: Option<Vec<ProtectionJob>> = self
            .get(&Self::api_path("protectionJobs"), &query)
            .await?;
        Ok(jobs.unwrap_or_default())
    }

    pub async fn create_job(&self, job: &ProtectionJob) -> Result<ProtectionJob> {
        self.post(&Self::api_path("protectionJobs"), job).await
    }

    /// Full-object update
    pub async fn update_job(&self, job_id: i64, job: &ProtectionJob) -> Result<Value> {
        self.put(&Self::api_path(&format!("protectionJobs/{}", job_id)), job).await
    }

    pub async fn change_job_state(&self, job_id: i64, body: &ChangeJobStateParam) -> Result<Value> {
        self.post(&Self::api_path(&format!("protectionJobState/{}", job_id)), body).await
    }

    pub async fn update_jobs_state(&self, body: &UpdateJobsStateRequest) -> Result<Value> {
        self.post(&Self::api_path("protectionJobs/states"), body).await
    }

    pub async fn run_job(&self, job_id: i64, body: &RunJobParam) -> Result<Value> {
        self.post(&Self::api_path(&format!("protectionJobs/run/{}", job_id)), body).await
    }

    pub async fn delete_job(&self, job_id: i64, body: &DeleteJobParam) -> Result<Value> {
        self.delete(&Self::api_path(&format!("protectionJobs/{}", job_id)), body).await
    }

    // =========================================================================
    // Protection runs
    // =========================================================================

    /// Runs of a job, newest first
    pub async fn list_runs(&self, job_id: i64) -> Result<Vec<ProtectionRun>> {
        let runs: Option<Vec<ProtectionRun>> = self
            .get(
                &Self::api_path("protectionRuns"),
                &[("jobId", job_id.to_string())],
            )
            .await?;
        Ok(runs.unwrap_or_default())
    }

    pub async fn cancel_run(&self, job_id: i64, body: &CancelRunParam) -> Result<Value> {
        self.post(&Self::api_path(&format!("protectionRuns/cancel/{}", job_id)), body).await
    }

    // =========================================================================
    // Restore
    // =========================================================================

    /// Snapshot search scoped to one registered source
    pub async fn search_objects(
        &self,
        search: &str,
        registered_source_id: i64,
    ) -> Result<ObjectSearchResults> {
        let query = [
            ("search", search.to_string()),
            ("environments", ENV_VMWARE.to_string()),
            ("registeredSourceIds", registered_source_id.to_string()),
        ];
        let results: Option<ObjectSearchResults> = self
            .get(&Self::api_path("restore/objects"), &query)
            .await?;
        Ok(results.unwrap_or_default())
    }

    pub async fn create_recover_task(&self, body: &RecoverTaskRequest) -> Result<Value> {
        self.post(&Self::api_path("restore/recover"), body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(endpoint: &str) -> ClusterConnection {
        ClusterConnection {
            endpoint: endpoint.to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            domain: "LOCAL".to_string(),
            verify_tls: true,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_base_url_adds_https_for_bare_host() {
        assert_eq!(
            connection("10.2.3.4").base_url().unwrap(),
            "https://10.2.3.4"
        );
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        assert_eq!(
            connection("http://127.0.0.1:8080/").base_url().unwrap(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_empty_endpoint_is_config_error() {
        assert!(matches!(
            connection("  ").base_url(),
            Err(CohesityError::Config(_))
        ));
    }

    #[test]
    fn test_api_path() {
        assert_eq!(
            CohesityClient::api_path("protectionJobs/run/5"),
            "/irisservices/api/v1/public/protectionJobs/run/5"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let out = format!("{:?}", connection("vip").clone());
        assert!(!out.contains("password"));
    }
}
