//! Error kinds returned by cluster operations
//!
//! Every operation returns `Result<String, CohesityError>`. Domain kinds
//! (not found, already exists, ...) carry the exact sentence shown to the
//! user; transport kinds are wrapped by [`report`] with the name of the
//! operation that failed.

use thiserror::Error;

/// Errors raised while talking to the cluster or resolving names
#[derive(Error, Debug)]
pub enum CohesityError {
    #[error("{kind} with name {name} not available")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} with name {name} already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("{count} jobs named {name} exist, refusing to act on an ambiguous match")]
    Ambiguous { name: String, count: usize },

    #[error("Job state {state} not supported. Please provide one of the following states {supported}")]
    UnsupportedState { state: String, supported: String },

    #[error("Minimum of one VM is required. Unable to find any of the VMs {vms} in the Vcenter {vcenter}")]
    NoSources { vcenter: String, vms: String },

    #[error("Job run details not available for job {0}")]
    NoRuns(String),

    #[error("No active job run available for job {0}")]
    NoActiveRun(String),

    #[error("No snapshot available for VM {0}")]
    NoSnapshot(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CohesityError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Whether the failure came from the transport or the remote API rather
    /// than from a name lookup or argument check
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::Api { .. } | Self::Http(_) | Self::Parse(_) | Self::Config(_)
        )
    }
}

impl From<reqwest::Error> for CohesityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CohesityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CohesityError>;

/// Collapse an operation result into the single line shown to the user.
///
/// `operation` reads as a verb phrase, e.g. `"cancel the job nightly"`.
pub fn report(operation: &str, result: Result<String>) -> String {
    match result {
        Ok(message) => message,
        Err(err) if err.is_transport() => {
            tracing::error!("Failed to {}: {}", operation, err);
            format!("Error while attempting to {}, error : {}", operation, err)
        }
        Err(err) => err.to_string(),
    }
}
