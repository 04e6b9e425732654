//! Error types for kubeval-cluster

use kubeval_core::QueryError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when running kubectl
#[derive(Error, Debug)]
pub enum KubectlError {
    /// Binary missing from PATH
    #[error("kubectl is not installed or not in PATH")]
    NotInstalled,

    /// Binary present but `kubectl version --client` failed
    #[error("kubectl is not usable: {0}")]
    Unusable(String),

    /// IO error spawning or reading the process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Process exceeded the per-query timeout
    #[error("Command timed out: {0}")]
    Timeout(String),

    /// Non-zero exit; carries stderr (or stdout) as reported by kubectl
    #[error("{0}")]
    CommandFailed(String),

    /// Output was not the JSON list we asked for
    #[error("kubectl returned non-JSON output")]
    InvalidOutput,
}

/// Errors that can occur when talking to the API server
#[derive(Error, Debug)]
pub enum ApiError {
    /// Kubeconfig could not be loaded or inferred
    #[error("Failed to load kubeconfig: {0}")]
    Config(String),

    /// Client could not be built from the config
    #[error("Failed to create K8s client: {0}")]
    ClientCreate(String),

    /// Request rejected or failed in transport
    #[error("K8s API error: {0}")]
    Api(String),

    /// Kind not served by the cluster
    #[error("resource type \"{0}\" not found in cluster discovery")]
    UnknownKind(String),

    /// Request exceeded the per-query timeout
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<KubectlError> for QueryError {
    fn from(err: KubectlError) -> Self {
        QueryError::new(err.to_string())
    }
}

impl From<ApiError> for QueryError {
    fn from(err: ApiError) -> Self {
        QueryError::new(err.to_string())
    }
}
