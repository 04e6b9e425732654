//! kubectl command execution
//!
//! Lists resources by shelling out to `kubectl get <kind> -o json`. Every
//! query spawns its own process, so concurrent queries share no handles.

use crate::error::KubectlError;
use async_trait::async_trait;
use kubeval_core::{ObservedResource, QueryError, ResourceQuery};
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default per-command timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Run a command and return stdout, bounded by `timeout`
async fn run_command(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<String, KubectlError> {
    let command_line = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("Running: {}", command_line);

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => KubectlError::NotInstalled,
            _ => KubectlError::Io(e),
        })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| KubectlError::Timeout(command_line.clone()))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("unknown kubectl error");
        return Err(KubectlError::CommandFailed(message.to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// `kubectl get -o json` list document; only the fields we read
#[derive(Debug, Default, Deserialize)]
struct ResourceList {
    #[serde(default)]
    items: Vec<ResourceItem>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceItem {
    #[serde(default)]
    metadata: ItemMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ItemMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

/// Parse `kubectl get -o json` output into observed resources
///
/// Items without a name are skipped. Items without a namespace fall back to
/// the requested namespace, or "default" for all-namespace queries.
fn parse_resource_list(
    json: &str,
    requested_namespace: Option<&str>,
) -> Result<Vec<ObservedResource>, KubectlError> {
    let json = json.trim();
    let list: ResourceList = if json.is_empty() {
        ResourceList::default()
    } else {
        serde_json::from_str(json).map_err(|_| KubectlError::InvalidOutput)?
    };

    Ok(list
        .items
        .into_iter()
        .filter_map(|item| {
            let name = item.metadata.name.filter(|n| !n.is_empty())?;
            let namespace = item
                .metadata
                .namespace
                .unwrap_or_else(|| requested_namespace.unwrap_or("default").to_string());
            Some(ObservedResource { name, namespace })
        })
        .collect())
}

/// Read `clientVersion.gitVersion` from `kubectl version --client -o json`
fn parse_client_version(json: &str) -> String {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| {
            v.get("clientVersion")
                .and_then(|c| c.get("gitVersion"))
                .and_then(|g| g.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Query adapter backed by the kubectl binary
#[derive(Debug, Clone)]
pub struct KubectlClient {
    binary: String,
    context: Option<String>,
    timeout: Duration,
}

impl Default for KubectlClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl KubectlClient {
    pub fn new(context: Option<String>) -> Self {
        Self {
            binary: "kubectl".to_string(),
            context,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different kubectl executable (path or name on PATH)
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Check that kubectl runs; returns the client version
    ///
    /// Executes: kubectl version --client -o json
    pub async fn validate(&self) -> Result<String, KubectlError> {
        let args: Vec<String> = ["version", "--client", "-o", "json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let stdout = run_command(&self.binary, &args, self.timeout)
            .await
            .map_err(|e| match e {
                KubectlError::NotInstalled => e,
                other => KubectlError::Unusable(other.to_string()),
            })?;

        let version = parse_client_version(&stdout);
        tracing::info!("Using kubectl {}", version);
        Ok(version)
    }

    /// Arguments for listing `kind` in `namespace` (or all namespaces)
    fn get_args(&self, kind: &str, namespace: Option<&str>) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args.push("get".to_string());
        args.push(kind.to_string());
        match namespace {
            Some(ns) => {
                args.push("-n".to_string());
                args.push(ns.to_string());
            }
            None => args.push("-A".to_string()),
        }
        args.push("-o".to_string());
        args.push("json".to_string());
        args
    }

    /// List resources of `kind`
    ///
    /// Executes: kubectl [--context C] get <kind> (-n <ns> | -A) -o json
    pub async fn list(
        &self,
        kind: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<ObservedResource>, KubectlError> {
        let args = self.get_args(kind, namespace);
        let stdout = run_command(&self.binary, &args, self.timeout).await?;
        parse_resource_list(&stdout, namespace)
    }
}

#[async_trait]
impl ResourceQuery for KubectlClient {
    async fn get_resources(
        &self,
        kind: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<ObservedResource>, QueryError> {
        Ok(self.list(kind, namespace).await?)
    }
}
