//! Kubernetes API client adapter
//!
//! Lists resources through the API server instead of a kubectl binary.
//! Resource kinds are resolved through API discovery, which runs once per
//! client; the resources themselves are listed fresh on every query.

use crate::error::ApiError;
use async_trait::async_trait;
use kube::{
    Client, Config,
    api::{Api, DynamicObject, ListParams},
    config::KubeConfigOptions,
    discovery::{ApiResource, Discovery},
};
use kubeval_core::{ObservedResource, QueryError, ResourceQuery};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// kubectl short names for built-in resource types
///
/// Discovery does not report short names, so the common ones are mapped
/// to their plurals here.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("cm", "configmaps"),
    ("cj", "cronjobs"),
    ("crd", "customresourcedefinitions"),
    ("deploy", "deployments"),
    ("ds", "daemonsets"),
    ("ep", "endpoints"),
    ("hpa", "horizontalpodautoscalers"),
    ("ing", "ingresses"),
    ("netpol", "networkpolicies"),
    ("no", "nodes"),
    ("ns", "namespaces"),
    ("pdb", "poddisruptionbudgets"),
    ("po", "pods"),
    ("pv", "persistentvolumes"),
    ("pvc", "persistentvolumeclaims"),
    ("rs", "replicasets"),
    ("sa", "serviceaccounts"),
    ("sc", "storageclasses"),
    ("sts", "statefulsets"),
    ("svc", "services"),
];

/// Whether `query` names `resource` by kind, plural, or kubectl short name
///
/// Accepts an optional group suffix, as kubectl does: `deployments.apps`.
fn matches_kind(resource: &ApiResource, query: &str) -> bool {
    let query = query.to_ascii_lowercase();
    let (name, group) = match query.split_once('.') {
        Some((name, group)) => (name.to_string(), Some(group.to_string())),
        None => (query, None),
    };
    let name = match SHORT_NAMES.iter().find(|(short, _)| *short == name) {
        Some((_, plural)) => plural.to_string(),
        None => name,
    };

    if group.is_some_and(|g| !resource.group.eq_ignore_ascii_case(&g)) {
        return false;
    }

    resource.kind.eq_ignore_ascii_case(&name) || resource.plural.eq_ignore_ascii_case(&name)
}

/// Query adapter backed by the Kubernetes API
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    timeout: Duration,
    resources: OnceCell<Vec<ApiResource>>,
}

impl ApiClient {
    /// Connect using the default kubeconfig, or a named context in it
    pub async fn connect(context: Option<&str>) -> Result<Self, ApiError> {
        // The kube client needs a process-wide rustls provider; a second
        // install is harmless.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let config = match context {
            Some(ctx) => {
                let options = KubeConfigOptions {
                    context: Some(ctx.to_string()),
                    ..Default::default()
                };
                Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| ApiError::Config(e.to_string()))?
            }
            None => Config::infer()
                .await
                .map_err(|e| ApiError::Config(e.to_string()))?,
        };

        tracing::info!("Connecting to API server at {}", config.cluster_url);
        let client = Client::try_from(config).map_err(|e| ApiError::ClientCreate(e.to_string()))?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            resources: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Every listable resource type the server advertises
    async fn discovered(&self) -> Result<&[ApiResource], ApiError> {
        let resources = self
            .resources
            .get_or_try_init(|| async {
                let discovery = tokio::time::timeout(
                    self.timeout,
                    Discovery::new(self.client.clone()).run(),
                )
                .await
                .map_err(|_| ApiError::Timeout(self.timeout))?
                .map_err(|e| ApiError::Api(e.to_string()))?;

                let resources: Vec<ApiResource> = discovery
                    .groups()
                    .flat_map(|group| group.recommended_resources())
                    .filter(|(_, caps)| caps.supports_operation(kube::discovery::verbs::LIST))
                    .map(|(ar, _)| ar)
                    .collect();
                tracing::debug!("Discovered {} resource types", resources.len());
                Ok::<_, ApiError>(resources)
            })
            .await?;
        Ok(resources.as_slice())
    }

    async fn resolve(&self, kind: &str) -> Result<ApiResource, ApiError> {
        self.discovered()
            .await?
            .iter()
            .find(|ar| matches_kind(ar, kind))
            .cloned()
            .ok_or_else(|| ApiError::UnknownKind(kind.to_string()))
    }

    /// List resources of `kind`, cluster-wide or in one namespace
    pub async fn list(
        &self,
        kind: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<ObservedResource>, ApiError> {
        let ar = self.resolve(kind).await?;
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        };

        let list = tokio::time::timeout(self.timeout, api.list(&ListParams::default()))
            .await
            .map_err(|_| ApiError::Timeout(self.timeout))?
            .map_err(|e| ApiError::Api(e.to_string()))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|obj| {
                let name = obj.metadata.name.filter(|n| !n.is_empty())?;
                let namespace = obj
                    .metadata
                    .namespace
                    .unwrap_or_else(|| namespace.unwrap_or("default").to_string());
                Some(ObservedResource { name, namespace })
            })
            .collect())
    }
}

#[async_trait]
impl ResourceQuery for ApiClient {
    async fn get_resources(
        &self,
        kind: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<ObservedResource>, QueryError> {
        Ok(self.list(kind, namespace).await?)
    }
}
