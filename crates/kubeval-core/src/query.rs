//! Resource query port
//!
//! The evaluator observes the cluster only through [`ResourceQuery`]. Any
//! mechanism that lists named, namespaced resources of a kind can sit
//! behind it: a kubectl subprocess, the API server, or a test double.

use crate::error::QueryError;
use crate::types::ObservedResource;
use async_trait::async_trait;

/// Lists resources of a kind, optionally scoped to a namespace
///
/// Implementations must return in bounded time. `namespace = None` means
/// all namespaces, and every returned resource carries its own namespace.
/// No ordering is guaranteed.
#[async_trait]
pub trait ResourceQuery: Send + Sync {
    async fn get_resources(
        &self,
        kind: &str,
        namespace: Option<&str>,
    ) -> Result<Vec<ObservedResource>, QueryError>;
}
