//! kubeval-cluster: cluster query adapters for kubeval
//!
//! Two implementations of [`kubeval_core::ResourceQuery`]:
//! - [`KubectlClient`] shells out to `kubectl`
//! - [`ApiClient`] talks to the API server directly

pub mod api;
pub mod error;
pub mod kubectl;

pub use api::ApiClient;
pub use error::{ApiError, KubectlError};
pub use kubectl::KubectlClient;
