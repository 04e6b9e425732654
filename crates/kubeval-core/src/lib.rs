//! kubeval-core: Check evaluation engine for kubeval
//!
//! Evaluates declarative resource presence checks against a cluster seen
//! through the [`ResourceQuery`] port, reconciles interchangeable checks
//! with a [`CoveragePolicy`], and tallies the outcome in a [`Summary`].

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod policy;
pub mod query;
pub mod summary;
pub mod types;

pub use catalog::{CustomCatalog, FileFormat, builtin_checks, ensure_unique_ids, load_custom_checks};
pub use error::{CatalogError, DefinitionError, QueryError};
pub use evaluator::{evaluate, evaluate_all, evaluate_concurrent};
pub use matcher::{NameMatcher, matches, matches_str};
pub use policy::{CoveragePolicy, EquivalenceGroup};
pub use query::ResourceQuery;
pub use summary::Summary;
pub use types::{CheckDefinition, CheckResult, CheckSpec, CheckStatus, MatchType, ObservedResource};
