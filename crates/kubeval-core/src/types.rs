//! Domain types for kubeval
//!
//! These types represent check definitions, the resources observed in a
//! cluster, and the outcome of evaluating one against the other.

use crate::error::DefinitionError;
use crate::matcher::NameMatcher;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a check compares observed resource names against its pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Contains,
    Regex,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Contains => "contains",
            MatchType::Regex => "regex",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatchType::Exact),
            "contains" => Ok(MatchType::Contains),
            "regex" => Ok(MatchType::Regex),
            other => Err(DefinitionError::UnsupportedMatchType(other.to_string())),
        }
    }
}

/// Unvalidated check record as it appears in catalog files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    pub id: String,
    pub title: String,
    pub resource: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default = "default_match_type")]
    pub match_type: String,
    pub match_value: String,
    #[serde(default = "default_min_count")]
    pub min_count: i64,
}

fn default_match_type() -> String {
    MatchType::Contains.as_str().to_string()
}

fn default_min_count() -> i64 {
    1
}

/// Validated, immutable rule describing what must exist in the cluster
#[derive(Debug, Clone)]
pub struct CheckDefinition {
    check_id: String,
    title: String,
    resource: String,
    namespace: Option<String>,
    match_type: MatchType,
    match_value: String,
    min_count: usize,
    matcher: NameMatcher,
}

impl CheckDefinition {
    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Namespace scope, `None` meaning all namespaces
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn match_value(&self) -> &str {
        &self.match_value
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Whether an observed name satisfies this check's rule
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// Namespace scope as shown to users
    pub fn scope_label(&self) -> &str {
        self.namespace().unwrap_or("all namespaces")
    }

    /// Convert back into the catalog record form
    pub fn to_spec(&self) -> CheckSpec {
        CheckSpec {
            id: self.check_id.clone(),
            title: self.title.clone(),
            resource: self.resource.clone(),
            namespace: self.namespace.clone(),
            match_type: self.match_type.as_str().to_string(),
            match_value: self.match_value.clone(),
            min_count: self.min_count as i64,
        }
    }
}

impl TryFrom<CheckSpec> for CheckDefinition {
    type Error = DefinitionError;

    fn try_from(spec: CheckSpec) -> Result<Self, Self::Error> {
        if spec.id.trim().is_empty() {
            return Err(DefinitionError::EmptyField("id"));
        }
        if spec.resource.trim().is_empty() {
            return Err(DefinitionError::EmptyField("resource"));
        }

        let match_type: MatchType = spec.match_type.parse()?;
        if spec.min_count < 1 {
            return Err(DefinitionError::InvalidMinCount(spec.min_count));
        }
        let matcher = NameMatcher::new(match_type, &spec.match_value)?;

        // An empty namespace string means the same as an absent one
        let namespace = spec.namespace.filter(|ns| !ns.is_empty());

        Ok(Self {
            check_id: spec.id,
            title: spec.title,
            resource: spec.resource,
            namespace,
            match_type,
            match_value: spec.match_value,
            min_count: spec.min_count as usize,
            matcher,
        })
    }
}

/// Resource instance reported by a query adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedResource {
    pub name: String,
    pub namespace: String,
}

impl ObservedResource {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Display for ObservedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of evaluating one check definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub title: String,
    pub status: CheckStatus,
    pub details: String,
    /// Id of the check that stood in for this one, when the coverage
    /// policy promoted it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_by: Option<String>,
}

impl CheckResult {
    pub fn new(check: &CheckDefinition, status: CheckStatus, details: impl Into<String>) -> Self {
        Self {
            check_id: check.check_id().to_string(),
            title: check.title().to_string(),
            status,
            details: details.into(),
            covered_by: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    /// PASS on its own evaluation, not through the coverage policy
    pub fn is_present(&self) -> bool {
        self.is_pass() && self.covered_by.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(match_type: &str, match_value: &str) -> CheckSpec {
        CheckSpec {
            id: "coredns".to_string(),
            title: "CoreDNS".to_string(),
            resource: "deployment".to_string(),
            namespace: Some("kube-system".to_string()),
            match_type: match_type.to_string(),
            match_value: match_value.to_string(),
            min_count: 1,
        }
    }

    #[test]
    fn test_definition_from_valid_spec() {
        let def = CheckDefinition::try_from(spec("exact", "coredns")).unwrap();
        assert_eq!(def.check_id(), "coredns");
        assert_eq!(def.match_type(), MatchType::Exact);
        assert_eq!(def.namespace(), Some("kube-system"));
        assert_eq!(def.min_count(), 1);
        assert!(def.matches("coredns"));
        assert!(!def.matches("coredns-autoscaler"));
    }

    #[test]
    fn test_unknown_match_type_rejected() {
        let err = CheckDefinition::try_from(spec("glob", "core*")).unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedMatchType(ref t) if t == "glob"));
    }

    #[test]
    fn test_zero_min_count_rejected() {
        let mut raw = spec("contains", "coredns");
        raw.min_count = 0;
        let err = CheckDefinition::try_from(raw).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidMinCount(0)));
    }

    #[test]
    fn test_malformed_regex_rejected_at_construction() {
        let err = CheckDefinition::try_from(spec("regex", "core(dns")).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_namespace_means_all_namespaces() {
        let mut raw = spec("contains", "coredns");
        raw.namespace = Some(String::new());
        let def = CheckDefinition::try_from(raw).unwrap();
        assert_eq!(def.namespace(), None);
        assert_eq!(def.scope_label(), "all namespaces");
    }

    #[test]
    fn test_spec_defaults_from_json() {
        let raw: CheckSpec = serde_json::from_str(
            r#"{"id": "x", "title": "X", "resource": "deployment", "match_value": "x"}"#,
        )
        .unwrap();
        assert_eq!(raw.match_type, "contains");
        assert_eq!(raw.min_count, 1);
        assert_eq!(raw.namespace, None);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&CheckStatus::Error).unwrap();
        assert_eq!(json, "\"ERROR\"");
        assert_eq!(CheckStatus::Pass.to_string(), "PASS");
    }

    #[test]
    fn test_observed_resource_display() {
        let res = ObservedResource::new("metrics-server", "kube-system");
        assert_eq!(res.to_string(), "kube-system/metrics-server");
    }
}
