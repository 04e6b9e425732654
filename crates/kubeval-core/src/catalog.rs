//! Check catalogs
//!
//! Built-in definitions are compiled into the binary. Users may add their
//! own checks, and extra equivalence groups, through a JSON or YAML file:
//!
//! ```json
//! {
//!   "checks": [
//!     {"id": "cilium", "title": "Cilium", "resource": "daemonset",
//!      "namespace": "kube-system", "match_type": "exact", "match_value": "cilium"}
//!   ],
//!   "equivalence_groups": [{"primary": "vpc-cni", "alternative": "cilium"}]
//! }
//! ```

use crate::error::{CatalogError, DefinitionError};
use crate::policy::EquivalenceGroup;
use crate::types::{CheckDefinition, CheckSpec};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Built-in check definitions, in evaluation order
const BUILTIN_CHECKS: &[(&str, &str)] = &[
    ("metrics-server", include_str!("../checks/metrics-server/check.json")),
    ("cluster-autoscaler", include_str!("../checks/cluster-autoscaler/check.json")),
    ("karpenter", include_str!("../checks/karpenter/check.json")),
    (
        "ebs-csi-driver-controller",
        include_str!("../checks/ebs-csi-driver-controller/check.json"),
    ),
    ("ebs-csi-driver-node", include_str!("../checks/ebs-csi-driver-node/check.json")),
    ("vpc-cni", include_str!("../checks/vpc-cni/check.json")),
    ("coredns", include_str!("../checks/coredns/check.json")),
    ("kube-proxy", include_str!("../checks/kube-proxy/check.json")),
];

/// Format of a user-supplied checks file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Pick a format from the file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                FileFormat::Yaml
            }
            _ => FileFormat::Json,
        }
    }
}

/// Checks and equivalence groups read from a user file
#[derive(Debug, Clone, Default)]
pub struct CustomCatalog {
    pub checks: Vec<CheckDefinition>,
    pub groups: Vec<EquivalenceGroup>,
}

/// On-disk shape; checks stay untyped so errors can name the record index
#[derive(Debug, Deserialize)]
struct CheckFile {
    #[serde(default)]
    checks: Vec<serde_json::Value>,
    #[serde(default)]
    equivalence_groups: Vec<EquivalenceGroup>,
}

/// Load the built-in catalog
pub fn builtin_checks() -> Result<Vec<CheckDefinition>, CatalogError> {
    BUILTIN_CHECKS
        .iter()
        .map(|&(name, raw)| {
            serde_json::from_str::<CheckSpec>(raw)
                .map_err(|e| DefinitionError::Malformed(e.to_string()))
                .and_then(CheckDefinition::try_from)
                .map_err(|source| CatalogError::InvalidBuiltin { name, source })
        })
        .collect()
}

/// Read and validate a user checks file
pub fn load_custom_checks(path: &Path) -> Result<CustomCatalog, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_custom_checks(&contents, FileFormat::from_path(path))?;
    tracing::info!(
        "Loaded {} custom check(s) and {} equivalence group(s) from {}",
        catalog.checks.len(),
        catalog.groups.len(),
        path.display()
    );
    Ok(catalog)
}

/// Validate the contents of a user checks file
pub fn parse_custom_checks(contents: &str, format: FileFormat) -> Result<CustomCatalog, CatalogError> {
    let file: CheckFile = match format {
        FileFormat::Json => serde_json::from_str(contents)?,
        FileFormat::Yaml => serde_yaml::from_str(contents)?,
    };

    let checks = file
        .checks
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            serde_json::from_value::<CheckSpec>(raw)
                .map_err(|e| DefinitionError::Malformed(e.to_string()))
                .and_then(CheckDefinition::try_from)
                .map_err(|source| CatalogError::InvalidCustom {
                    index: idx + 1,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (idx, group) in file.equivalence_groups.iter().enumerate() {
        let reason = if group.primary.is_empty() || group.alternative.is_empty() {
            Some("ids must not be empty")
        } else if group.primary == group.alternative {
            Some("a check cannot be its own alternative")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(CatalogError::InvalidGroup {
                index: idx + 1,
                reason: reason.to_string(),
            });
        }
    }

    Ok(CustomCatalog {
        checks,
        groups: file.equivalence_groups,
    })
}

/// Reject a merged check list in which two definitions share an id
pub fn ensure_unique_ids(checks: &[CheckDefinition]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for check in checks {
        if !seen.insert(check.check_id()) {
            return Err(CatalogError::DuplicateId(check.check_id().to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchType;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_order() {
        let checks = builtin_checks().unwrap();
        let ids: Vec<_> = checks.iter().map(|c| c.check_id()).collect();
        assert_eq!(
            ids,
            vec![
                "metrics-server",
                "cluster-autoscaler",
                "karpenter",
                "ebs-csi-driver-controller",
                "ebs-csi-driver-node",
                "vpc-cni",
                "coredns",
                "kube-proxy",
            ]
        );
        ensure_unique_ids(&checks).unwrap();
    }

    #[test]
    fn test_builtin_names_match_ids() {
        for ((name, _), check) in BUILTIN_CHECKS.iter().zip(builtin_checks().unwrap()) {
            assert_eq!(*name, check.check_id());
        }
    }

    #[test]
    fn test_autoscalers_search_all_namespaces() {
        let checks = builtin_checks().unwrap();
        for id in ["cluster-autoscaler", "karpenter"] {
            let check = checks.iter().find(|c| c.check_id() == id).unwrap();
            assert_eq!(check.namespace(), None);
        }
    }

    #[test]
    fn test_parse_custom_json_with_defaults() {
        let json = r#"{
            "checks": [
                {"id": "cert-manager", "title": "cert-manager", "resource": "deployment",
                 "match_value": "cert-manager"},
                {"id": "cilium", "title": "Cilium", "resource": "daemonset",
                 "namespace": "kube-system", "match_type": "regex", "match_value": "^cilium$",
                 "min_count": 1}
            ],
            "equivalence_groups": [{"primary": "vpc-cni", "alternative": "cilium"}]
        }"#;

        let catalog = parse_custom_checks(json, FileFormat::Json).unwrap();
        assert_eq!(catalog.checks.len(), 2);
        assert_eq!(catalog.checks[0].match_type(), MatchType::Contains);
        assert_eq!(catalog.checks[0].min_count(), 1);
        assert_eq!(catalog.checks[1].match_type(), MatchType::Regex);
        assert_eq!(catalog.groups, vec![EquivalenceGroup::new("vpc-cni", "cilium")]);
    }

    #[test]
    fn test_parse_custom_yaml() {
        let yaml = r#"
checks:
  - id: external-dns
    title: ExternalDNS
    resource: deployment
    match_type: exact
    match_value: external-dns
"#;
        let catalog = parse_custom_checks(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(catalog.checks[0].check_id(), "external-dns");
        assert!(catalog.groups.is_empty());
    }

    #[test]
    fn test_missing_checks_key_is_empty_catalog() {
        let catalog = parse_custom_checks("{}", FileFormat::Json).unwrap();
        assert!(catalog.checks.is_empty());
    }

    #[test]
    fn test_unsupported_match_type_names_index() {
        let json = r#"{"checks": [
            {"id": "a", "title": "A", "resource": "deployment", "match_value": "a"},
            {"id": "b", "title": "B", "resource": "deployment", "match_type": "glob", "match_value": "b*"}
        ]}"#;
        let err = parse_custom_checks(json, FileFormat::Json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid custom check #2: unsupported match_type 'glob'"
        );
    }

    #[test]
    fn test_missing_key_names_index() {
        let json = r#"{"checks": [{"id": "a", "title": "A", "resource": "deployment"}]}"#;
        let err = parse_custom_checks(json, FileFormat::Json).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid custom check #1: "), "{msg}");
        assert!(msg.contains("match_value"), "{msg}");
    }

    #[test]
    fn test_invalid_group_rejected() {
        let json = r#"{"equivalence_groups": [{"primary": "a", "alternative": "a"}]}"#;
        let err = parse_custom_checks(json, FileFormat::Json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidGroup { index: 1, .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut checks = builtin_checks().unwrap();
        let json = r#"{"checks": [{"id": "coredns", "title": "Again", "resource": "deployment", "match_value": "x"}]}"#;
        checks.extend(parse_custom_checks(json, FileFormat::Json).unwrap().checks);
        let err = ensure_unique_ids(&checks).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate check id 'coredns'");
    }

    #[test]
    fn test_load_custom_checks_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "checks:\n  - id: x\n    title: X\n    resource: statefulset\n    match_value: x"
        )
        .unwrap();

        let catalog = load_custom_checks(file.path()).unwrap();
        assert_eq!(catalog.checks[0].resource(), "statefulset");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_custom_checks(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("c.yaml")), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("c.YML")), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("c.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("checks")), FileFormat::Json);
    }
}
