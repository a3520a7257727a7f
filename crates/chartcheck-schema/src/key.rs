//! Schema key normalization and cache path derivation.
//!
//! The derived path must match the layout of the standalone Kubernetes JSON
//! schema mirror so that a pre-populated local cache is reused as-is:
//!
//! ```text
//! v1.24.0-standalone/deployment-apps-v1.json          apps/v1 Deployment
//! v1.24.0-standalone/ingress-networking-v1.json       networking.k8s.io/v1 Ingress
//! v1.24.0-standalone/service-v1.json                  v1 Service
//! ```

use std::fmt;

/// Normalized `(apiVersion, kind, kubeVersion)` triple.
///
/// `kind` is lowercased. A grouped `apiVersion` (`group/version`) is split
/// into the first dot-segment of its group and its version; a core
/// `apiVersion` is kept whole. Equality compares the normalized parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    kind: String,
    group: Option<String>,
    version: String,
    kube_version: String,
}

impl SchemaKey {
    /// Normalize a caller-supplied triple.
    pub fn new(api_version: &str, kind: &str, kube_version: &str) -> Self {
        let api_version = api_version.to_lowercase();
        let kind = kind.to_lowercase();

        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => {
                let group = group.split('.').next().unwrap_or(group);
                (Some(group.to_string()), version.to_string())
            }
            None => (None, api_version),
        };

        Self {
            kind,
            group,
            version,
            kube_version: kube_version.to_string(),
        }
    }

    /// Lowercased kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// First dot-segment of the API group, `None` for the core group.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Bare API version (`v1`, `v1beta1`, ...).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Kubernetes version the schema belongs to.
    pub fn kube_version(&self) -> &str {
        &self.kube_version
    }

    /// Relative cache path, always `/`-separated.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.version_dir(), self.file_name())
    }

    /// `v{kubeVersion}-standalone`.
    pub fn version_dir(&self) -> String {
        format!("v{}-standalone", self.kube_version)
    }

    /// `{kind}-[{group}-]{version}.json`.
    pub fn file_name(&self) -> String {
        match &self.group {
            Some(group) => format!("{}-{}-{}.json", self.kind, group, self.version),
            None => format!("{}-{}.json", self.kind, self.version),
        }
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_path())
    }
}
