//! Harness configuration.
//!
//! Defaults match a chart repository that keeps its schema cache under
//! `tests/k8s_schema` and fetches missing schemas from the standalone
//! Kubernetes JSON schema mirror. Override via environment variables or
//! explicit construction for tests.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ConfigError;

/// Kubernetes version rendered and validated against when none is given.
pub const DEFAULT_KUBE_VERSION: &str = "1.24.0";

/// Release name passed to `helm template` when none is given.
pub const DEFAULT_RELEASE_NAME: &str = "release-name";

/// Namespace passed to `helm template` when none is given.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Remote root of the standalone Kubernetes JSON schemas.
pub const DEFAULT_SCHEMA_BASE_URL: &str =
    "https://raw.githubusercontent.com/yannh/kubernetes-json-schema/master";

/// Schema cache location relative to the repository root.
pub const SCHEMA_DIR_RELATIVE: &str = "tests/k8s_schema";

/// Where schemas live, where they come from, and how charts are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Root of the local schema cache.
    pub schema_dir: PathBuf,
    /// Base URL the derived schema path is appended to on a cache miss.
    pub schema_base_url: Url,
    /// Name or path of the helm binary.
    pub helm_bin: String,
    /// Chart rendered when a request does not name one.
    pub chart_dir: PathBuf,
    /// Kubernetes version used when a request does not name one.
    pub kube_version: String,
    /// Never fetch; a cache miss is an error.
    pub offline: bool,
    /// Schema fetch timeout. `None` keeps the HTTP client's default.
    pub fetch_timeout_secs: Option<u64>,
}

impl HarnessConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CHARTCHECK_SCHEMA_DIR` (default: `<repo root>/tests/k8s_schema`)
    /// - `CHARTCHECK_SCHEMA_BASE_URL` (default: [`DEFAULT_SCHEMA_BASE_URL`])
    /// - `CHARTCHECK_HELM_BIN` (default: `helm`)
    /// - `CHARTCHECK_CHART_DIR` (default: current directory)
    /// - `CHARTCHECK_KUBE_VERSION` (default: [`DEFAULT_KUBE_VERSION`])
    /// - `CHARTCHECK_OFFLINE` (default: `false`)
    /// - `CHARTCHECK_FETCH_TIMEOUT_SECS` (default: unset)
    ///
    /// The repository root is the nearest ancestor of the current directory
    /// containing `.git`, falling back to the current directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(&cwd, |var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// `cwd` anchors the repository-root search and the default chart
    /// directory.
    pub fn from_lookup<F>(cwd: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let repo_root = resolve_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf());

        let schema_dir = lookup("CHARTCHECK_SCHEMA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| repo_root.join(SCHEMA_DIR_RELATIVE));

        let raw_url = lookup("CHARTCHECK_SCHEMA_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SCHEMA_BASE_URL.to_string());
        let schema_base_url = parse_url("CHARTCHECK_SCHEMA_BASE_URL", &raw_url)?;

        let offline = match lookup("CHARTCHECK_OFFLINE") {
            Some(raw) => parse_bool("CHARTCHECK_OFFLINE", &raw)?,
            None => false,
        };

        let fetch_timeout_secs = match lookup("CHARTCHECK_FETCH_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidInteger {
                    var: "CHARTCHECK_FETCH_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            schema_dir,
            schema_base_url,
            helm_bin: lookup("CHARTCHECK_HELM_BIN").unwrap_or_else(|| "helm".to_string()),
            chart_dir: lookup("CHARTCHECK_CHART_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| cwd.to_path_buf()),
            kube_version: lookup("CHARTCHECK_KUBE_VERSION")
                .unwrap_or_else(|| DEFAULT_KUBE_VERSION.to_string()),
            offline,
            fetch_timeout_secs,
        })
    }

    /// Configuration rooted at explicit directories, with every other field
    /// at its default. Intended for tests and embedding.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the default base URL cannot be
    /// parsed.
    pub fn rooted_at(
        schema_dir: impl Into<PathBuf>,
        chart_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            schema_dir: schema_dir.into(),
            schema_base_url: parse_url("schema_base_url", DEFAULT_SCHEMA_BASE_URL)?,
            helm_bin: "helm".to_string(),
            chart_dir: chart_dir.into(),
            kube_version: DEFAULT_KUBE_VERSION.to_string(),
            offline: false,
            fetch_timeout_secs: None,
        })
    }
}

/// Walk up from `start` to the nearest directory containing `.git`.
pub fn resolve_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}
