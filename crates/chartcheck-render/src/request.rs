//! Render requests.

use std::path::PathBuf;

use chartcheck_core::config::{DEFAULT_NAMESPACE, DEFAULT_RELEASE_NAME};
use serde_json::{Map, Value};

/// Templates to restrict output to (`--show-only`), in order.
///
/// A single path converts into a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowOnly(Vec<String>);

impl ShowOnly {
    /// The template paths.
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    /// No restriction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ShowOnly {
    fn from(path: &str) -> Self {
        Self(vec![path.to_string()])
    }
}

impl From<String> for ShowOnly {
    fn from(path: String) -> Self {
        Self(vec![path])
    }
}

impl From<Vec<String>> for ShowOnly {
    fn from(paths: Vec<String>) -> Self {
        Self(paths)
    }
}

impl From<Vec<&str>> for ShowOnly {
    fn from(paths: Vec<&str>) -> Self {
        Self(paths.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ShowOnly {
    fn from(paths: [&str; N]) -> Self {
        Self(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// One `helm template` invocation.
///
/// Unset fields fall back to the defaults below; `chart_dir` and
/// `kube_version` fall back to the renderer's configuration.
///
/// | field          | default                       |
/// |----------------|-------------------------------|
/// | `name`         | `release-name`                |
/// | `values`       | `{}`                          |
/// | `show_only`    | none                          |
/// | `chart_dir`    | configured chart directory    |
/// | `kube_version` | configured version (`1.24.0`) |
/// | `namespace`    | `default`                     |
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Release name.
    pub name: String,
    /// Value overlay written to the `--values` file.
    pub values: Value,
    /// Templates to restrict output to.
    pub show_only: ShowOnly,
    /// Chart to render.
    pub chart_dir: Option<PathBuf>,
    /// Target Kubernetes version for rendering and validation.
    pub kube_version: Option<String>,
    /// Release namespace.
    pub namespace: String,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            name: DEFAULT_RELEASE_NAME.to_string(),
            values: Value::Object(Map::new()),
            show_only: ShowOnly::default(),
            chart_dir: None,
            kube_version: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl RenderRequest {
    /// A request with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the release name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the value overlay.
    pub fn values(mut self, values: Value) -> Self {
        self.values = values;
        self
    }

    /// Restrict output to one or more templates.
    pub fn show_only(mut self, show_only: impl Into<ShowOnly>) -> Self {
        self.show_only = show_only.into();
        self
    }

    /// Render a specific chart directory.
    pub fn chart_dir(mut self, chart_dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(chart_dir.into());
        self
    }

    /// Render and validate for a specific Kubernetes version.
    pub fn kube_version(mut self, kube_version: impl Into<String>) -> Self {
        self.kube_version = Some(kube_version.into());
        self
    }

    /// Set the release namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Kubernetes version to use, given the renderer's default.
    pub fn effective_kube_version<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.kube_version.as_deref().unwrap_or(fallback)
    }
}
