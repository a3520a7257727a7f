//! Validation exemptions.
//!
//! The bundled PostgreSQL chart renders namespace values that are
//! all-numeric, which the upstream Kubernetes schema rejects. Objects it
//! emits are skipped. This is the only exemption.

use serde_json::{Map, Value};

/// Preferred chart label.
pub const HELM_CHART_LABEL: &str = "helm.sh/chart";

/// Legacy chart label, consulted only when [`HELM_CHART_LABEL`] is absent.
pub const LEGACY_CHART_LABEL: &str = "chart";

/// Substring of the chart label that marks an exempt object.
pub const EXEMPT_CHART: &str = "postgresql";

/// The chart label of an object.
///
/// `helm.sh/chart` wins whenever it is present, even if `chart` disagrees.
/// Non-string label values are treated as absent.
pub fn chart_label(labels: &Map<String, Value>) -> Option<&str> {
    match labels.get(HELM_CHART_LABEL) {
        Some(value) => value.as_str(),
        None => labels.get(LEGACY_CHART_LABEL).and_then(Value::as_str),
    }
}

/// Whether objects carrying `labels` skip schema validation.
pub fn is_exempt(labels: &Map<String, Value>) -> bool {
    chart_label(labels).is_some_and(|chart| chart.contains(EXEMPT_CHART))
}
