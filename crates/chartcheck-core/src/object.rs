//! # Rendered Objects
//!
//! A [`RenderedObject`] is a single manifest document produced by the
//! templating engine: a JSON mapping that carries at least `kind` and
//! `metadata.name`. It is transient; nothing here persists it.
//!
//! Accessors return `Option` for fields that may legitimately be absent and
//! [`ObjectError`] where the caller needs the field to exist.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ObjectError;

/// One manifest emitted by a chart render.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedObject(Map<String, Value>);

impl RenderedObject {
    /// Wrap an existing JSON mapping.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the `apiVersion` field, if present and a string.
    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    /// Returns the `kind` field, if present and a string.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    /// Returns `metadata.name`, if present and a string.
    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    /// Returns `metadata.namespace`, if present and a string.
    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    /// Returns `metadata.labels`, or `None` when absent or not a mapping.
    pub fn labels(&self) -> Option<&Map<String, Value>> {
        self.0
            .get("metadata")
            .and_then(|m| m.get("labels"))
            .and_then(Value::as_object)
    }

    /// Returns `kind`, or [`ObjectError::MissingField`].
    pub fn require_kind(&self) -> Result<&str, ObjectError> {
        self.kind().ok_or_else(|| ObjectError::MissingField {
            field: "kind".to_string(),
        })
    }

    /// Returns `metadata.name`, or [`ObjectError::MissingField`].
    pub fn require_name(&self) -> Result<&str, ObjectError> {
        self.name().ok_or_else(|| ObjectError::MissingField {
            field: "metadata.name".to_string(),
        })
    }

    /// Walk a dotted path such as `spec.template.spec.containers.0.image`.
    ///
    /// Segments address mapping keys; a segment that parses as an integer
    /// also indexes into arrays. Returns `None` as soon as a segment does not
    /// resolve. An empty path returns `None`.
    pub fn search(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next().filter(|s| !s.is_empty())?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Borrow the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into a `serde_json::Value::Object`.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Clone into a `serde_json::Value::Object`.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    fn metadata_str(&self, field: &str) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }
}

impl TryFrom<Value> for RenderedObject {
    type Error = ObjectError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ObjectError::NotAMapping {
                found: json_type_name(&other),
            }),
        }
    }
}

impl From<RenderedObject> for Value {
    fn from(obj: RenderedObject) -> Self {
        obj.into_value()
    }
}

impl AsRef<Map<String, Value>> for RenderedObject {
    fn as_ref(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// JSON type name used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deployment() -> RenderedObject {
        RenderedObject::try_from(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": "release-name-web",
                "namespace": "default",
                "labels": {"helm.sh/chart": "web-1.0.0", "tier": "frontend"}
            },
            "spec": {
                "template": {
                    "spec": {
                        "containers": [
                            {"name": "web", "image": "nginx:1.25"}
                        ]
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn accessors_read_identity_fields() {
        let obj = deployment();
        assert_eq!(obj.api_version(), Some("apps/v1"));
        assert_eq!(obj.kind(), Some("Deployment"));
        assert_eq!(obj.name(), Some("release-name-web"));
        assert_eq!(obj.namespace(), Some("default"));
        assert_eq!(obj.labels().unwrap()["tier"], "frontend");
    }

    #[test]
    fn search_walks_maps_and_arrays() {
        let obj = deployment();
        assert_eq!(
            obj.search("spec.template.spec.containers.0.image"),
            Some(&json!("nginx:1.25"))
        );
        assert!(obj.search("spec.template.spec.containers.1").is_none());
        assert!(obj.search("spec.replicas").is_none());
        assert!(obj.search("").is_none());
    }

    #[test]
    fn search_does_not_index_into_scalars() {
        let obj = deployment();
        assert!(obj.search("kind.0").is_none());
    }

    #[test]
    fn missing_labels_is_none() {
        let obj = RenderedObject::try_from(json!({"kind": "Service", "metadata": {"name": "x"}}))
            .unwrap();
        assert!(obj.labels().is_none());
    }

    #[test]
    fn require_name_reports_dotted_field() {
        let obj = RenderedObject::try_from(json!({"kind": "Service"})).unwrap();
        let err = obj.require_name().unwrap_err();
        assert_eq!(
            err,
            ObjectError::MissingField {
                field: "metadata.name".to_string()
            }
        );
    }

    #[test]
    fn non_mapping_is_rejected() {
        let err = RenderedObject::try_from(json!(["a", "b"])).unwrap_err();
        assert_eq!(err, ObjectError::NotAMapping { found: "array" });
    }

    #[test]
    fn serializes_transparently() {
        let obj = deployment();
        let text = serde_json::to_string(&obj).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, obj.to_value());
    }
}
