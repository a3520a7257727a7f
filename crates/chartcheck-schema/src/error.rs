//! Schema cache error types.

use std::fmt;

use thiserror::Error;

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating field in the object.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected it.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {} [{}]", self.message, self.schema_path)
        } else {
            write!(
                f,
                "{}: {} [{}]",
                self.instance_path, self.message, self.schema_path
            )
        }
    }
}

/// Errors raised while acquiring schemas or validating objects.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The remote schema source answered with a non-success status.
    #[error("fetching {url} failed with HTTP status {status}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request to the remote schema source could not be completed.
    #[error("fetching {url} failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport error message.
        reason: String,
    },

    /// Offline mode is on and the schema is not cached locally.
    #[error("offline mode: schema not cached at {path}")]
    OfflineCacheMiss {
        /// Expected local path.
        path: String,
    },

    /// The schema document is not valid JSON.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoad {
        /// Local path of the schema.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The schema document does not conform to the Draft-7 meta-schema.
    #[error("schema {path} is not a valid Draft-7 schema: {reason}")]
    SchemaInvalid {
        /// Local path of the schema.
        path: String,
        /// Meta-schema violation.
        reason: String,
    },

    /// The schema could not be compiled into a validator.
    #[error("failed to compile schema {path}: {reason}")]
    SchemaCompile {
        /// Local path of the schema.
        path: String,
        /// Compiler message.
        reason: String,
    },

    /// The object lacks a field needed to pick a schema.
    #[error("object is missing '{field}'; cannot select a schema")]
    MissingField {
        /// Field name (`apiVersion` or `kind`).
        field: &'static str,
    },

    /// The object does not conform to its schema.
    #[error("{kind} ({api_version}) failed validation for Kubernetes {kube_version} with {count} violation(s):\n{}", render_details(.details))]
    ValidationFailed {
        /// `apiVersion` of the object.
        api_version: String,
        /// `kind` of the object.
        kind: String,
        /// `metadata.name` of the object, when present.
        name: Option<String>,
        /// Target Kubernetes version.
        kube_version: String,
        /// Number of violations.
        count: usize,
        /// Every violation found.
        details: Vec<Violation>,
    },

    /// I/O error reading or writing the local cache.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_details(details: &[Violation]) -> String {
    details
        .iter()
        .map(|v| format!("  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_includes_path_and_keyword() {
        let v = Violation {
            instance_path: "/spec/replicas".to_string(),
            schema_path: "/properties/spec/properties/replicas/type".to_string(),
            message: r#""three" is not of types "integer", "null""#.to_string(),
        };
        let display = v.to_string();
        assert!(display.starts_with("/spec/replicas: "));
        assert!(display.contains("/properties/spec/properties/replicas/type"));
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""metadata" is a required property"#.to_string(),
        };
        assert!(v.to_string().starts_with("(root): "));
    }

    #[test]
    fn validation_failed_lists_every_violation() {
        let err = SchemaError::ValidationFailed {
            api_version: "v1".to_string(),
            kind: "Service".to_string(),
            name: Some("web".to_string()),
            kube_version: "1.24.0".to_string(),
            count: 2,
            details: vec![
                Violation {
                    instance_path: "/spec/ports/0/port".to_string(),
                    schema_path: "/a".to_string(),
                    message: "first".to_string(),
                },
                Violation {
                    instance_path: "/spec/type".to_string(),
                    schema_path: "/b".to_string(),
                    message: "second".to_string(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("Service (v1) failed validation for Kubernetes 1.24.0"));
        assert!(text.contains("/spec/ports/0/port: first"));
        assert!(text.contains("/spec/type: second"));
    }
}
