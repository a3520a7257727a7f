//! Multi-document manifest parsing.

use chartcheck_core::RenderedObject;
use serde_json::Value;

use crate::error::RenderError;
use crate::yaml11::{load_documents, LoadError};

/// Parse a `---`-separated YAML stream into rendered objects.
///
/// Scalars resolve under YAML 1.1 rules (see [`crate::yaml11`]), so an
/// unquoted `0440` is the integer 288 and `yes` is `true`.
///
/// Documents that are null or empty (`~`, `{}`, `[]`, `""`, or a stream
/// section holding only comments) are dropped; templates disabled by a
/// value produce these. Every remaining document must be a mapping.
///
/// # Errors
///
/// - [`RenderError::Parse`] if a document is not valid YAML, or holds
///   something JSON cannot represent (such as a mapping used as a key).
/// - [`RenderError::NotAnObject`] if a non-empty document is not a mapping.
pub fn parse_manifests(stream: &str) -> Result<Vec<RenderedObject>, RenderError> {
    let documents = load_documents(stream)
        .map_err(|LoadError { index, reason }| RenderError::Parse { index, reason })?;
    let mut objects = Vec::new();
    for (index, value) in documents.into_iter().enumerate() {
        if is_empty_document(&value) {
            continue;
        }
        let object = RenderedObject::try_from(value)
            .map_err(|source| RenderError::NotAnObject { index, source })?;
        objects.push(object);
    }
    Ok(objects)
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
