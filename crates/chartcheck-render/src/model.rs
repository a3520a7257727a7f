//! Typed views over rendered objects.

use chartcheck_core::RenderedObject;
use serde::de::DeserializeOwned;

/// Deserialize a rendered object into a typed model.
///
/// Test suites use this to assert on a `Deployment` or `Service` through
/// their own structs rather than by dotted-path lookups.
pub fn to_model<T: DeserializeOwned>(object: &RenderedObject) -> Result<T, serde_json::Error> {
    serde_json::from_value(object.to_value())
}
