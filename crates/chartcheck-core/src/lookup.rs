//! # Object Lookup Index
//!
//! Test suites usually want "the Deployment named X" out of a render rather
//! than positional access. [`prepare_lookup`] builds that index.
//!
//! `(kind, name)` pairs are expected to be unique within one render. When
//! they are not, the later object replaces the earlier one.

use std::collections::HashMap;
use std::fmt;

use crate::error::ObjectError;
use crate::object::RenderedObject;

/// Key of the lookup index: the object's `kind` and `metadata.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Object kind, exactly as rendered (not case-folded).
    pub kind: String,
    /// `metadata.name`.
    pub name: String,
}

impl ObjectKey {
    /// Build a key from a kind and name.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Derive the key of a rendered object.
    pub fn of(obj: &RenderedObject) -> Result<Self, ObjectError> {
        Ok(Self::new(obj.require_kind()?, obj.require_name()?))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Rendered objects indexed by `(kind, name)`.
pub type ObjectLookup = HashMap<ObjectKey, RenderedObject>;

/// Index rendered objects by `(kind, metadata.name)`.
///
/// Pure: no I/O and no schema validation. Fails only when an object lacks
/// `kind` or `metadata.name`.
pub fn prepare_lookup<I>(objects: I) -> Result<ObjectLookup, ObjectError>
where
    I: IntoIterator<Item = RenderedObject>,
{
    let mut lookup = ObjectLookup::new();
    for obj in objects {
        let key = ObjectKey::of(&obj)?;
        lookup.insert(key, obj);
    }
    Ok(lookup)
}
