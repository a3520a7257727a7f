//! Scoped values file.
//!
//! The overlay is written to a fresh temporary file for the duration of one
//! engine run. Dropping [`ValuesFile`] removes it, on success and on every
//! error path alike.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::RenderError;

/// A temporary YAML file holding one value overlay.
#[derive(Debug)]
pub struct ValuesFile {
    file: NamedTempFile,
    dump: String,
}

impl ValuesFile {
    /// Serialize `values` to YAML and write it to a new temporary file.
    ///
    /// # Errors
    ///
    /// [`RenderError::ValuesSerialize`] if the overlay has no YAML form,
    /// [`RenderError::ValuesFile`] if the file cannot be created or written.
    pub fn write(values: &Value) -> Result<Self, RenderError> {
        let dump = serde_yaml::to_string(values)?;
        let mut file = tempfile::Builder::new()
            .prefix("values-")
            .suffix(".yaml")
            .tempfile()
            .map_err(RenderError::ValuesFile)?;
        file.write_all(dump.as_bytes())
            .map_err(RenderError::ValuesFile)?;
        file.flush().map_err(RenderError::ValuesFile)?;
        Ok(Self { file, dump })
    }

    /// Location on disk, valid until drop.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The YAML text written to the file.
    pub fn dump(&self) -> &str {
        &self.dump
    }
}
