//! Render error types.

use chartcheck_core::ObjectError;
use chartcheck_schema::SchemaError;
use thiserror::Error;

/// Errors returned by [`ChartRenderer::render`](crate::ChartRenderer::render).
#[derive(Error, Debug)]
pub enum RenderError {
    /// The templating engine exited unsuccessfully.
    #[error(
        "helm exited with {}: {stderr} (command: {command}){}",
        describe_status(.status),
        describe_hint(.hint)
    )]
    EngineFailed {
        /// Full command line, space-joined.
        command: String,
        /// Exit code; `None` if the process was killed by a signal.
        status: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
        /// YAML the values file contained.
        values_dump: String,
        /// Likely cause, when stderr matches a known pattern.
        hint: Option<String>,
    },

    /// The templating engine could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The values file could not be created or written.
    #[error("failed to write values file: {0}")]
    ValuesFile(#[source] std::io::Error),

    /// The values overlay could not be serialized to YAML.
    #[error("failed to serialize values: {0}")]
    ValuesSerialize(#[from] serde_yaml::Error),

    /// The engine output is not a valid YAML stream.
    #[error("failed to parse rendered document {index}: {reason}")]
    Parse {
        /// Zero-based index of the document in the stream.
        index: usize,
        /// Parser message.
        reason: String,
    },

    /// A rendered document is not a mapping.
    #[error("rendered document {index} is not an object: {source}")]
    NotAnObject {
        /// Zero-based index of the document in the stream.
        index: usize,
        /// Shape error.
        #[source]
        source: ObjectError,
    },

    /// A rendered object failed schema acquisition or validation.
    #[error(transparent)]
    Validation(#[from] SchemaError),
}

impl RenderError {
    /// The hint attached to an engine failure, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            RenderError::EngineFailed { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn describe_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!("; hint: {hint}"),
        None => String::new(),
    }
}
