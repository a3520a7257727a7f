//! The chart renderer.
//!
//! [`ChartRenderer::render`] writes the request's values to a scoped file,
//! runs `helm template`, parses the output and validates every object
//! against its Kubernetes schema before returning it.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use chartcheck_core::{ConfigError, HarnessConfig, RenderedObject};
use chartcheck_schema::SchemaCache;

use crate::engine::{EngineCommand, HelmBinary, TemplateEngine};
use crate::error::RenderError;
use crate::parse::parse_manifests;
use crate::request::RenderRequest;
use crate::values::ValuesFile;

/// Substring of helm's stderr when a `--show-only` template is missing or
/// rendered nothing.
pub const MISSING_TEMPLATE_MARKER: &str = "could not find template";

/// Attached to [`RenderError::EngineFailed`] when stderr contains
/// [`MISSING_TEMPLATE_MARKER`].
pub const MISSING_TEMPLATE_HINT: &str =
    "the template may be gated on a value that is unset; check that the values enable it";

enum Schemas {
    Shared(&'static SchemaCache),
    Owned(Arc<SchemaCache>),
}

impl Deref for Schemas {
    type Target = SchemaCache;

    fn deref(&self) -> &SchemaCache {
        match self {
            Schemas::Shared(cache) => cache,
            Schemas::Owned(cache) => cache,
        }
    }
}

/// Renders charts and validates what they emit.
pub struct ChartRenderer {
    engine: Arc<dyn TemplateEngine>,
    schemas: Schemas,
    helm_bin: String,
    chart_dir: PathBuf,
    kube_version: String,
}

impl std::fmt::Debug for ChartRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRenderer")
            .field("helm_bin", &self.helm_bin)
            .field("chart_dir", &self.chart_dir)
            .field("kube_version", &self.kube_version)
            .field("schemas", &*self.schemas)
            .finish_non_exhaustive()
    }
}

impl ChartRenderer {
    /// A renderer that spawns helm per `config` and validates with `schemas`.
    pub fn new(config: &HarnessConfig, schemas: Arc<SchemaCache>) -> Self {
        Self::with_schemas(config, Schemas::Owned(schemas))
    }

    /// A renderer configured from the environment, validating through the
    /// process-wide [`SchemaCache::shared`] instance.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = HarnessConfig::from_env()?;
        let schemas = SchemaCache::shared()?;
        Ok(Self::with_schemas(&config, Schemas::Shared(schemas)))
    }

    fn with_schemas(config: &HarnessConfig, schemas: Schemas) -> Self {
        Self {
            engine: Arc::new(HelmBinary),
            schemas,
            helm_bin: config.helm_bin.clone(),
            chart_dir: config.chart_dir.clone(),
            kube_version: config.kube_version.clone(),
        }
    }

    /// Replace the engine used to run commands.
    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// The schema cache objects are validated against.
    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// The command line `request` runs, given the path of its values file.
    pub fn command_for(&self, request: &RenderRequest, values_path: &std::path::Path) -> EngineCommand {
        let chart_dir = request.chart_dir.as_ref().unwrap_or(&self.chart_dir);
        EngineCommand::template(
            &self.helm_bin,
            request.effective_kube_version(&self.kube_version),
            &request.name,
            chart_dir,
            values_path,
            &request.namespace,
            request.show_only.paths(),
        )
    }

    /// Render a chart and validate every object it emits.
    ///
    /// Returns `Ok(None)` when helm prints nothing at all, as happens when
    /// `show_only` names a template that a value has switched off. Any
    /// output, even a lone newline or only empty documents, is parsed and
    /// may yield `Ok(Some(vec![]))`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::ValuesSerialize`] / [`RenderError::ValuesFile`] if
    ///   the values file cannot be produced.
    /// - [`RenderError::Spawn`] if helm cannot be started.
    /// - [`RenderError::EngineFailed`] on a non-zero exit.
    /// - [`RenderError::Parse`] / [`RenderError::NotAnObject`] for
    ///   malformed or non-UTF-8 output.
    /// - [`RenderError::Validation`] for the first object that fails schema
    ///   acquisition or validation.
    pub fn render(
        &self,
        request: &RenderRequest,
    ) -> Result<Option<Vec<RenderedObject>>, RenderError> {
        let kube_version = request.effective_kube_version(&self.kube_version);
        let values = ValuesFile::write(&request.values)?;
        let command = self.command_for(request, values.path());
        tracing::debug!(command = %command, "rendering chart");

        let output = self
            .engine
            .run(&command)
            .map_err(|source| RenderError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(
                command = %command,
                status = ?output.status,
                values = values.dump(),
                stdout = %stdout,
                stderr = %stderr,
                "helm template failed"
            );
            let hint = if stderr.contains(MISSING_TEMPLATE_MARKER) {
                tracing::error!("{MISSING_TEMPLATE_HINT}");
                Some(MISSING_TEMPLATE_HINT.to_string())
            } else {
                None
            };
            return Err(RenderError::EngineFailed {
                command: command.to_string(),
                status: output.status,
                stdout,
                stderr: stderr.trim_end().to_string(),
                values_dump: values.dump().to_string(),
                hint,
            });
        }
        drop(values);

        if output.stdout.is_empty() {
            tracing::debug!(command = %command, "helm rendered nothing");
            return Ok(None);
        }
        let stdout = String::from_utf8(output.stdout).map_err(|e| RenderError::Parse {
            index: 0,
            reason: format!("helm output is not UTF-8: {e}"),
        })?;

        let objects = parse_manifests(&stdout)?;
        for object in &objects {
            self.schemas.validate_object(object, kube_version)?;
        }
        tracing::debug!(count = objects.len(), kube_version, "rendered and validated");
        Ok(Some(objects))
    }
}
