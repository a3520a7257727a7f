//! # Render Subcommand
//!
//! Renders a chart through helm, validates every object against its
//! Kubernetes schema, and prints the objects as a YAML stream.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chartcheck_core::HarnessConfig;
use chartcheck_render::{ChartRenderer, RenderRequest};
use chartcheck_schema::SchemaCache;
use clap::Args;
use serde_json::Value;

/// Arguments for the render subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Chart directory. Defaults to `CHARTCHECK_CHART_DIR` or the current
    /// directory.
    pub chart: Option<PathBuf>,

    /// YAML file with values to overlay on the chart defaults.
    #[arg(short = 'f', long)]
    pub values: Option<PathBuf>,

    /// Only render the given template. Repeatable.
    #[arg(short, long = "show-only")]
    pub show_only: Vec<String>,

    /// Kubernetes version to render and validate for.
    #[arg(long)]
    pub kube_version: Option<String>,

    /// Release namespace.
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Release name.
    #[arg(long)]
    pub name: Option<String>,
}

/// Execute the render subcommand, writing the YAML stream to `out`.
pub fn run_render(args: &RenderArgs, config: &HarnessConfig, out: &mut dyn Write) -> Result<u8> {
    let request = build_request(args)?;
    let schemas = Arc::new(SchemaCache::from_config(config));
    let renderer = ChartRenderer::new(config, schemas);

    let rendered = renderer.render(&request).context("chart render failed")?;
    let Some(objects) = rendered else {
        tracing::info!("helm rendered no output");
        return Ok(0);
    };

    for object in &objects {
        let yaml = serde_yaml::to_string(object).context("failed to serialize object")?;
        write!(out, "---\n{yaml}")?;
    }
    tracing::info!(count = objects.len(), "all objects valid");
    Ok(0)
}

fn build_request(args: &RenderArgs) -> Result<RenderRequest> {
    let mut request = RenderRequest::new().show_only(args.show_only.clone());
    if let Some(chart) = &args.chart {
        request = request.chart_dir(chart.clone());
    }
    if let Some(path) = &args.values {
        request = request.values(read_values(path)?);
    }
    if let Some(version) = &args.kube_version {
        request = request.kube_version(version.clone());
    }
    if let Some(namespace) = &args.namespace {
        request = request.namespace(namespace.clone());
    }
    if let Some(name) = &args.name {
        request = request.name(name.clone());
    }
    Ok(request)
}

/// Read a values file. An empty file is an empty overlay.
fn read_values(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read values file {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let values: Value = serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse values file {}", path.display()))?;
    match values {
        Value::Null => Ok(Value::Object(Default::default())),
        Value::Object(_) => Ok(values),
        other => anyhow::bail!(
            "values file {} must hold a mapping, found {}",
            path.display(),
            chartcheck_core::object::json_type_name(&other)
        ),
    }
}
