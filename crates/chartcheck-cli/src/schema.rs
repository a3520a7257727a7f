//! # Schema Subcommand
//!
//! Resolves the local cache path for an `apiVersion`/`kind` pair and makes
//! sure the schema is present there, fetching it on a miss.

use std::io::Write;

use anyhow::{Context, Result};
use chartcheck_core::HarnessConfig;
use chartcheck_schema::SchemaCache;
use clap::Args;

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// API version, e.g. `apps/v1` or `v1`.
    pub api_version: String,

    /// Kind, e.g. `Deployment`.
    pub kind: String,

    /// Kubernetes version. Defaults to `CHARTCHECK_KUBE_VERSION`.
    #[arg(long)]
    pub kube_version: Option<String>,

    /// Also compile the schema, reporting a compile failure.
    #[arg(long)]
    pub compile: bool,
}

/// Execute the schema subcommand, printing the cache path to `out`.
pub fn run_schema(args: &SchemaArgs, config: &HarnessConfig, out: &mut dyn Write) -> Result<u8> {
    let kube_version = args.kube_version.as_deref().unwrap_or(&config.kube_version);
    let cache = SchemaCache::from_config(config);

    cache
        .get_schema(&args.api_version, &args.kind, kube_version)
        .with_context(|| format!("no schema for {} {}", args.api_version, args.kind))?;
    if args.compile {
        cache
            .validator(&args.api_version, &args.kind, kube_version)
            .context("schema does not compile")?;
    }

    let path = cache.schema_path(&args.api_version, &args.kind, kube_version);
    writeln!(out, "{}", path.display())?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> HarnessConfig {
        let mut config = HarnessConfig::rooted_at(dir, dir).unwrap();
        config.offline = true;
        config
    }

    fn args(api_version: &str, kind: &str) -> SchemaArgs {
        SchemaArgs {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            kube_version: None,
            compile: true,
        }
    }

    #[test]
    fn prints_cached_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v1.24.0-standalone/deployment-apps-v1.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"type": "object"}"#).unwrap();

        let mut out = Vec::new();
        let code = run_schema(&args("apps/v1", "Deployment"), &config(dir.path()), &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), path.display().to_string());
    }

    #[test]
    fn offline_miss_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = run_schema(&args("v1", "Service"), &config(dir.path()), &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("no schema for v1 Service"), "{err:#}");
        assert!(out.is_empty());
    }
}
