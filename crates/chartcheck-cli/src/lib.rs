//! # chartcheck-cli: Command-Line Interface
//!
//! Provides the `chartcheck` binary.
//!
//! ## Subcommands
//!
//! - `chartcheck render`: render a chart, validate every object, print the
//!   result as a YAML stream.
//! - `chartcheck schema`: resolve the cached schema for an
//!   `apiVersion`/`kind` pair, fetching it if missing.
//!
//! ```bash
//! chartcheck render ./chart --values ci/prod.yaml --show-only templates/deployment.yaml
//! chartcheck schema apps/v1 Deployment --kube-version 1.27.0
//! CHARTCHECK_OFFLINE=1 chartcheck render ./chart
//! ```
//!
//! Configuration comes from `CHARTCHECK_*` environment variables (see
//! [`HarnessConfig::from_env`]); the global flags below override them.

pub mod render;
pub mod schema;

use std::path::PathBuf;

use chartcheck_core::HarnessConfig;
use clap::Args;

/// Flags shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Schema cache directory. Overrides `CHARTCHECK_SCHEMA_DIR`.
    #[arg(long, global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Never fetch schemas; a cache miss is an error.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Helm binary to run. Overrides `CHARTCHECK_HELM_BIN`.
    #[arg(long, global = true)]
    pub helm: Option<String>,
}

impl GlobalArgs {
    /// Apply these flags on top of `config`.
    pub fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(dir) = &self.schema_dir {
            config.schema_dir = dir.clone();
        }
        if self.offline {
            config.offline = true;
        }
        if let Some(helm) = &self.helm {
            config.helm_bin = helm.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let config = HarnessConfig::rooted_at("/env/schemas", "/chart").unwrap();
        let args = GlobalArgs {
            schema_dir: Some(PathBuf::from("/flag/schemas")),
            offline: true,
            helm: Some("/usr/local/bin/helm3".to_string()),
        };
        let config = args.apply(config);
        assert_eq!(config.schema_dir, PathBuf::from("/flag/schemas"));
        assert!(config.offline);
        assert_eq!(config.helm_bin, "/usr/local/bin/helm3");
    }

    #[test]
    fn absent_flags_keep_config() {
        let config = HarnessConfig::rooted_at("/env/schemas", "/chart").unwrap();
        assert_eq!(GlobalArgs::default().apply(config.clone()), config);
    }
}
