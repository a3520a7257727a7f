//! Templating engine invocation.
//!
//! [`TemplateEngine`] is the seam between the renderer and the external
//! `helm` process. [`HelmBinary`] runs the real binary; tests substitute a
//! fake that returns canned output.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    /// Program to run.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
}

impl EngineCommand {
    /// Build a `helm template` command line:
    ///
    /// ```text
    /// <program> template --kube-version <v> <name> <chart_dir>
    ///     --values <values_file> --namespace <ns> [--show-only <path>]*
    /// ```
    pub fn template(
        program: &str,
        kube_version: &str,
        name: &str,
        chart_dir: &Path,
        values_file: &Path,
        namespace: &str,
        show_only: &[String],
    ) -> Self {
        let mut args = vec![
            "template".to_string(),
            "--kube-version".to_string(),
            kube_version.to_string(),
            name.to_string(),
            chart_dir.display().to_string(),
            "--values".to_string(),
            values_file.display().to_string(),
            "--namespace".to_string(),
            namespace.to_string(),
        ];
        for path in show_only {
            args.push("--show-only".to_string());
            args.push(path.clone());
        }
        Self {
            program: program.to_string(),
            args,
        }
    }

    /// Value following the first occurrence of `flag`, if any.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of one engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Exit code; `None` if terminated by a signal.
    pub status: Option<i32>,
    /// Standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: Vec<u8>,
}

impl EngineOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs an engine command to completion.
pub trait TemplateEngine: Send + Sync {
    /// Run `command`, blocking until it exits, and capture its output.
    ///
    /// An `Err` means the process could not be started or waited on; a
    /// non-zero exit is reported through [`EngineOutput::status`].
    fn run(&self, command: &EngineCommand) -> std::io::Result<EngineOutput>;
}

/// Spawns the command as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelmBinary;

impl TemplateEngine for HelmBinary {
    fn run(&self, command: &EngineCommand) -> std::io::Result<EngineOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()?;
        Ok(EngineOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
