//! Integration tests: `chartcheck render` against a stand-in helm script and
//! a pre-seeded offline schema cache.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chartcheck_cli::render::{run_render, RenderArgs};
use chartcheck_core::HarnessConfig;

const MANIFEST: &str = "\
---
# Source: web/templates/configmap.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: release-name-web
data:
  mode: production
";

// Writing a script while another test thread forks can leave the write
// descriptor open in the child and fail exec with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

/// Write an executable script that prints `stdout` and exits with `code`.
fn fake_helm(dir: &Path, stdout: &str, code: i32) -> PathBuf {
    let script = dir.join("helm");
    std::fs::write(
        &script,
        format!("#!/bin/sh\ncat <<'MANIFEST'\n{stdout}MANIFEST\nexit {code}\n"),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn seed_schema(schema_dir: &Path, relative: &str, body: &str) {
    let path = schema_dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn config(root: &Path, helm: PathBuf) -> HarnessConfig {
    let mut config = HarnessConfig::rooted_at(root.join("schemas"), root.join("chart")).unwrap();
    config.helm_bin = helm.display().to_string();
    config.offline = true;
    config
}

fn args() -> RenderArgs {
    RenderArgs {
        chart: None,
        values: None,
        show_only: Vec::new(),
        kube_version: None,
        namespace: None,
        name: None,
    }
}

#[test]
fn prints_validated_objects_as_yaml() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let helm = fake_helm(dir.path(), MANIFEST, 0);
    seed_schema(
        &dir.path().join("schemas"),
        "v1.24.0-standalone/configmap-v1.json",
        r#"{"type": "object", "properties": {"data": {"type": "object"}}}"#,
    );

    let mut out = Vec::new();
    let code = run_render(&args(), &config(dir.path(), helm), &mut out).unwrap();
    assert_eq!(code, 0);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("---\n"), "{printed}");
    let doc: serde_json::Value = serde_yaml::from_str(printed.trim_start_matches("---\n")).unwrap();
    assert_eq!(doc["kind"], "ConfigMap");
    assert_eq!(doc["data"]["mode"], "production");
}

#[test]
fn invalid_object_fails_the_command() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let helm = fake_helm(dir.path(), MANIFEST, 0);
    seed_schema(
        &dir.path().join("schemas"),
        "v1.24.0-standalone/configmap-v1.json",
        r#"{"type": "object", "properties": {"data": {"type": "array"}}}"#,
    );

    let mut out = Vec::new();
    let err = run_render(&args(), &config(dir.path(), helm), &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("chart render failed"), "{err:#}");
    assert!(out.is_empty());
}

#[test]
fn offline_cache_miss_fails_the_command() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let helm = fake_helm(dir.path(), MANIFEST, 0);

    let mut out = Vec::new();
    assert!(run_render(&args(), &config(dir.path(), helm), &mut out).is_err());
}

#[test]
fn helm_failure_fails_the_command() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let helm = fake_helm(dir.path(), "", 1);

    let mut out = Vec::new();
    let err = run_render(&args(), &config(dir.path(), helm), &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("helm exited with exit code 1"), "{err:#}");
}

#[test]
fn no_output_prints_nothing() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let helm = fake_helm(dir.path(), "", 0);

    let mut out = Vec::new();
    let code = run_render(&args(), &config(dir.path(), helm), &mut out).unwrap();
    assert_eq!(code, 0);
    assert!(out.is_empty());
}
