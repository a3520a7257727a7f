//! Memoized schema validators.
//!
//! A [`SchemaCache`] compiles each schema once per caller-supplied
//! `(apiVersion, kind, kubeVersion)` triple and keeps the compiled validator
//! for as long as the cache lives. The table is unbounded: a test run only
//! touches the kinds its charts emit, for a handful of Kubernetes versions.
//!
//! The memo key is the triple exactly as supplied, so `("apps/v1",
//! "Deployment", ..)` and `("Apps/V1", "deployment", ..)` compile separately
//! even though they resolve to the same file on disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chartcheck_core::{ConfigError, HarnessConfig, RenderedObject};
use jsonschema::Validator;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{SchemaError, Violation};
use crate::fetch::HttpFetcher;
use crate::key::SchemaKey;
use crate::policy::{chart_label, is_exempt};
use crate::store::SchemaStore;

type MemoKey = (String, String, String);

/// Result of validating one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The object conforms to its schema.
    Validated,
    /// The object was skipped by the exemption policy.
    Exempt {
        /// Chart label that triggered the exemption.
        chart: String,
    },
}

/// Schema store plus a process-lifetime table of compiled validators.
pub struct SchemaCache {
    store: SchemaStore,
    validators: Mutex<HashMap<MemoKey, Arc<Validator>>>,
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("store", &self.store)
            .field("compiled", &self.validators.lock().len())
            .finish()
    }
}

static SHARED: OnceLock<SchemaCache> = OnceLock::new();

impl SchemaCache {
    /// Wrap a store with an empty validator table.
    pub fn new(store: SchemaStore) -> Self {
        Self {
            store,
            validators: Mutex::new(HashMap::new()),
        }
    }

    /// Build a cache that fetches over HTTP according to `config`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        let fetcher = match config.fetch_timeout_secs {
            Some(secs) => HttpFetcher::with_timeout(Duration::from_secs(secs)),
            None => HttpFetcher::new(),
        };
        let store = SchemaStore::new(
            config.schema_dir.clone(),
            config.schema_base_url.clone(),
            Arc::new(fetcher),
        )
        .offline(config.offline);
        Self::new(store)
    }

    /// The process-wide cache, configured from the environment on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the environment holds invalid settings.
    /// Nothing is cached in that case; a later call retries.
    pub fn shared() -> Result<&'static SchemaCache, ConfigError> {
        if let Some(cache) = SHARED.get() {
            return Ok(cache);
        }
        let config = HarnessConfig::from_env()?;
        Ok(SHARED.get_or_init(|| Self::from_config(&config)))
    }

    /// The underlying schema store.
    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    /// Local path the schema for this triple is cached at.
    pub fn schema_path(&self, api_version: &str, kind: &str, kube_version: &str) -> PathBuf {
        self.store
            .local_path(&SchemaKey::new(api_version, kind, kube_version))
    }

    /// Load the schema document for a triple, fetching it on a local miss.
    pub fn get_schema(
        &self,
        api_version: &str,
        kind: &str,
        kube_version: &str,
    ) -> Result<Value, SchemaError> {
        self.store
            .load(&SchemaKey::new(api_version, kind, kube_version))
    }

    /// The compiled validator for a triple, compiling it on first request.
    ///
    /// # Errors
    ///
    /// Propagates every [`SchemaStore::load`] error and returns
    /// [`SchemaError::SchemaCompile`] if compilation fails. Failures are not
    /// memoized.
    pub fn validator(
        &self,
        api_version: &str,
        kind: &str,
        kube_version: &str,
    ) -> Result<Arc<Validator>, SchemaError> {
        let memo_key: MemoKey = (
            api_version.to_string(),
            kind.to_string(),
            kube_version.to_string(),
        );
        if let Some(validator) = self.validators.lock().get(&memo_key) {
            return Ok(Arc::clone(validator));
        }

        let key = SchemaKey::new(api_version, kind, kube_version);
        let schema = self.store.load(&key)?;
        let compiled = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .build(&schema)
            .map_err(|e| SchemaError::SchemaCompile {
                path: self.store.local_path(&key).display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(schema = %key, "compiled schema validator");

        let mut validators = self.validators.lock();
        let entry = validators
            .entry(memo_key)
            .or_insert_with(|| Arc::new(compiled));
        Ok(Arc::clone(entry))
    }

    /// Number of validators compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.validators.lock().len()
    }

    /// Validate a rendered object against the schema for its `apiVersion`
    /// and `kind` at `kube_version`.
    ///
    /// Objects exempted by [`is_exempt`] return
    /// [`ValidationOutcome::Exempt`] without touching the schema store.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::MissingField`] if `apiVersion` or `kind` is absent.
    /// - [`SchemaError::ValidationFailed`] with every violation found.
    /// - Any error from [`SchemaCache::validator`].
    pub fn validate_object(
        &self,
        object: &RenderedObject,
        kube_version: &str,
    ) -> Result<ValidationOutcome, SchemaError> {
        if let Some(labels) = object.labels() {
            if is_exempt(labels) {
                let chart = chart_label(labels).unwrap_or_default().to_string();
                tracing::debug!(
                    kind = object.kind().unwrap_or("<none>"),
                    name = object.name().unwrap_or("<none>"),
                    %chart,
                    "skipping schema validation for exempt chart"
                );
                return Ok(ValidationOutcome::Exempt { chart });
            }
        }

        let api_version = object
            .api_version()
            .ok_or(SchemaError::MissingField { field: "apiVersion" })?;
        let kind = object
            .kind()
            .ok_or(SchemaError::MissingField { field: "kind" })?;

        let validator = self.validator(api_version, kind, kube_version)?;
        let instance = object.to_value();

        let details: Vec<Violation> = validator
            .iter_errors(&instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if details.is_empty() {
            Ok(ValidationOutcome::Validated)
        } else {
            Err(SchemaError::ValidationFailed {
                api_version: api_version.to_string(),
                kind: kind.to_string(),
                name: object.name().map(str::to_string),
                kube_version: kube_version.to_string(),
                count: details.len(),
                details,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SchemaFetcher;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    struct CountingFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    impl SchemaFetcher for CountingFetcher {
        fn fetch(&self, _url: &Url) -> Result<Vec<u8>, SchemaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    fn service_schema() -> Value {
        json!({
            "type": "object",
            "required": ["apiVersion", "kind", "metadata"],
            "properties": {
                "apiVersion": {"type": "string"},
                "kind": {"type": "string", "enum": ["Service"]},
                "metadata": {
                    "type": "object",
                    "properties": {"namespace": {"type": "string"}}
                },
                "spec": {
                    "type": "object",
                    "properties": {"type": {"type": "string"}}
                }
            }
        })
    }

    fn cache_with(schema: &Value) -> (tempfile::TempDir, Arc<CountingFetcher>, SchemaCache) {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(CountingFetcher {
            body: serde_json::to_vec(schema).unwrap(),
            calls: AtomicUsize::new(0),
        });
        let store = SchemaStore::new(
            dir.path(),
            Url::parse("https://mirror.example/schemas").unwrap(),
            fetcher.clone(),
        );
        (dir, fetcher, SchemaCache::new(store))
    }

    fn object(value: Value) -> RenderedObject {
        RenderedObject::try_from(value).unwrap()
    }

    #[test]
    fn validator_is_memoized_per_triple() {
        let (_dir, fetcher, cache) = cache_with(&service_schema());
        let a = cache.validator("v1", "Service", "1.24.0").unwrap();
        let b = cache.validator("v1", "Service", "1.24.0").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.compiled_count(), 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn memo_key_is_unnormalized() {
        let (_dir, fetcher, cache) = cache_with(&service_schema());
        let a = cache.validator("v1", "Service", "1.24.0").unwrap();
        let b = cache.validator("V1", "service", "1.24.0").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.compiled_count(), 2);
        // Same path on disk: fetched once.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn valid_object_passes() {
        let (_dir, _fetcher, cache) = cache_with(&service_schema());
        let svc = object(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "web", "namespace": "default"},
            "spec": {"type": "ClusterIP"}
        }));
        assert_eq!(
            cache.validate_object(&svc, "1.24.0").unwrap(),
            ValidationOutcome::Validated
        );
    }

    #[test]
    fn invalid_object_reports_violations() {
        let (_dir, _fetcher, cache) = cache_with(&service_schema());
        let svc = object(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "web", "namespace": 42},
            "spec": {"type": 7}
        }));
        let err = cache.validate_object(&svc, "1.24.0").unwrap_err();
        match err {
            SchemaError::ValidationFailed {
                kind,
                name,
                count,
                details,
                ..
            } => {
                assert_eq!(kind, "Service");
                assert_eq!(name.as_deref(), Some("web"));
                assert_eq!(count, 2);
                let paths: Vec<&str> = details.iter().map(|d| d.instance_path.as_str()).collect();
                assert!(paths.contains(&"/metadata/namespace"), "{paths:?}");
                assert!(paths.contains(&"/spec/type"), "{paths:?}");
            }
            other => panic!("expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn postgresql_chart_is_exempt_from_schema() {
        let (_dir, fetcher, cache) = cache_with(&service_schema());
        let svc = object(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {
                "name": "release-name-postgresql",
                "namespace": 12345,
                "labels": {"helm.sh/chart": "postgresql-12.1.2"}
            }
        }));
        assert_eq!(
            cache.validate_object(&svc, "1.24.0").unwrap(),
            ValidationOutcome::Exempt {
                chart: "postgresql-12.1.2".to_string()
            }
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_kind_is_an_error() {
        let (_dir, _fetcher, cache) = cache_with(&service_schema());
        let err = cache
            .validate_object(&object(json!({"apiVersion": "v1"})), "1.24.0")
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { field: "kind" }));
    }

    #[test]
    fn schema_path_uses_store_layout() {
        let (dir, _fetcher, cache) = cache_with(&service_schema());
        assert_eq!(
            cache.schema_path("apps/v1", "Deployment", "1.24.0"),
            dir.path().join("v1.24.0-standalone/deployment-apps-v1.json")
        );
    }
}
