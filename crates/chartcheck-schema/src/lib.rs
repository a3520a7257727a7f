//! # chartcheck-schema: Kubernetes Schema Cache
//!
//! Resolves an `(apiVersion, kind, kubeVersion)` triple to a compiled JSON
//! Schema validator and validates rendered objects against it.
//!
//! ## Acquisition (`store`)
//!
//! [`SchemaStore`] maps a [`SchemaKey`] to a path under the local schema
//! cache root. A present file is read; a missing one is fetched from the
//! remote mirror through a [`SchemaFetcher`], persisted verbatim, and then
//! parsed. Every document is checked against the Draft-7 meta-schema.
//!
//! ## Memoization (`cache`)
//!
//! [`SchemaCache`] compiles each schema once per caller-supplied triple and
//! keeps the validator for its own lifetime. [`SchemaCache::shared`] gives a
//! process-wide instance configured from the environment.
//!
//! ## Exemptions (`policy`)
//!
//! Objects from the PostgreSQL subchart are skipped: its all-numeric
//! namespace values do not pass the upstream schema. The rule is a single
//! predicate, [`is_exempt`].
//!
//! ## Crate Policy
//!
//! - Network access happens only through [`SchemaFetcher`].
//! - Failures are never retried or downgraded; they propagate to the caller.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod key;
pub mod policy;
pub mod store;

pub use cache::{SchemaCache, ValidationOutcome};
pub use error::{SchemaError, Violation};
pub use fetch::{HttpFetcher, SchemaFetcher};
pub use key::SchemaKey;
pub use policy::{chart_label, is_exempt};
pub use store::SchemaStore;
