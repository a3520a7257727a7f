//! # chartcheck-core: Shared Types
//!
//! Foundational types used by the schema cache and the chart renderer.
//!
//! ## Modules
//!
//! - [`object`]: [`RenderedObject`], one manifest emitted by `helm template`,
//!   with accessors for the fields test suites assert on.
//! - [`lookup`]: the `(kind, name)` index over a render's output.
//! - [`config`]: [`HarnessConfig`], environment-driven defaults for schema
//!   cache location, schema source, helm binary, and chart directory.
//! - [`error`]: error types shared by the above.
//!
//! ## Crate Policy
//!
//! - No I/O beyond reading environment variables and probing the
//!   filesystem for the repository root.
//! - No dependency on other chartcheck crates.

pub mod config;
pub mod error;
pub mod lookup;
pub mod object;

pub use config::HarnessConfig;
pub use error::{ConfigError, ObjectError};
pub use lookup::{prepare_lookup, ObjectKey, ObjectLookup};
pub use object::RenderedObject;
