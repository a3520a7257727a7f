//! # chartcheck-render: Chart Rendering Pipeline
//!
//! Turns a chart directory plus a value overlay into a validated sequence of
//! [`RenderedObject`](chartcheck_core::RenderedObject)s:
//!
//! ```text
//! RenderRequest ──► values file ──► helm template ──► YAML stream ──► SchemaCache
//!                   (tempfile)      (TemplateEngine)   (parse)         (validate)
//! ```
//!
//! ## Modules
//!
//! - [`request`]: [`RenderRequest`] and its defaults.
//! - [`engine`]: the [`TemplateEngine`] seam and the [`HelmBinary`]
//!   implementation that spawns `helm`.
//! - [`values`]: the scoped temporary values file.
//! - [`parse`]: multi-document manifest parsing.
//! - [`yaml11`]: YAML 1.1 scalar resolution and merge keys for helm output.
//! - [`render`]: [`ChartRenderer`], which ties the above together.
//! - [`model`]: typed deserialization of rendered objects.
//!
//! ## Failure policy
//!
//! Nothing is retried. An engine failure is logged with the full command
//! line and values dump before it is returned, so a failing test can be
//! reproduced by hand.

pub mod engine;
pub mod error;
pub mod model;
pub mod parse;
pub mod render;
pub mod request;
pub mod values;
pub mod yaml11;

pub use engine::{EngineCommand, EngineOutput, HelmBinary, TemplateEngine};
pub use error::RenderError;
pub use model::to_model;
pub use parse::parse_manifests;
pub use render::{ChartRenderer, MISSING_TEMPLATE_HINT, MISSING_TEMPLATE_MARKER};
pub use request::{RenderRequest, ShowOnly};
