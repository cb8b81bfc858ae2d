#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod components;
mod config;
mod document;
mod error;
mod generate;
mod load;
pub mod openapi;
mod paths;
mod routes;
pub mod schema;
mod types;

pub(crate) use proto2oas_core::descriptor;

pub use config::{ProjectConfig, ServerConfig, DEFAULT_VERSION};
pub use error::{Error, Result};
pub use generate::{generate, generate_from_descriptor};
pub use load::{build_tree, load_descriptor_set};
pub use openapi::OpenApiDocument;
pub use routes::{resolve_route, ResolvedRoute, RouteTable, DEFAULT_VERB};

/// Internal building blocks for advanced use and testing.
///
/// **Not covered by semver guarantees.** These re-exports are `#[doc(hidden)]`
/// and may change in any release, including patch versions. They exist for
/// integration testing and for callers assembling documents piecemeal.
#[doc(hidden)]
pub mod internal {
    pub use crate::components::{enum_component, object_component};
    pub use crate::document::{service_tag, skeleton};
    pub use crate::paths::{merge_service_paths, RouteOptions};
    pub use crate::types::map_type;
}
