//! Project-level generation config loaded from YAML or TOML.
//!
//! Externalizes the document metadata and route overrides so they live next
//! to the proto files instead of being hardcoded in Rust source.
//!
//! # File format
//!
//! ```yaml
//! # api/openapi/proto2oas.yaml
//! title: PetStore Service APIs
//! description: Some description of the server.
//! email: support@example.com
//! version: 1.2.0
//!
//! servers:
//!   - url: http://localhost:8080/api-explorer
//!     description: Local Server
//!
//! # Service.Method → "<verb> <path>"; `:name` marks a path parameter.
//! routes:
//!   UserMgnt.getPets: get /UserMgnt/pets
//!   User.getUserInfo: get /users/:userId
//!
//! # Keep proto field names instead of lowerCamelCase JSON names.
//! keep_case: true
//!
//! # Use google.api.http annotations for methods without an override.
//! http_annotations: false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::routes::RouteTable;

/// Version written to `info.version` when none is configured.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Document metadata and route configuration for one generation run.
///
/// Loaded from a file via [`ProjectConfig::load`] or assembled with the
/// builder methods, then checked with [`ProjectConfig::validate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// API title (`info.title`). Required.
    pub title: String,

    /// API description (`info.description`).
    pub description: Option<String>,

    /// Contact email (`info.contact.email`).
    pub email: Option<String>,

    /// Document version (`info.version`).
    pub version: String,

    /// Target servers. At least one is required.
    pub servers: Vec<ServerConfig>,

    /// `Service.Method` → `"<verb> <path>"` route overrides.
    pub routes: RouteTable,

    /// Keep proto field names as declared instead of their JSON names.
    pub keep_case: bool,

    /// Fall back to `google.api.http` annotations for methods without an override.
    pub http_annotations: bool,
}

/// One `servers[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server URL. Required.
    pub url: String,
    /// Optional human-readable description.
    pub description: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            email: None,
            version: DEFAULT_VERSION.to_string(),
            servers: Vec::new(),
            routes: RouteTable::new(),
            keep_case: true,
            http_annotations: false,
        }
    }
}

impl ProjectConfig {
    /// Config with a title and defaults for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Load config from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file.
    ///
    /// Any other extension is parsed as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            toml::from_str(&content)?
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        Ok(config)
    }

    /// Check the fields the generator relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the title is empty, no server is
    /// configured, or a server has an empty URL.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(Error::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.title.trim().is_empty() {
            return invalid(r#""title" is required"#);
        }
        if self.servers.is_empty() {
            return invalid(r#""servers" must be a non-empty array"#);
        }
        if self.servers.iter().any(|s| s.url.trim().is_empty()) {
            return invalid(r#""servers[].url" is required"#);
        }
        Ok(())
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the contact email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the document version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Append a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<&str>) -> Self {
        self.servers.push(ServerConfig {
            url: url.into(),
            description: description.map(ToString::to_string),
        });
        self
    }

    /// Add (or replace) a route override, e.g. `("User.getUser", "get /users/:id")`.
    #[must_use]
    pub fn route(mut self, method: impl Into<String>, route: impl Into<String>) -> Self {
        self.routes.insert(method.into(), route.into());
        self
    }

    /// Keep proto field names as declared.
    #[must_use]
    pub fn keep_case(mut self, enabled: bool) -> Self {
        self.keep_case = enabled;
        self
    }

    /// Enable or disable `google.api.http` annotation routes.
    #[must_use]
    pub fn http_annotations(mut self, enabled: bool) -> Self {
        self.http_annotations = enabled;
        self
    }
}
