//! Typed error enum for the `proto2oas` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary for richer
//! context messages.

/// Errors produced by `proto2oas` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading config or descriptor files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML config parsing failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TOML config parsing failure.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Proto `FileDescriptorSet` decoding failure.
    #[error("failed to decode proto descriptor: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// Generation options violate the caller contract (missing title, servers, …).
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What is wrong with the config.
        reason: String,
    },

    /// A route override is not of the form `"<verb> <path>"` with a known verb.
    #[error("invalid route for '{method}': '{route}'; expected '<verb> <path>', e.g. 'get /users/:id'")]
    InvalidRoute {
        /// The `Service.Method` key of the override.
        method: String,
        /// The offending override value.
        route: String,
    },

    /// A type reference could not be resolved to a message or enum.
    #[error("unresolvable type reference '{type_name}' in '{scope}'")]
    UnresolvedType {
        /// The type reference as written on the field or method.
        type_name: String,
        /// Fully-qualified name of the scope the lookup started from.
        scope: String,
    },

    /// A method request/response type resolved to something other than a message.
    #[error("'{type_name}' is not a message type")]
    NotAMessage {
        /// The type reference as written on the method.
        type_name: String,
    },

    /// A route path parameter has no same-named field on the request message.
    #[error(
        "path parameter '{param}' of route '{route}' has no matching field on request message \
         '{message}'; check the routes config"
    )]
    UnknownPathParam {
        /// The placeholder name extracted from the route template.
        param: String,
        /// The resolved route template.
        route: String,
        /// Fully-qualified request message name.
        message: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
