//! Top-level document skeleton.

use indexmap::IndexMap;

use crate::config::ProjectConfig;
use crate::openapi::{
    Components, Contact, ExternalDocs, Info, License, OpenApiDocument, Server, Tag,
    OPENAPI_VERSION,
};
use crate::schema::{NodeId, SchemaTree};

/// Title used when the config leaves it empty.
const FALLBACK_TITLE: &str = "Open API Specification";

/// Allocate an empty document carrying the configured metadata.
///
/// `tags`, `paths` and `components.schemas` start empty and are filled by the
/// traversal.
#[must_use]
pub fn skeleton(config: &ProjectConfig) -> OpenApiDocument {
    let title = if config.title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        config.title.clone()
    };
    let contact = config
        .email
        .as_ref()
        .filter(|email| !email.is_empty())
        .map(|email| Contact {
            email: email.clone(),
        });

    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title,
            description: config.description.clone().unwrap_or_default(),
            terms_of_service: String::new(),
            contact,
            license: License {
                name: "Apache 2.0".to_string(),
                url: "http://www.apache.org/licenses/LICENSE-2.0.html".to_string(),
            },
            version: config.version.clone(),
        },
        external_docs: ExternalDocs::default(),
        servers: config
            .servers
            .iter()
            .map(|s| Server {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect(),
        tags: Vec::new(),
        paths: IndexMap::new(),
        components: Components::default(),
    }
}

/// Tag for the service at `id`: its qualified name and comment.
#[must_use]
pub fn service_tag(tree: &SchemaTree, id: NodeId) -> Tag {
    Tag {
        name: tree.qualified_name(id),
        description: tree.node(id).comment().unwrap_or_default().to_string(),
        external_docs: ExternalDocs::default(),
    }
}
