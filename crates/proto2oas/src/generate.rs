//! Schema tree → `OpenAPI` document traversal.

use std::collections::HashSet;

use crate::components::{enum_component, object_component};
use crate::config::ProjectConfig;
use crate::document::{service_tag, skeleton};
use crate::error::Result;
use crate::load::load_descriptor_set;
use crate::openapi::{OpenApiDocument, Schema};
use crate::paths::{merge_service_paths, RouteOptions};
use crate::schema::{NodeId, NodeKind, SchemaTree};

/// Generate the document for every message, enum and service in `tree`.
///
/// Nodes are visited depth-first in declaration order, parents before
/// children. Components and paths produced later replace earlier ones under
/// the same key without changing its position.
///
/// The config is used as-is; call [`ProjectConfig::validate`] first when it
/// comes from user input.
///
/// # Errors
///
/// Returns an error if a route override is malformed or a method's types or
/// path parameters cannot be resolved.
pub fn generate(tree: &SchemaTree, config: &ProjectConfig) -> Result<OpenApiDocument> {
    let mut doc = skeleton(config);
    let mut used_routes = HashSet::new();
    let options = RouteOptions {
        routes: &config.routes,
        http_annotations: config.http_annotations,
    };

    visit(tree, tree.root(), options, &mut doc, &mut used_routes)?;

    for key in config.routes.keys() {
        if !used_routes.contains(key.as_str()) {
            tracing::warn!(route = %key, "route override matches no service method");
        }
    }

    tracing::debug!(
        schemas = doc.components.schemas.len(),
        paths = doc.paths.len(),
        tags = doc.tags.len(),
        "generated OpenAPI document",
    );
    Ok(doc)
}

/// Validate `config`, load a binary `FileDescriptorSet` and generate.
///
/// # Errors
///
/// Returns an error if the config is invalid, the descriptor bytes cannot be
/// decoded, or [`generate`] fails.
pub fn generate_from_descriptor(bytes: &[u8], config: &ProjectConfig) -> Result<OpenApiDocument> {
    config.validate()?;
    let tree = load_descriptor_set(bytes, config.keep_case)?;
    generate(&tree, config)
}

fn visit(
    tree: &SchemaTree,
    id: NodeId,
    options: RouteOptions<'_>,
    doc: &mut OpenApiDocument,
    used_routes: &mut HashSet<String>,
) -> Result<()> {
    match tree.node(id).kind() {
        NodeKind::Namespace => {}
        NodeKind::Message(message) => {
            let (name, schema) = object_component(tree, id, message)?;
            add_component(doc, name, schema);
        }
        NodeKind::Enum(enumeration) => {
            let (name, schema) = enum_component(tree, id, enumeration);
            add_component(doc, name, schema);
        }
        NodeKind::Service(service) => {
            doc.tags.push(service_tag(tree, id));
            merge_service_paths(tree, id, service, options, &mut doc.paths)?;

            let service_name = tree.node(id).name();
            used_routes.extend(
                service
                    .methods
                    .iter()
                    .map(|m| format!("{service_name}.{}", m.name)),
            );
        }
    }

    for &child in tree.node(id).children() {
        visit(tree, child, options, doc, used_routes)?;
    }
    Ok(())
}

fn add_component(doc: &mut OpenApiDocument, name: String, schema: Schema) {
    if doc.components.schemas.contains_key(&name) {
        tracing::debug!(component = %name, "component replaced by later definition");
    }
    doc.components.schemas.insert(name, schema);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::schema::{Enum, Field, Message, Method, Service};

    fn config() -> ProjectConfig {
        ProjectConfig::new("Pets").server("http://localhost:8080", None)
    }

    #[test]
    fn components_follow_preorder() {
        let mut tree = SchemaTree::new();
        let pkg = tree.namespace(tree.root(), "pet");
        let pet = tree.insert(
            pkg,
            "Pet",
            NodeKind::Message(Message::new().field(Field::new("status", "Status"))),
        );
        tree.insert(pet, "Status", NodeKind::Enum(Enum::new().value("SOLD", 1)));
        tree.insert(pkg, "Owner", NodeKind::Message(Message::new()));

        let doc = generate(&tree, &config()).unwrap();
        assert_eq!(
            doc.components.schemas.keys().collect::<Vec<_>>(),
            vec!["pet.Pet", "pet.Pet.Status", "pet.Owner"]
        );
    }

    #[test]
    fn duplicate_component_keeps_first_position() {
        let mut tree = SchemaTree::new();
        tree.insert(
            tree.root(),
            "Pet",
            NodeKind::Message(Message::new().field(Field::new("a", "string"))),
        );
        tree.insert(tree.root(), "Owner", NodeKind::Message(Message::new()));
        // Anonymous scope: its Pet is also named `Pet`.
        let anon = tree.insert(tree.root(), "", NodeKind::Namespace);
        tree.insert(
            anon,
            "Pet",
            NodeKind::Message(Message::new().field(Field::new("b", "string"))),
        );

        let doc = generate(&tree, &config()).unwrap();
        let keys: Vec<_> = doc.components.schemas.keys().collect();
        assert_eq!(keys, vec!["Pet", "Owner"]);
        let props = doc.components.schemas["Pet"].properties.as_ref().unwrap();
        assert!(props.contains_key("b"));
    }

    #[test]
    fn services_add_tags_and_paths() {
        let mut tree = SchemaTree::new();
        tree.insert(
            tree.root(),
            "Pet",
            NodeKind::Message(Message::new().field(Field::new("id", "int32"))),
        );
        let svc = tree.insert(
            tree.root(),
            "PetService",
            NodeKind::Service(Service::new().method(Method::new("getPet", "Pet", "Pet"))),
        );
        tree.set_comment(svc, "Pets");

        let doc = generate(&tree, &config()).unwrap();
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.tags[0].name, "PetService");
        assert_eq!(doc.tags[0].description, "Pets");
        assert!(doc.paths["/PetService/getPet"].contains_key("post"));
    }

    #[test]
    fn unused_route_keys_are_not_errors() {
        let tree = SchemaTree::new();
        let config = config().route("Nope.missing", "get /nope");
        let doc = generate(&tree, &config).unwrap();
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn descriptor_entry_point_validates_config() {
        let result = generate_from_descriptor(&[], &ProjectConfig::new("Pets"));
        assert!(matches!(result, Err(crate::Error::InvalidConfig { .. })));
    }

    #[test]
    fn empty_descriptor_set_yields_skeleton() {
        let doc = generate_from_descriptor(&[], &config()).unwrap();
        assert!(doc.components.schemas.is_empty());
        assert!(doc.tags.is_empty());
        assert_eq!(doc.info.title, "Pets");
    }
}
