//! `FileDescriptorSet` → [`SchemaTree`] conversion.
//!
//! Accepts the binary descriptor set emitted by
//! `protoc --include_imports --include_source_info --descriptor_set_out=…` or
//! `buf build --as-file-descriptor-set`. Without `--include_source_info` the
//! tree is built the same way but carries no comments.
//!
//! Normalizations applied while loading:
//! - synthetic `*Entry` messages are folded into map fields on their owner;
//! - `.google.protobuf.Timestamp` becomes the `Timestamp` keyword;
//! - proto2 `[default = …]` literals are typed by field kind;
//! - field names switch to their JSON names unless `keep_case` is set.

use prost::Message as _;
use serde_json::Value;

use crate::descriptor::{
    self, field_type, label, source_path, DescriptorProto, EnumDescriptorProto,
    FieldDescriptorProto, FileDescriptorSet, ServiceDescriptorProto, SourceCodeInfo,
};

use crate::error::Result;
use crate::schema::{
    Enum, EnumValue, Field, FieldRule, Message, Method, NodeId, NodeKind, SchemaTree, Service,
};

const TIMESTAMP_TYPE: &str = ".google.protobuf.Timestamp";

/// Decode descriptor bytes and build the schema tree.
///
/// # Errors
///
/// Returns [`Error::ProtoDecode`](crate::Error::ProtoDecode) if the bytes are
/// not a valid `FileDescriptorSet`.
pub fn load_descriptor_set(bytes: &[u8], keep_case: bool) -> Result<SchemaTree> {
    let fdset = FileDescriptorSet::decode(bytes)?;
    Ok(build_tree(&fdset, keep_case))
}

/// Build the schema tree from an already decoded descriptor set.
///
/// Files sharing a package share its namespace nodes. Within a file, messages
/// come first, then enums, then services, each in declaration order.
#[must_use]
pub fn build_tree(fdset: &FileDescriptorSet, keep_case: bool) -> SchemaTree {
    let mut tree = SchemaTree::new();

    for file in &fdset.file {
        let root = tree.root();
        let package = tree.namespace(root, file.package.as_deref().unwrap_or(""));
        let mut loader = FileLoader {
            tree: &mut tree,
            comments: file.source_code_info.as_ref(),
            keep_case,
        };

        for (i, msg) in file.message_type.iter().enumerate() {
            loader.add_message(package, msg, &[source_path::MESSAGE_TYPE, index(i)]);
        }
        for (i, enumeration) in file.enum_type.iter().enumerate() {
            loader.add_enum(package, enumeration, &[source_path::ENUM_TYPE, index(i)]);
        }
        for (i, service) in file.service.iter().enumerate() {
            loader.add_service(package, service, &[source_path::SERVICE, index(i)]);
        }

        tracing::debug!(
            file = file.name.as_deref().unwrap_or("<unnamed>"),
            messages = file.message_type.len(),
            enums = file.enum_type.len(),
            services = file.service.len(),
            "loaded proto file",
        );
    }

    tree
}

/// Descriptor indices are `i32` in source paths.
fn index(i: usize) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX)
}

fn child_path(path: &[i32], kind: i32, i: usize) -> Vec<i32> {
    let mut child = Vec::with_capacity(path.len() + 2);
    child.extend_from_slice(path);
    child.push(kind);
    child.push(index(i));
    child
}

struct FileLoader<'a> {
    tree: &'a mut SchemaTree,
    comments: Option<&'a SourceCodeInfo>,
    keep_case: bool,
}

impl FileLoader<'_> {
    fn comment(&self, path: &[i32]) -> Option<String> {
        self.comments
            .and_then(|info| info.comment(path))
            .map(ToString::to_string)
    }

    fn insert(&mut self, parent: NodeId, name: &str, kind: NodeKind, path: &[i32]) -> NodeId {
        let id = self.tree.insert(parent, name, kind);
        if let Some(comment) = self.comment(path) {
            self.tree.set_comment(id, comment);
        }
        id
    }

    fn add_message(&mut self, parent: NodeId, msg: &DescriptorProto, path: &[i32]) {
        let fields = msg
            .field
            .iter()
            .enumerate()
            .map(|(i, field)| self.field(msg, field, &child_path(path, source_path::FIELD, i)))
            .collect();

        let name = msg.name.as_deref().unwrap_or("");
        let id = self.insert(parent, name, NodeKind::Message(Message { fields }), path);

        for (i, nested) in msg.nested_type.iter().enumerate() {
            if nested.is_map_entry() {
                continue;
            }
            self.add_message(id, nested, &child_path(path, source_path::NESTED_TYPE, i));
        }
        for (i, enumeration) in msg.enum_type.iter().enumerate() {
            self.add_enum(id, enumeration, &child_path(path, source_path::NESTED_ENUM, i));
        }
    }

    fn field(&self, owner: &DescriptorProto, field: &FieldDescriptorProto, path: &[i32]) -> Field {
        let proto_name = field.name.as_deref().unwrap_or("");
        let name = if self.keep_case {
            proto_name.to_string()
        } else {
            field
                .json_name
                .clone()
                .unwrap_or_else(|| snake_to_lower_camel(proto_name))
        };

        let (type_name, rule) = match map_entry(owner, field) {
            Some(entry) => {
                let key = entry.field.iter().find(|f| f.number == Some(1));
                let value = entry.field.iter().find(|f| f.number == Some(2));
                (
                    value.map_or_else(|| "string".to_string(), field_type_name),
                    FieldRule::Map {
                        key_type: key.map_or_else(|| "string".to_string(), field_type_name),
                    },
                )
            }
            None if field.label == Some(label::REPEATED) => {
                (field_type_name(field), FieldRule::Repeated)
            }
            None => (field_type_name(field), FieldRule::Singular),
        };

        Field {
            name,
            type_name,
            rule,
            required: field.label == Some(label::REQUIRED),
            default: field.default_value.as_deref().map(|raw| typed_default(field, raw)),
            comment: self.comment(path),
        }
    }

    fn add_enum(&mut self, parent: NodeId, enumeration: &EnumDescriptorProto, path: &[i32]) {
        let values = enumeration
            .value
            .iter()
            .enumerate()
            .map(|(i, value)| EnumValue {
                name: value.name.clone().unwrap_or_default(),
                number: value.number.unwrap_or_default(),
                comment: self.comment(&child_path(path, source_path::ENUM_VALUE, i)),
            })
            .collect();

        let name = enumeration.name.as_deref().unwrap_or("");
        self.insert(parent, name, NodeKind::Enum(Enum { values }), path);
    }

    fn add_service(&mut self, parent: NodeId, service: &ServiceDescriptorProto, path: &[i32]) {
        let methods = service
            .method
            .iter()
            .enumerate()
            .map(|(i, method)| {
                let mut converted = Method::new(
                    method.name.as_deref().unwrap_or(""),
                    method.input_type.as_deref().unwrap_or(""),
                    method.output_type.as_deref().unwrap_or(""),
                );
                converted.comment = self.comment(&child_path(path, source_path::METHOD, i));
                if let Some((verb, template)) = descriptor::extract_http_pattern(method) {
                    let template = if self.keep_case {
                        template.to_string()
                    } else {
                        convert_path_template_to_camel(template)
                    };
                    converted = converted.http(verb, template);
                }
                converted
            })
            .collect();

        let name = service.name.as_deref().unwrap_or("");
        self.insert(parent, name, NodeKind::Service(Service { methods }), path);
    }
}

/// The map-entry message backing `field`, if `field` is a `map<K, V>`.
fn map_entry<'m>(
    owner: &'m DescriptorProto,
    field: &FieldDescriptorProto,
) -> Option<&'m DescriptorProto> {
    if field.label != Some(label::REPEATED) || field.r#type != Some(field_type::MESSAGE) {
        return None;
    }
    let entry_name = field.type_name.as_deref()?.rsplit('.').next()?;
    owner
        .nested_type
        .iter()
        .find(|nested| nested.is_map_entry() && nested.name.as_deref() == Some(entry_name))
}

/// Scalar keyword or type reference for a field.
fn field_type_name(field: &FieldDescriptorProto) -> String {
    let type_id = field.r#type.unwrap_or(field_type::STRING);
    if let Some(keyword) = field_type::keyword(type_id) {
        return keyword.to_string();
    }

    match field.type_name.as_deref() {
        Some(TIMESTAMP_TYPE) => "Timestamp".to_string(),
        Some(type_name) => type_name.to_string(),
        None => "string".to_string(),
    }
}

/// Convert a proto2 default literal to JSON according to the field type.
///
/// Literals that don't parse (and non-finite floats) are kept as strings.
fn typed_default(field: &FieldDescriptorProto, raw: &str) -> Value {
    let parsed = match field.r#type.unwrap_or_default() {
        field_type::BOOL => raw.parse::<bool>().ok().map(Value::Bool),
        field_type::INT32
        | field_type::INT64
        | field_type::SINT32
        | field_type::SINT64
        | field_type::SFIXED32
        | field_type::SFIXED64 => raw.parse::<i64>().ok().map(Value::from),
        field_type::UINT32 | field_type::UINT64 | field_type::FIXED32 | field_type::FIXED64 => {
            raw.parse::<u64>().ok().map(Value::from)
        }
        field_type::FLOAT | field_type::DOUBLE => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

/// `device_id` → `deviceId`, matching protoc's default JSON names.
pub(crate) fn snake_to_lower_camel(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert `{field_name}` template variables to camelCase JSON names.
fn convert_path_template_to_camel(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let end = start + end;

        result.push_str(&rest[..=start]);
        let var = &rest[start + 1..end];

        match var.split_once('=') {
            Some((name, pattern)) => {
                result.push_str(&snake_to_lower_camel(name));
                result.push('=');
                result.push_str(pattern);
            }
            None => result.push_str(&snake_to_lower_camel(var)),
        }

        result.push('}');
        rest = &rest[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::descriptor::{
        EnumValueDescriptorProto, FileDescriptorProto, Location, MessageOptions,
        MethodDescriptorProto,
    };

    use super::*;
    use crate::Error;

    fn field(name: &str, number: i32, ty: i32) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(label::OPTIONAL),
            r#type: Some(ty),
            ..FieldDescriptorProto::default()
        }
    }

    fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            type_name: Some(type_name.to_string()),
            ..field(name, number, field_type::MESSAGE)
        }
    }

    fn labels_entry() -> DescriptorProto {
        DescriptorProto {
            name: Some("LabelsEntry".to_string()),
            field: vec![
                field("key", 1, field_type::STRING),
                field("value", 2, field_type::INT32),
            ],
            options: Some(MessageOptions {
                map_entry: Some(true),
            }),
            ..DescriptorProto::default()
        }
    }

    fn pet_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("pet.proto".to_string()),
            package: Some("pet.v1".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Pet".to_string()),
                field: vec![
                    FieldDescriptorProto {
                        label: Some(label::REQUIRED),
                        ..field("pet_id", 1, field_type::INT64)
                    },
                    FieldDescriptorProto {
                        label: Some(label::REPEATED),
                        ..field("photo_urls", 2, field_type::STRING)
                    },
                    FieldDescriptorProto {
                        label: Some(label::REPEATED),
                        ..message_field("labels", 3, ".pet.v1.Pet.LabelsEntry")
                    },
                    message_field("born_at", 4, TIMESTAMP_TYPE),
                    FieldDescriptorProto {
                        r#type: Some(field_type::ENUM),
                        ..message_field("status", 5, ".pet.v1.Pet.Status")
                    },
                    FieldDescriptorProto {
                        default_value: Some("3".to_string()),
                        json_name: Some("legCount".to_string()),
                        ..field("leg_count", 6, field_type::UINT32)
                    },
                ],
                nested_type: vec![labels_entry()],
                enum_type: vec![EnumDescriptorProto {
                    name: Some("Status".to_string()),
                    value: vec![
                        EnumValueDescriptorProto {
                            name: Some("AVAILABLE".to_string()),
                            number: Some(0),
                        },
                        EnumValueDescriptorProto {
                            name: Some("SOLD".to_string()),
                            number: Some(1),
                        },
                    ],
                }],
                options: None,
            }],
            enum_type: vec![],
            service: vec![ServiceDescriptorProto {
                name: Some("PetService".to_string()),
                method: vec![MethodDescriptorProto {
                    name: Some("GetPet".to_string()),
                    input_type: Some(".pet.v1.Pet".to_string()),
                    output_type: Some(".pet.v1.Pet".to_string()),
                    options: Some(descriptor::MethodOptions {
                        http: Some(descriptor::HttpRule {
                            pattern: Some(descriptor::HttpPattern::Get(
                                "/v1/pets/{pet_id}".to_string(),
                            )),
                            body: String::new(),
                        }),
                    }),
                }],
            }],
            source_code_info: Some(SourceCodeInfo {
                location: vec![
                    Location {
                        path: vec![source_path::MESSAGE_TYPE, 0],
                        leading_comments: Some(" A pet.\n".to_string()),
                        trailing_comments: None,
                    },
                    Location {
                        path: vec![source_path::MESSAGE_TYPE, 0, source_path::FIELD, 0],
                        leading_comments: None,
                        trailing_comments: Some(" unique id\n".to_string()),
                    },
                    Location {
                        path: vec![
                            source_path::MESSAGE_TYPE,
                            0,
                            source_path::NESTED_ENUM,
                            0,
                            source_path::ENUM_VALUE,
                            1,
                        ],
                        leading_comments: Some(" gone".to_string()),
                        trailing_comments: None,
                    },
                    Location {
                        path: vec![source_path::SERVICE, 0, source_path::METHOD, 0],
                        leading_comments: Some(" Find a pet.".to_string()),
                        trailing_comments: None,
                    },
                ],
            }),
        }
    }

    fn loaded(keep_case: bool) -> SchemaTree {
        let fdset = FileDescriptorSet {
            file: vec![pet_file()],
        };
        load_descriptor_set(&fdset.encode_to_vec(), keep_case).unwrap()
    }

    fn message<'t>(tree: &'t SchemaTree, name: &str) -> (NodeId, &'t Message) {
        let id = tree.lookup(name, tree.root()).unwrap();
        match tree.node(id).kind() {
            NodeKind::Message(m) => (id, m),
            other => panic!("{name} is not a message: {other:?}"),
        }
    }

    #[test]
    fn builds_package_namespaces_and_nested_nodes() {
        let tree = loaded(true);
        let (pet, _) = message(&tree, ".pet.v1.Pet");
        assert_eq!(tree.qualified_name(pet), "pet.v1.Pet");
        assert_eq!(tree.node(pet).comment(), Some("A pet."));

        // Map entry is folded into its field, so only the enum is nested.
        let nested: Vec<&str> = tree
            .node(pet)
            .children()
            .iter()
            .map(|&id| tree.node(id).name())
            .collect();
        assert_eq!(nested, vec!["Status"]);
    }

    #[test]
    fn converts_field_rules_types_and_defaults() {
        let tree = loaded(true);
        let (_, pet) = message(&tree, ".pet.v1.Pet");
        let by_name = |name: &str| pet.field_named(name).unwrap();

        let id = by_name("pet_id");
        assert!(id.required);
        assert_eq!(id.type_name, "int64");
        assert_eq!(id.comment.as_deref(), Some("unique id"));

        assert_eq!(by_name("photo_urls").rule, FieldRule::Repeated);

        let labels = by_name("labels");
        assert_eq!(
            labels.rule,
            FieldRule::Map {
                key_type: "string".to_string()
            }
        );
        assert_eq!(labels.type_name, "int32");

        assert_eq!(by_name("born_at").type_name, "Timestamp");
        assert_eq!(by_name("status").type_name, ".pet.v1.Pet.Status");
        assert_eq!(by_name("leg_count").default, Some(json!(3)));
    }

    #[test]
    fn json_names_used_unless_keep_case() {
        let tree = loaded(false);
        let (_, pet) = message(&tree, ".pet.v1.Pet");
        let names: Vec<&str> = pet.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["petId", "photoUrls", "labels", "bornAt", "status", "legCount"]
        );
    }

    #[test]
    fn enum_values_keep_order_and_comments() {
        let tree = loaded(true);
        let id = tree.lookup(".pet.v1.Pet.Status", tree.root()).unwrap();
        let NodeKind::Enum(status) = tree.node(id).kind() else {
            panic!("expected enum");
        };
        assert_eq!(status.values.len(), 2);
        assert_eq!(status.values[1].name, "SOLD");
        assert_eq!(status.values[1].comment.as_deref(), Some("gone"));
        assert!(status.values[0].comment.is_none());
    }

    #[test]
    fn services_carry_comments_and_http_bindings() {
        let tree = loaded(false);
        let pkg = tree.node(tree.lookup(".pet.v1.Pet", tree.root()).unwrap()).parent().unwrap();
        let service_id = *tree.node(pkg).children().last().unwrap();
        let NodeKind::Service(service) = tree.node(service_id).kind() else {
            panic!("expected service");
        };

        let method = &service.methods[0];
        assert_eq!(method.comment.as_deref(), Some("Find a pet."));
        assert_eq!(method.request_type, ".pet.v1.Pet");
        let http = method.http.as_ref().unwrap();
        assert_eq!(http.verb, "get");
        assert_eq!(http.template, "/v1/pets/{petId}");
    }

    #[test]
    fn files_sharing_a_package_share_namespaces() {
        let other = FileDescriptorProto {
            name: Some("owner.proto".to_string()),
            package: Some("pet.v1".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Owner".to_string()),
                ..DescriptorProto::default()
            }],
            ..FileDescriptorProto::default()
        };
        let tree = build_tree(
            &FileDescriptorSet {
                file: vec![pet_file(), other],
            },
            true,
        );

        assert_eq!(tree.node(tree.root()).children().len(), 1);
        let owner = tree.lookup("pet.v1.Owner", tree.root()).unwrap();
        assert_eq!(tree.qualified_name(owner), "pet.v1.Owner");
    }

    #[test]
    fn invalid_bytes_are_a_decode_error() {
        let result = load_descriptor_set(&[0xFF, 0xFF, 0xFF], true);
        assert!(matches!(result, Err(Error::ProtoDecode(_))));
    }

    #[test]
    fn typed_defaults_by_field_kind() {
        let of = |ty: i32, raw: &str| typed_default(&field("f", 1, ty), raw);
        assert_eq!(of(field_type::BOOL, "true"), json!(true));
        assert_eq!(of(field_type::SINT32, "-4"), json!(-4));
        assert_eq!(of(field_type::DOUBLE, "1.5"), json!(1.5));
        assert_eq!(of(field_type::DOUBLE, "inf"), json!("inf"));
        assert_eq!(of(field_type::STRING, "kitty"), json!("kitty"));
        assert_eq!(of(field_type::ENUM, "SOLD"), json!("SOLD"));
    }

    #[test]
    fn snake_to_lower_camel_basic() {
        assert_eq!(snake_to_lower_camel("device_id"), "deviceId");
        assert_eq!(snake_to_lower_camel("name"), "name");
        assert_eq!(snake_to_lower_camel("client_version"), "clientVersion");
    }

    #[test]
    fn convert_path_template_to_camel_works() {
        assert_eq!(
            convert_path_template_to_camel("/v1/sessions/{device_id}"),
            "/v1/sessions/{deviceId}"
        );
        assert_eq!(
            convert_path_template_to_camel("/v1/{shelf_name=shelves/*}"),
            "/v1/{shelfName=shelves/*}"
        );
        assert_eq!(convert_path_template_to_camel("/v1/items"), "/v1/items");
    }
}
