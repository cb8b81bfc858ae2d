//! Resolved protobuf schema tree consumed by the generator.
//!
//! The tree is an arena of [`Node`]s addressed by [`NodeId`]. Ownership flows
//! from the root down through `children`; the `parent` link is a plain index
//! used for namespace and scope lookups only.
//!
//! Trees are normally produced by [`load_descriptor_set`](crate::load_descriptor_set),
//! but can be assembled by hand:
//!
//! ```
//! use proto2oas::schema::{Field, Message, NodeKind, SchemaTree};
//!
//! let mut tree = SchemaTree::new();
//! let pkg = tree.namespace(tree.root(), "pet.v1");
//! let pet = tree.insert(
//!     pkg,
//!     "Pet",
//!     NodeKind::Message(Message::new().field(Field::new("name", "string").required())),
//! );
//! assert_eq!(tree.qualified_name(pet), "pet.v1.Pet");
//! ```

use serde_json::Value;

/// Index of a node inside its [`SchemaTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One named element of the schema: a package segment, message, enum or service.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    comment: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    /// Local (unqualified) name. Empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Doc comment from the proto source, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Enclosing node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Nested nodes in declaration order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// What this node describes.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// Node variants. Messages may nest further messages and enums.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A package segment (or the anonymous root).
    Namespace,
    /// A message type.
    Message(Message),
    /// An enum type.
    Enum(Enum),
    /// An RPC service.
    Service(Service),
}

/// A message type and its fields in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Declared fields.
    pub fields: Vec<Field>,
}

impl Message {
    /// Empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Find a field by its (possibly case-converted) name.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Cardinality of a message field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldRule {
    /// Plain (optional or required) field.
    #[default]
    Singular,
    /// `repeated` field.
    Repeated,
    /// `map<key_type, type_name>` field.
    Map {
        /// Map key keyword (`string`, `int64`, …).
        key_type: String,
    },
}

/// A message field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name as exposed in JSON.
    pub name: String,
    /// Scalar keyword (`int32`, `string`, `Timestamp`, …) or a type reference,
    /// either relative (`Category`) or dotted (`pet.v1.Category`). For map
    /// fields this is the value type.
    pub type_name: String,
    /// Cardinality.
    pub rule: FieldRule,
    /// proto2 `required` label.
    pub required: bool,
    /// Typed literal default (`[default = ...]`).
    pub default: Option<Value>,
    /// Doc comment.
    pub comment: Option<String>,
}

impl Field {
    /// Singular, optional field without default or comment.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            rule: FieldRule::Singular,
            required: false,
            default: None,
            comment: None,
        }
    }

    /// Mark as `repeated`.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.rule = FieldRule::Repeated;
        self
    }

    /// Turn into a map keyed by `key_type`; the field type becomes the value type.
    #[must_use]
    pub fn map(mut self, key_type: impl Into<String>) -> Self {
        self.rule = FieldRule::Map {
            key_type: key_type.into(),
        };
        self
    }

    /// Mark as `required`.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attach a doc comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// An enum and its values in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Enum {
    /// Declared values.
    pub values: Vec<EnumValue>,
}

impl Enum {
    /// Enum without values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
            comment: None,
        });
        self
    }

    /// Append a value with a doc comment.
    #[must_use]
    pub fn value_with_comment(
        mut self,
        name: impl Into<String>,
        number: i32,
        comment: impl Into<String>,
    ) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
            comment: Some(comment.into()),
        });
        self
    }
}

/// A symbolic enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Symbolic name (`ACTIVE`).
    pub name: String,
    /// Wire value.
    pub number: i32,
    /// Doc comment.
    pub comment: Option<String>,
}

/// An RPC service and its methods in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Service {
    /// Declared methods.
    pub methods: Vec<Method>,
}

impl Service {
    /// Service without methods.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }
}

/// A unary RPC method.
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name (`getPet`).
    pub name: String,
    /// Request message reference.
    pub request_type: String,
    /// Response message reference.
    pub response_type: String,
    /// Doc comment.
    pub comment: Option<String>,
    /// `google.api.http` binding declared on the method, if any.
    pub http: Option<HttpBinding>,
}

impl Method {
    /// Method without comment or HTTP binding.
    pub fn new(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            request_type: request_type.into(),
            response_type: response_type.into(),
            comment: None,
            http: None,
        }
    }

    /// Attach a doc comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach a `google.api.http` binding.
    #[must_use]
    pub fn http(mut self, verb: impl Into<String>, template: impl Into<String>) -> Self {
        self.http = Some(HttpBinding {
            verb: verb.into(),
            template: template.into(),
        });
        self
    }
}

/// HTTP verb and `{param}`-style template from a `google.api.http` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBinding {
    /// Lower-case verb.
    pub verb: String,
    /// Path template, e.g. `/v1/pets/{id}`.
    pub template: String,
}

/// Arena holding the whole schema, rooted at an anonymous namespace.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    nodes: Vec<Node>,
}

impl Default for SchemaTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaTree {
    /// Tree containing only the anonymous root namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                comment: None,
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Namespace,
            }],
        }
    }

    /// The root namespace.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Add `kind` named `name` as the last child of `parent`.
    pub fn insert(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            comment: None,
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set (or replace) the doc comment of a node.
    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) {
        self.nodes[id.0].comment = Some(comment.into());
    }

    /// Namespace node for a dotted package below `parent`, creating missing
    /// segments. An empty package yields `parent` itself.
    pub fn namespace(&mut self, parent: NodeId, package: &str) -> NodeId {
        package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(parent, |scope, segment| {
                let existing = self.children_named(scope, segment).find(|&id| {
                    matches!(self.node(id).kind, NodeKind::Namespace)
                });
                match existing {
                    Some(id) => id,
                    None => self.insert(scope, segment, NodeKind::Namespace),
                }
            })
    }

    /// Dotted prefix formed by the names of all named ancestors, outermost
    /// first, each followed by `.`; empty for top-level nodes.
    ///
    /// The walk stops at the root or at the first anonymous ancestor.
    #[must_use]
    pub fn namespace_prefix(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            let node = self.node(parent);
            if node.name.is_empty() {
                break;
            }
            segments.push(node.name.as_str());
            current = node.parent;
        }

        segments.iter().rev().fold(String::new(), |mut prefix, segment| {
            prefix.push_str(segment);
            prefix.push('.');
            prefix
        })
    }

    /// Namespace prefix plus local name, e.g. `pet.v1.Pet.Status`.
    #[must_use]
    pub fn qualified_name(&self, id: NodeId) -> String {
        format!("{}{}", self.namespace_prefix(id), self.node(id).name)
    }

    /// Fully-qualified name with the leading separator, e.g. `.pet.v1.Pet`.
    #[must_use]
    pub fn full_name(&self, id: NodeId) -> String {
        format!(".{}", self.qualified_name(id))
    }

    /// Resolve a message or enum reference as seen from `scope`.
    ///
    /// A leading `.` makes the reference absolute. Otherwise the dotted path is
    /// tried relative to `scope`, then to each enclosing scope up to the root.
    #[must_use]
    pub fn lookup(&self, type_ref: &str, scope: NodeId) -> Option<NodeId> {
        if let Some(absolute) = type_ref.strip_prefix('.') {
            return self.resolve_path(self.root(), absolute);
        }

        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(found) = self.resolve_path(id, type_ref) {
                return Some(found);
            }
            current = self.node(id).parent;
        }
        None
    }

    /// Walk `path` segment by segment below `scope`; the final node must be a
    /// message or enum.
    fn resolve_path(&self, scope: NodeId, path: &str) -> Option<NodeId> {
        let mut segments = path.split('.').peekable();
        let mut current = scope;

        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            current = self.children_named(current, segment).find(|&id| {
                let kind = &self.node(id).kind;
                if is_last {
                    matches!(kind, NodeKind::Message(_) | NodeKind::Enum(_))
                } else {
                    matches!(kind, NodeKind::Namespace | NodeKind::Message(_))
                }
            })?;
        }

        Some(current)
    }

    fn children_named<'a>(
        &'a self,
        scope: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.node(scope)
            .children
            .iter()
            .copied()
            .filter(move |&id| self.node(id).name == name)
    }
}
