//! Protobuf field type → `OpenAPI` schema mapping.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::openapi::{Schema, SchemaType};
use crate::schema::{NodeId, SchemaTree};

/// Map a scalar keyword to its `(type, format)` pair.
///
/// `Timestamp` is the well-known `google.protobuf.Timestamp`, rendered as a date.
fn scalar(type_name: &str) -> Option<(SchemaType, Option<&'static str>)> {
    Some(match type_name {
        "int32" | "sint32" | "sfixed32" => (SchemaType::Integer, Some("int32")),
        "uint32" | "int64" | "uint64" | "sint64" | "fixed32" | "fixed64" | "sfixed64" => {
            (SchemaType::Integer, Some("int64"))
        }
        "float" => (SchemaType::Number, Some("float")),
        "double" => (SchemaType::Number, Some("double")),
        "bool" => (SchemaType::Boolean, None),
        "bytes" => (SchemaType::String, Some("binary")),
        "Timestamp" => (SchemaType::String, Some("date")),
        "string" => (SchemaType::String, None),
        _ => return None,
    })
}

/// JavaScript-style truthiness of a default literal.
///
/// `0`, `false`, `""` and `null` are falsy and never emitted as defaults.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Schema for a field of type `type_name` declared inside `scope`.
///
/// Scalars become inline primitives carrying `default` when it is truthy.
/// Anything else becomes a `$ref`: dotted names are referenced literally
/// (minus a leading `.`), bare names are resolved from `scope` and qualified
/// with the target's namespace.
///
/// # Errors
///
/// Returns [`Error::UnresolvedType`] if a bare name matches no message or enum.
pub fn map_type(
    tree: &SchemaTree,
    scope: NodeId,
    type_name: &str,
    default: Option<&Value>,
) -> Result<Schema> {
    if let Some((schema_type, format)) = scalar(type_name) {
        let mut schema = Schema::primitive(schema_type, format);
        schema.default = default.filter(|v| is_truthy(v)).cloned();
        return Ok(schema);
    }

    if type_name.contains('.') {
        return Ok(Schema::reference(
            type_name.strip_prefix('.').unwrap_or(type_name),
        ));
    }

    let target = tree
        .lookup(type_name, scope)
        .ok_or_else(|| Error::UnresolvedType {
            type_name: type_name.to_string(),
            scope: tree.full_name(scope),
        })?;

    Ok(Schema::reference(tree.qualified_name(target)))
}
