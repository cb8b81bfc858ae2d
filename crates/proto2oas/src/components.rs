//! Message and enum → `components.schemas` entries.

use indexmap::IndexMap;

use crate::error::Result;
use crate::openapi::{Schema, SchemaType};
use crate::schema::{Enum, Field, FieldRule, Message, NodeId, SchemaTree};
use crate::types::map_type;

/// Build the object schema for the message at `id`, keyed by its qualified name.
///
/// A message without fields yields an empty `{}` schema so that references to
/// it still resolve.
///
/// # Errors
///
/// Returns an error if a field's bare type reference cannot be resolved.
pub fn object_component(
    tree: &SchemaTree,
    id: NodeId,
    message: &Message,
) -> Result<(String, Schema)> {
    let name = tree.qualified_name(id);
    if message.fields.is_empty() {
        return Ok((name, Schema::default()));
    }

    let mut properties = IndexMap::with_capacity(message.fields.len());
    for field in &message.fields {
        properties.insert(field.name.clone(), field_schema(tree, id, field)?);
    }

    let required = message
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.clone())
        .collect();

    let schema = Schema {
        schema_type: Some(SchemaType::Object),
        description: Some(tree.node(id).comment().unwrap_or_default().to_string()),
        properties: Some(properties),
        required,
        ..Schema::default()
    };
    Ok((name, schema))
}

/// Property schema for one field: maps wrap the value type in
/// `additionalProperties`, repeated fields wrap it in `items`.
fn field_schema(tree: &SchemaTree, scope: NodeId, field: &Field) -> Result<Schema> {
    let data_type = map_type(tree, scope, &field.type_name, field.default.as_ref())?;
    let description = Some(field.comment.clone().unwrap_or_default());

    Ok(match field.rule {
        FieldRule::Map { .. } => Schema {
            schema_type: Some(SchemaType::Object),
            description,
            additional_properties: Some(Box::new(data_type)),
            ..Schema::default()
        },
        FieldRule::Repeated => Schema {
            schema_type: Some(SchemaType::Array),
            description,
            items: Some(Box::new(data_type)),
            ..Schema::default()
        },
        // Referenced components carry their own description.
        FieldRule::Singular if data_type.is_reference() => data_type,
        FieldRule::Singular => Schema {
            description,
            ..data_type
        },
    })
}

/// Build the integer schema for the enum at `id`, keyed by its qualified name.
///
/// The description is the enum comment (or `definitions`) followed by one
/// legend line per value: `` * `0` - ACTIVE, comment``.
#[must_use]
pub fn enum_component(tree: &SchemaTree, id: NodeId, enumeration: &Enum) -> (String, Schema) {
    let legend = enumeration
        .values
        .iter()
        .map(|v| {
            format!(
                " * `{}` - {}, {}",
                v.number,
                v.name,
                v.comment.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let heading = tree.node(id).comment().unwrap_or("definitions");

    let schema = Schema {
        enum_values: Some(enumeration.values.iter().map(|v| v.number).collect()),
        description: Some(format!("{heading}\n {legend}")),
        ..Schema::primitive(SchemaType::Integer, Some("int64"))
    };
    (tree.qualified_name(id), schema)
}
