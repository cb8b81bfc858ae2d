//! Typed `OpenAPI` 3.0.1 document model.
//!
//! Only the parts of the specification the generator emits are modelled.
//! Maps are [`IndexMap`]s so serialization follows insertion (document)
//! order, and re-inserting an existing key replaces the value in place.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `OpenAPI` version written to every document.
pub const OPENAPI_VERSION: &str = "3.0.1";

/// Prefix of every component `$ref`.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Media type used for request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Path item: HTTP verb → operation.
pub type PathItem = IndexMap<String, Operation>;

/// Root document object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDocument {
    /// Always [`OPENAPI_VERSION`].
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Placeholder external documentation block.
    pub external_docs: ExternalDocs,
    /// Target servers.
    pub servers: Vec<Server>,
    /// One tag per service, in traversal order.
    pub tags: Vec<Tag>,
    /// URL template → path item.
    pub paths: IndexMap<String, PathItem>,
    /// Reusable schemas.
    pub components: Components,
}

impl OpenApiDocument {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a default literal cannot be serialized.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `info` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title.
    pub title: String,
    /// API description.
    pub description: String,
    /// Terms of service URL (emitted empty).
    pub terms_of_service: String,
    /// Contact block, present only when an email is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// License block.
    pub license: License,
    /// Document version.
    pub version: String,
}

/// `info.contact` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact email address.
    pub email: String,
}

/// `info.license` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// License name.
    pub name: String,
    /// License URL.
    pub url: String,
}

/// `externalDocs` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    /// Description.
    pub description: String,
    /// URL.
    pub url: String,
}

/// `servers[]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `tags[]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag name (service qualified name).
    pub name: String,
    /// Service comment.
    pub description: String,
    /// Placeholder external docs.
    pub external_docs: ExternalDocs,
}

/// `components` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Qualified name → schema.
    pub schemas: IndexMap<String, Schema>,
}

/// One HTTP operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Owning service tag.
    pub tags: Vec<String>,
    /// Method comment.
    pub summary: String,
    /// Method qualified name.
    pub operation_id: String,
    /// Query/path parameters, query first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// JSON request body, when the request travels in the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code → response.
    pub responses: IndexMap<String, Response>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// URL template placeholder.
    Path,
}

/// `parameters[]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Description.
    pub description: String,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Value schema.
    pub schema: Schema,
}

/// `requestBody` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request message comment.
    pub description: String,
    /// Media type → body schema.
    pub content: IndexMap<String, MediaType>,
    /// Always `true` for generated bodies.
    pub required: bool,
}

/// Media type object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Body schema.
    pub schema: Schema,
}

/// Response object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response message comment.
    pub description: String,
    /// Media type → body schema; absent for empty responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Build a single-entry `application/json` content map.
pub(crate) fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    IndexMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

/// JSON Schema primitive types used by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `string`
    String,
    /// `boolean`
    Boolean,
    /// `object`
    Object,
    /// `array`
    Array,
}

/// Schema object. An all-`None` schema serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// `$ref` to a component schema.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Primitive type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Format qualifier (`int32`, `date`, …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Default literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Element schema for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for maps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Allowed integer values; set (possibly empty) on enum components only.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<i32>>,
}

impl Schema {
    /// Primitive schema with an optional format.
    #[must_use]
    pub fn primitive(schema_type: SchemaType, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type),
            format: format.map(ToString::to_string),
            ..Self::default()
        }
    }

    /// `$ref` to the component named `qualified_name`.
    pub fn reference(qualified_name: impl AsRef<str>) -> Self {
        Self {
            reference: Some(format!("{SCHEMA_REF_PREFIX}{}", qualified_name.as_ref())),
            ..Self::default()
        }
    }

    /// Whether this is a `$ref` schema.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Component name targeted by `$ref`, if this is a local component reference.
    #[must_use]
    pub fn referenced_component(&self) -> Option<&str> {
        self.reference.as_deref()?.strip_prefix(SCHEMA_REF_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_schema_serializes_to_empty_object() {
        assert_eq!(serde_json::to_value(Schema::default()).unwrap(), json!({}));
    }

    #[test]
    fn reference_schema_round_trips_name() {
        let schema = Schema::reference("pet.v1.Pet");
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({ "$ref": "#/components/schemas/pet.v1.Pet" })
        );
        assert_eq!(schema.referenced_component(), Some("pet.v1.Pet"));
        assert!(schema.is_reference());
    }

    #[test]
    fn parameter_serializes_location_as_in() {
        let param = Parameter {
            name: "userId".to_string(),
            location: ParameterLocation::Path,
            description: String::new(),
            required: true,
            schema: Schema::primitive(SchemaType::String, None),
        };
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({
                "name": "userId",
                "in": "path",
                "description": "",
                "required": true,
                "schema": { "type": "string" }
            })
        );
    }

    #[test]
    fn operation_omits_empty_parameters_and_body() {
        let op = Operation {
            tags: vec!["Pet".to_string()],
            summary: String::new(),
            operation_id: "Pet.getPet".to_string(),
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::from([(
                "200".to_string(),
                Response {
                    description: String::new(),
                    content: None,
                },
            )]),
        };
        let value = serde_json::to_value(&op).unwrap();
        assert!(value.get("parameters").is_none());
        assert!(value.get("requestBody").is_none());
        assert_eq!(value["operationId"], "Pet.getPet");
        assert_eq!(value["responses"]["200"], json!({ "description": "" }));
    }
}
