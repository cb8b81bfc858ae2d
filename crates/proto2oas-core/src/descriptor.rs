//! Minimal protobuf descriptor types for `OpenAPI` generation.
//!
//! Standard `prost_types::MethodOptions` drops the `google.api.http` extension
//! (field 72295728) during decoding because prost doesn't retain unknown fields.
//! These custom types preserve it, together with the `SourceCodeInfo` comments
//! and `map_entry` markers the schema loader relies on.

#[allow(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
mod types {
    use prost::Message;

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorSet {
        #[prost(message, repeated, tag = "1")]
        pub file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub package: Option<String>,
        #[prost(message, repeated, tag = "4")]
        pub message_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "5")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, repeated, tag = "6")]
        pub service: Vec<ServiceDescriptorProto>,
        /// Only present when compiled with `--include_source_info`.
        #[prost(message, optional, tag = "9")]
        pub source_code_info: Option<SourceCodeInfo>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct DescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub field: Vec<FieldDescriptorProto>,
        #[prost(message, repeated, tag = "3")]
        pub nested_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "4")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, optional, tag = "7")]
        pub options: Option<MessageOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MessageOptions {
        /// Set by protoc on the synthetic `XxxEntry` message backing a `map<K, V>` field.
        #[prost(bool, optional, tag = "7")]
        pub map_entry: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FieldDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "3")]
        pub number: Option<i32>,
        /// 1=optional, 2=required, 3=repeated.
        #[prost(int32, optional, tag = "4")]
        pub label: Option<i32>,
        /// Protobuf field type enum: 1=double, 5=int32, 9=string, 11=message, 14=enum, …
        #[prost(int32, optional, tag = "5")]
        pub r#type: Option<i32>,
        /// Fully-qualified type name for message/enum fields (e.g., `.pet.v1.Category`).
        #[prost(string, optional, tag = "6")]
        pub type_name: Option<String>,
        /// proto2 `[default = ...]` literal, as text.
        #[prost(string, optional, tag = "7")]
        pub default_value: Option<String>,
        #[prost(string, optional, tag = "10")]
        pub json_name: Option<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub value: Vec<EnumValueDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "2")]
        pub number: Option<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub method: Vec<MethodDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MethodDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub input_type: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub output_type: Option<String>,
        #[prost(message, optional, tag = "4")]
        pub options: Option<MethodOptions>,
    }

    /// Method options with the `google.api.http` extension (field 72295728).
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodOptions {
        #[prost(message, optional, tag = "72295728")]
        pub http: Option<HttpRule>,
    }

    /// `google.api.HttpRule`: REST mapping for an RPC.
    #[derive(Clone, PartialEq, Message)]
    pub struct HttpRule {
        #[prost(oneof = "HttpPattern", tags = "2, 3, 4, 5, 6")]
        pub pattern: Option<HttpPattern>,
        #[prost(string, tag = "7")]
        pub body: String,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum HttpPattern {
        #[prost(string, tag = "2")]
        Get(String),
        #[prost(string, tag = "3")]
        Put(String),
        #[prost(string, tag = "4")]
        Post(String),
        #[prost(string, tag = "5")]
        Delete(String),
        #[prost(string, tag = "6")]
        Patch(String),
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct SourceCodeInfo {
        #[prost(message, repeated, tag = "1")]
        pub location: Vec<Location>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Location {
        #[prost(int32, repeated, tag = "1")]
        pub path: Vec<i32>,
        #[prost(string, optional, tag = "3")]
        pub leading_comments: Option<String>,
        #[prost(string, optional, tag = "4")]
        pub trailing_comments: Option<String>,
    }
}

pub use types::*;

/// Proto field type constants (from `google.protobuf.FieldDescriptorProto.Type`).
pub mod field_type {
    /// `TYPE_DOUBLE = 1`
    pub const DOUBLE: i32 = 1;
    /// `TYPE_FLOAT = 2`
    pub const FLOAT: i32 = 2;
    /// `TYPE_INT64 = 3`
    pub const INT64: i32 = 3;
    /// `TYPE_UINT64 = 4`
    pub const UINT64: i32 = 4;
    /// `TYPE_INT32 = 5`
    pub const INT32: i32 = 5;
    /// `TYPE_FIXED64 = 6`
    pub const FIXED64: i32 = 6;
    /// `TYPE_FIXED32 = 7`
    pub const FIXED32: i32 = 7;
    /// `TYPE_BOOL = 8`
    pub const BOOL: i32 = 8;
    /// `TYPE_STRING = 9`
    pub const STRING: i32 = 9;
    /// `TYPE_GROUP = 10`
    pub const GROUP: i32 = 10;
    /// `TYPE_MESSAGE = 11`
    pub const MESSAGE: i32 = 11;
    /// `TYPE_BYTES = 12`
    pub const BYTES: i32 = 12;
    /// `TYPE_UINT32 = 13`
    pub const UINT32: i32 = 13;
    /// `TYPE_ENUM = 14`
    pub const ENUM: i32 = 14;
    /// `TYPE_SFIXED32 = 15`
    pub const SFIXED32: i32 = 15;
    /// `TYPE_SFIXED64 = 16`
    pub const SFIXED64: i32 = 16;
    /// `TYPE_SINT32 = 17`
    pub const SINT32: i32 = 17;
    /// `TYPE_SINT64 = 18`
    pub const SINT64: i32 = 18;

    /// Proto source keyword for a scalar type ID, e.g. `9` → `"string"`.
    ///
    /// Returns `None` for message, enum and group types.
    #[must_use]
    pub fn keyword(type_id: i32) -> Option<&'static str> {
        Some(match type_id {
            DOUBLE => "double",
            FLOAT => "float",
            INT64 => "int64",
            UINT64 => "uint64",
            INT32 => "int32",
            FIXED64 => "fixed64",
            FIXED32 => "fixed32",
            BOOL => "bool",
            STRING => "string",
            BYTES => "bytes",
            UINT32 => "uint32",
            SFIXED32 => "sfixed32",
            SFIXED64 => "sfixed64",
            SINT32 => "sint32",
            SINT64 => "sint64",
            _ => return None,
        })
    }
}

/// Field label constants (from `google.protobuf.FieldDescriptorProto.Label`).
pub mod label {
    /// `LABEL_OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `LABEL_REQUIRED = 2`
    pub const REQUIRED: i32 = 2;
    /// `LABEL_REPEATED = 3`
    pub const REPEATED: i32 = 3;
}

/// Field numbers used to build `SourceCodeInfo` location paths.
///
/// A comment on the second field of the first top-level message lives at
/// `[MESSAGE_TYPE, 0, FIELD, 1]`.
pub mod source_path {
    /// `FileDescriptorProto.message_type`
    pub const MESSAGE_TYPE: i32 = 4;
    /// `FileDescriptorProto.enum_type`
    pub const ENUM_TYPE: i32 = 5;
    /// `FileDescriptorProto.service`
    pub const SERVICE: i32 = 6;
    /// `DescriptorProto.field`
    pub const FIELD: i32 = 2;
    /// `DescriptorProto.nested_type`
    pub const NESTED_TYPE: i32 = 3;
    /// `DescriptorProto.enum_type`
    pub const NESTED_ENUM: i32 = 4;
    /// `EnumDescriptorProto.value`
    pub const ENUM_VALUE: i32 = 2;
    /// `ServiceDescriptorProto.method`
    pub const METHOD: i32 = 2;
}

impl SourceCodeInfo {
    /// Comment attached to the element at `path`: the leading comment if
    /// present, otherwise the trailing one. Whitespace is trimmed and blank
    /// comments count as absent.
    #[must_use]
    pub fn comment(&self, path: &[i32]) -> Option<&str> {
        let location = self.location.iter().find(|loc| loc.path == path)?;
        [&location.leading_comments, &location.trailing_comments]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .map(str::trim)
            .find(|c| !c.is_empty())
    }
}

impl DescriptorProto {
    /// Whether this is the synthetic entry message protoc generates for a map field.
    #[must_use]
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false)
    }
}

/// Extract `(http_method, path)` from a method's `google.api.http` annotation.
#[must_use]
pub fn extract_http_pattern(method: &MethodDescriptorProto) -> Option<(&'static str, &str)> {
    let pattern = method
        .options
        .as_ref()
        .and_then(|o| o.http.as_ref())
        .and_then(|h| h.pattern.as_ref())?;

    Some(match pattern {
        HttpPattern::Get(p) => ("get", p.as_str()),
        HttpPattern::Put(p) => ("put", p.as_str()),
        HttpPattern::Post(p) => ("post", p.as_str()),
        HttpPattern::Delete(p) => ("delete", p.as_str()),
        HttpPattern::Patch(p) => ("patch", p.as_str()),
    })
}
