//! Shared protobuf descriptor types for `proto2oas`.
//!
//! This crate provides hand-written [`prost::Message`] types covering the
//! subset of `google.protobuf.FileDescriptorSet` the `OpenAPI` generator reads:
//! packages, nested messages and enums, field labels and defaults, map-entry
//! markers, source comments, and the `google.api.http` method extension that
//! `prost_types::MethodOptions` drops during decoding.
//!
//! You should not need to depend on this crate directly. Use `proto2oas`
//! instead.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod descriptor;
