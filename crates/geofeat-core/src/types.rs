//! Core types: attribute kinds, field specs, wire constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Default upper bound on any length prefix (64 MiB).
pub const DEFAULT_MAX_BLOB_LEN: usize = 64 * 1024 * 1024;

/// Encoded size of a UUID blob: high and low halves, 8 bytes each.
pub const UUID_BLOB_LEN: usize = 16;

/// Maximum encoded width of a zig-zag varint `int`.
pub const MAX_VARINT_INT_BYTES: usize = 5;

/// Maximum encoded width of a zig-zag varint `long`.
pub const MAX_VARINT_LONG_BYTES: usize = 10;

/// The semantic kind of a feature attribute.
///
/// `Bytes`, `List` and `Map` can appear in feature-type descriptors but have
/// no wire rule in the standard codec table; schemas naming them fail to
/// decode with `SchemaError::UnsupportedType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttributeType {
    Text,
    Int32,
    Int64,
    Float64,
    Float32,
    Bool,
    Uuid,
    Timestamp,
    Geometry,
    Bytes,
    List,
    Map,
}

impl AttributeType {
    /// Number of variants; sizes the codec dispatch table.
    pub const COUNT: usize = 12;

    pub const ALL: [AttributeType; Self::COUNT] = [
        AttributeType::Text,
        AttributeType::Int32,
        AttributeType::Int64,
        AttributeType::Float64,
        AttributeType::Float32,
        AttributeType::Bool,
        AttributeType::Uuid,
        AttributeType::Timestamp,
        AttributeType::Geometry,
        AttributeType::Bytes,
        AttributeType::List,
        AttributeType::Map,
    ];

    /// Slot of this type in a dispatch table of length `COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical descriptor name.
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::Text => "String",
            AttributeType::Int32 => "Integer",
            AttributeType::Int64 => "Long",
            AttributeType::Float64 => "Double",
            AttributeType::Float32 => "Float",
            AttributeType::Bool => "Boolean",
            AttributeType::Uuid => "UUID",
            AttributeType::Timestamp => "Date",
            AttributeType::Geometry => "Geometry",
            AttributeType::Bytes => "Bytes",
            AttributeType::List => "List",
            AttributeType::Map => "Map",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeType {
    type Err = SchemaError;

    /// Parse a descriptor binding name. Matching is case-insensitive and
    /// accepts both descriptor names and the engine's own type names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let ty = match lower.as_str() {
            "string" | "text" => AttributeType::Text,
            "integer" | "int" | "int32" => AttributeType::Int32,
            "long" | "int64" => AttributeType::Int64,
            "double" | "float64" => AttributeType::Float64,
            "float" | "float32" => AttributeType::Float32,
            "boolean" | "bool" => AttributeType::Bool,
            "uuid" => AttributeType::Uuid,
            "date" | "timestamp" => AttributeType::Timestamp,
            "geometry" | "point" | "linestring" | "polygon" | "multipoint"
            | "multilinestring" | "multipolygon" | "geometrycollection" => AttributeType::Geometry,
            "bytes" => AttributeType::Bytes,
            "list" => AttributeType::List,
            "map" => AttributeType::Map,
            _ => return Err(SchemaError::UnknownTypeName(s.to_string())),
        };
        Ok(ty)
    }
}

impl TryFrom<String> for AttributeType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AttributeType> for String {
    fn from(value: AttributeType) -> Self {
        value.name().to_string()
    }
}

/// One attribute in a schema's positional layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Zero-based ordinal in the encoded record body.
    pub position: usize,
}
