//! Record encoder used by tests and benchmarks.
//!
//! Produces the exact byte layout the decoder consumes. Only compiled for
//! tests or with the `test-utils` feature.

use std::collections::HashMap;

use crate::schema::Schema;
use crate::value::AttributeValue;

pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn encode_varint(mut raw: u64, out: &mut Vec<u8>) {
    while raw >= 0x80 {
        out.push((raw as u8 & 0x7F) | 0x80);
        raw >>= 7;
    }
    out.push(raw as u8);
}

pub fn encode_long(value: i64, out: &mut Vec<u8>) {
    encode_varint(zigzag_encode(value), out);
}

pub fn encode_int(value: i32, out: &mut Vec<u8>) {
    encode_long(i64::from(value), out);
}

pub fn encode_bytes(data: &[u8], out: &mut Vec<u8>) {
    encode_long(data.len() as i64, out);
    out.extend_from_slice(data);
}

pub fn encode_string(s: &str, out: &mut Vec<u8>) {
    encode_bytes(s.as_bytes(), out);
}

/// Append the wire form of a single attribute value.
pub fn encode_value(value: &AttributeValue, out: &mut Vec<u8>) {
    match value {
        AttributeValue::Text(s) => encode_string(s, out),
        AttributeValue::Int32(v) => encode_int(*v, out),
        AttributeValue::Int64(v) => encode_long(*v, out),
        AttributeValue::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
        AttributeValue::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
        AttributeValue::Bool(v) => out.push(u8::from(*v)),
        AttributeValue::Uuid(u) => {
            let (high, low) = u.as_u64_pair();
            let mut blob = [0u8; 16];
            blob[..8].copy_from_slice(&high.to_be_bytes());
            blob[8..].copy_from_slice(&low.to_be_bytes());
            encode_bytes(&blob, out);
        }
        AttributeValue::Timestamp(t) => encode_long(t.millis(), out),
        AttributeValue::Geometry(g) => encode_string(g.wkt(), out),
    }
}

/// Builds one encoded record against an old schema.
///
/// Every schema field must be given a value before [`RecordWriter::finish`];
/// fields are emitted in schema order regardless of insertion order. Raw
/// bytes can stand in for types the writer has no encoding for.
pub struct RecordWriter<'a> {
    schema: &'a Schema,
    version: i32,
    identity: String,
    values: HashMap<String, AttributeValue>,
    raw: HashMap<String, Vec<u8>>,
}

impl<'a> RecordWriter<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            version: 1,
            identity: String::new(),
            values: HashMap::new(),
            raw: HashMap::new(),
        }
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn set(mut self, name: &str, value: AttributeValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    /// Emit `bytes` verbatim in place of the named field.
    pub fn raw(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.raw.insert(name.to_string(), bytes);
        self
    }

    /// Append the encoded record to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        encode_int(self.version, out);
        encode_string(&self.identity, out);
        for field in self.schema.fields() {
            if let Some(bytes) = self.raw.get(&field.name) {
                out.extend_from_slice(bytes);
                continue;
            }
            let value = self
                .values
                .get(&field.name)
                .unwrap_or_else(|| panic!("no value set for field '{}'", field.name));
            assert_eq!(
                value.attribute_type(),
                field.attribute_type,
                "value type mismatch for field '{}'",
                field.name
            );
            encode_value(value, out);
        }
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}
