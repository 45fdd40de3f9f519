//! Per-type decode and skip rules.
//!
//! Every supported [`AttributeType`] maps to one [`FieldCodec`] in a
//! [`CodecTable`]. A codec's `decode` and `skip` consume the same bytes for
//! well-formed input, so a projected read leaves the cursor exactly where a
//! full read would.

use std::io::Read;

use uuid::Uuid;

use crate::encoding::reader::BinaryReader;
use crate::error::StreamError;
use crate::geometry::GeometryParser;
use crate::types::{AttributeType, UUID_BLOB_LEN};
use crate::value::{AttributeValue, Timestamp};

/// Wire rule for one attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCodec {
    /// Length-prefixed UTF-8.
    Text,
    /// Zig-zag varint, 32-bit.
    Int32,
    /// Zig-zag varint, 64-bit.
    Int64,
    /// 8 bytes little-endian.
    Float64,
    /// 4 bytes little-endian.
    Float32,
    /// One byte.
    Bool,
    /// Length-prefixed 16-byte blob: high half then low half, big-endian.
    Uuid,
    /// Zig-zag varint epoch milliseconds.
    Timestamp,
    /// Length-prefixed WKT handed to a [`GeometryParser`].
    Geometry,
}

impl FieldCodec {
    pub fn decode<R: Read>(
        self,
        reader: &mut BinaryReader<R>,
        geometry: &dyn GeometryParser,
    ) -> Result<AttributeValue, StreamError> {
        let value = match self {
            FieldCodec::Text => AttributeValue::Text(reader.read_string()?),
            FieldCodec::Int32 => AttributeValue::Int32(reader.read_int()?),
            FieldCodec::Int64 => AttributeValue::Int64(reader.read_long()?),
            FieldCodec::Float64 => AttributeValue::Float64(reader.read_double()?),
            FieldCodec::Float32 => AttributeValue::Float32(reader.read_float()?),
            FieldCodec::Bool => AttributeValue::Bool(reader.read_bool()?),
            FieldCodec::Uuid => AttributeValue::Uuid(decode_uuid(reader)?),
            FieldCodec::Timestamp => {
                AttributeValue::Timestamp(Timestamp::from_millis(reader.read_long()?))
            }
            FieldCodec::Geometry => AttributeValue::Geometry(geometry.parse(reader.read_str()?)?),
        };
        Ok(value)
    }

    pub fn skip<R: Read>(self, reader: &mut BinaryReader<R>) -> Result<(), StreamError> {
        match self {
            FieldCodec::Text | FieldCodec::Uuid | FieldCodec::Geometry => reader.skip_blob(),
            FieldCodec::Int32 => reader.read_int().map(drop),
            FieldCodec::Int64 | FieldCodec::Timestamp => reader.read_long().map(drop),
            FieldCodec::Float64 => reader.skip_bytes(8),
            FieldCodec::Float32 => reader.skip_bytes(4),
            FieldCodec::Bool => reader.read_bool().map(drop),
        }
    }
}

fn decode_uuid<R: Read>(reader: &mut BinaryReader<R>) -> Result<Uuid, StreamError> {
    let len = reader.read_len()?;
    if len != UUID_BLOB_LEN {
        return Err(StreamError::InvalidUuidLength(len));
    }
    let blob = reader.read_array::<16>()?;
    let mut high = [0u8; 8];
    let mut low = [0u8; 8];
    high.copy_from_slice(&blob[..8]);
    low.copy_from_slice(&blob[8..]);
    Ok(Uuid::from_u64_pair(
        u64::from_be_bytes(high),
        u64::from_be_bytes(low),
    ))
}

/// Dispatch table from attribute type to wire rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecTable {
    rules: [Option<FieldCodec>; AttributeType::COUNT],
}

impl CodecTable {
    /// A table with no rules.
    pub fn empty() -> Self {
        Self {
            rules: [None; AttributeType::COUNT],
        }
    }

    /// Rules for every type with a wire encoding. `Bytes`, `List` and `Map`
    /// stay unregistered.
    pub fn standard() -> Self {
        Self::empty()
            .with(AttributeType::Text, FieldCodec::Text)
            .with(AttributeType::Int32, FieldCodec::Int32)
            .with(AttributeType::Int64, FieldCodec::Int64)
            .with(AttributeType::Float64, FieldCodec::Float64)
            .with(AttributeType::Float32, FieldCodec::Float32)
            .with(AttributeType::Bool, FieldCodec::Bool)
            .with(AttributeType::Uuid, FieldCodec::Uuid)
            .with(AttributeType::Timestamp, FieldCodec::Timestamp)
            .with(AttributeType::Geometry, FieldCodec::Geometry)
    }

    pub fn with(mut self, attribute_type: AttributeType, codec: FieldCodec) -> Self {
        self.rules[attribute_type.index()] = Some(codec);
        self
    }

    pub fn without(mut self, attribute_type: AttributeType) -> Self {
        self.rules[attribute_type.index()] = None;
        self
    }

    pub fn rule(&self, attribute_type: AttributeType) -> Option<FieldCodec> {
        self.rules[attribute_type.index()]
    }

    pub fn supports(&self, attribute_type: AttributeType) -> bool {
        self.rule(attribute_type).is_some()
    }
}

impl Default for CodecTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::writer::{encode_bytes, encode_value};
    use crate::geometry::WktParser;

    fn samples() -> Vec<(FieldCodec, AttributeValue)> {
        vec![
            (FieldCodec::Text, AttributeValue::Text("héllo wörld".into())),
            (FieldCodec::Text, AttributeValue::Text(String::new())),
            (FieldCodec::Int32, AttributeValue::Int32(-123_456)),
            (FieldCodec::Int64, AttributeValue::Int64(i64::MIN)),
            (FieldCodec::Float64, AttributeValue::Float64(std::f64::consts::PI)),
            (FieldCodec::Float32, AttributeValue::Float32(-0.5)),
            (FieldCodec::Bool, AttributeValue::Bool(true)),
            (
                FieldCodec::Uuid,
                AttributeValue::Uuid(Uuid::from_u64_pair(u64::MAX, 7)),
            ),
            (
                FieldCodec::Timestamp,
                AttributeValue::Timestamp(Timestamp::from_millis(-1)),
            ),
            (
                FieldCodec::Geometry,
                AttributeValue::Geometry(WktParser.parse("LINESTRING (0 0, 1 1)").unwrap()),
            ),
        ]
    }

    #[test]
    fn test_decode_and_skip_consume_same_bytes() {
        for (codec, value) in samples() {
            let mut buf = Vec::new();
            encode_value(&value, &mut buf);
            // Trailing sentinel: must still be readable after either path.
            buf.push(0x54);

            let mut decoded = BinaryReader::new(&buf[..]);
            let got = codec.decode(&mut decoded, &WktParser).unwrap();
            assert_eq!(got, value, "{codec:?}");

            let mut skipped = BinaryReader::new(&buf[..]);
            codec.skip(&mut skipped).unwrap();

            assert_eq!(decoded.position(), skipped.position(), "{codec:?}");
            assert_eq!(decoded.position(), buf.len() as u64 - 1, "{codec:?}");
            assert_eq!(skipped.read_byte().unwrap(), 0x54);
        }
    }

    #[test]
    fn test_uuid_halves_are_big_endian_high_first() {
        let mut buf = Vec::new();
        let mut blob = Vec::new();
        blob.extend_from_slice(&1u64.to_be_bytes());
        blob.extend_from_slice(&2u64.to_be_bytes());
        encode_bytes(&blob, &mut buf);

        let mut r = BinaryReader::new(&buf[..]);
        let value = FieldCodec::Uuid.decode(&mut r, &WktParser).unwrap();
        assert_eq!(
            value.as_uuid().unwrap().to_string(),
            "00000000-0000-0001-0000-000000000002"
        );
    }

    #[test]
    fn test_uuid_wrong_length() {
        let mut buf = Vec::new();
        encode_bytes(&[0u8; 8], &mut buf);
        let mut r = BinaryReader::new(&buf[..]);
        assert!(matches!(
            FieldCodec::Uuid.decode(&mut r, &WktParser),
            Err(StreamError::InvalidUuidLength(8))
        ));
    }

    #[test]
    fn test_bad_geometry_text() {
        let mut buf = Vec::new();
        encode_bytes(b"NOT A GEOMETRY", &mut buf);
        let mut r = BinaryReader::new(&buf[..]);
        assert!(matches!(
            FieldCodec::Geometry.decode(&mut r, &WktParser),
            Err(StreamError::InvalidGeometry(_))
        ));
        // Skip does not interpret the text.
        let mut r = BinaryReader::new(&buf[..]);
        FieldCodec::Geometry.skip(&mut r).unwrap();
        assert_eq!(r.position(), buf.len() as u64);
    }

    #[test]
    fn test_standard_table() {
        let table = CodecTable::standard();
        for ty in AttributeType::ALL {
            let expected = !matches!(
                ty,
                AttributeType::Bytes | AttributeType::List | AttributeType::Map
            );
            assert_eq!(table.supports(ty), expected, "{ty}");
        }
        assert_eq!(table.rule(AttributeType::Timestamp), Some(FieldCodec::Timestamp));
    }

    #[test]
    fn test_without_removes_rule() {
        let table = CodecTable::standard().without(AttributeType::Geometry);
        assert!(!table.supports(AttributeType::Geometry));
        assert!(CodecTable::empty().rule(AttributeType::Text).is_none());
    }
}
