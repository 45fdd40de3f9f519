//! Decoded attribute values and records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::geometry::Geometry;
use crate::types::AttributeType;

/// Milliseconds since the Unix epoch, kept exactly as encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    /// Convert to a UTC datetime, or `None` if out of chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

/// A materialized attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Float32(f32),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(Timestamp),
    Geometry(Geometry),
}

impl AttributeValue {
    /// The attribute type this value was decoded as.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeValue::Text(_) => AttributeType::Text,
            AttributeValue::Int32(_) => AttributeType::Int32,
            AttributeValue::Int64(_) => AttributeType::Int64,
            AttributeValue::Float64(_) => AttributeType::Float64,
            AttributeValue::Float32(_) => AttributeType::Float32,
            AttributeValue::Bool(_) => AttributeType::Bool,
            AttributeValue::Uuid(_) => AttributeType::Uuid,
            AttributeValue::Timestamp(_) => AttributeType::Timestamp,
            AttributeValue::Geometry(_) => AttributeType::Geometry,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Geometry(g) => Some(g.wkt()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int32(v) => Some(i64::from(*v)),
            AttributeValue::Int64(v) => Some(*v),
            AttributeValue::Timestamp(t) => Some(t.millis()),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            AttributeValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            AttributeValue::Geometry(g) => Some(g),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Int32(v) => write!(f, "{v}"),
            AttributeValue::Int64(v) => write!(f, "{v}"),
            AttributeValue::Float64(v) => write!(f, "{v}"),
            AttributeValue::Float32(v) => write!(f, "{v}"),
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Uuid(u) => write!(f, "{u}"),
            AttributeValue::Timestamp(t) => match t.to_datetime() {
                Some(dt) => write!(f, "{}", dt.to_rfc3339()),
                None => write!(f, "{}ms", t.millis()),
            },
            AttributeValue::Geometry(g) => write!(f, "{g}"),
        }
    }
}

/// One decoded feature.
///
/// `attributes` holds only the fields that exist in the old schema and were
/// selected by the projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    pub identity: String,
    pub version: i32,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl DecodedRecord {
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryParser, WktParser};
    use serde_json::json;

    #[test]
    fn test_timestamp_millis_fidelity() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        let dt = ts.to_datetime().unwrap();
        assert_eq!(Timestamp::from(dt), ts);
        assert_eq!(dt.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(Timestamp::from_millis(i64::MAX).to_datetime().is_none());
        assert_eq!(Timestamp::from_millis(i64::MAX).millis(), i64::MAX);
    }

    #[test]
    fn test_record_serializes_to_json() {
        let mut attributes = BTreeMap::new();
        attributes.insert("name".to_string(), AttributeValue::Text("Alice".into()));
        attributes.insert(
            "uid".to_string(),
            AttributeValue::Uuid(Uuid::from_u64_pair(1, 2)),
        );
        attributes.insert(
            "seen".to_string(),
            AttributeValue::Timestamp(Timestamp::from_millis(1000)),
        );
        attributes.insert(
            "geom".to_string(),
            AttributeValue::Geometry(WktParser.parse("POINT(1 2)").unwrap()),
        );
        let record = DecodedRecord {
            identity: "f1".to_string(),
            version: 1,
            attributes,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "identity": "f1",
                "version": 1,
                "attributes": {
                    "geom": "POINT(1 2)",
                    "name": "Alice",
                    "seen": 1000,
                    "uid": "00000000-0000-0001-0000-000000000002",
                }
            })
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(AttributeValue::Int32(7).as_i64(), Some(7));
        assert_eq!(AttributeValue::Text("x".into()).as_str(), Some("x"));
        assert_eq!(AttributeValue::Bool(true).as_str(), None);
        assert_eq!(
            AttributeValue::Float32(1.5).attribute_type(),
            AttributeType::Float32
        );
    }
}
