//! Shared fixtures for geofeat benchmarks.

use geofeat_core::encoding::writer::RecordWriter;
use geofeat_core::geometry::{Geometry, GeometryKind};
use geofeat_core::value::Timestamp;
use geofeat_core::{AttributeValue, Schema};
use uuid::Uuid;

/// A wide schema resembling a typical tracking feature type.
pub const WIDE_SPEC: &str = "name:String,kind:String,count:Integer,total:Long,speed:Double,\
heading:Float,active:Boolean,uid:UUID,dtg:Date,notes:String,*geom:Point";

pub fn wide_schema() -> Schema {
    Schema::parse_spec(WIDE_SPEC).expect("benchmark schema is valid")
}

/// Encode `n` records of the wide schema back to back.
pub fn encode_records(schema: &Schema, n: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..n {
        let seed = i as i64;
        RecordWriter::new(schema)
            .identity(format!("feature-{i:08}"))
            .set("name", AttributeValue::Text(format!("vessel {i}")))
            .set("kind", AttributeValue::Text("cargo".to_string()))
            .set("count", AttributeValue::Int32(i as i32))
            .set("total", AttributeValue::Int64(seed * 7_919))
            .set("speed", AttributeValue::Float64(seed as f64 * 0.1))
            .set("heading", AttributeValue::Float32((i % 360) as f32))
            .set("active", AttributeValue::Bool(i % 3 == 0))
            .set("uid", AttributeValue::Uuid(Uuid::from_u64_pair(seed as u64, !(seed as u64))))
            .set("dtg", AttributeValue::Timestamp(Timestamp::from_millis(1_700_000_000_000 + seed)))
            .set("notes", AttributeValue::Text("x".repeat(64)))
            .set(
                "geom",
                AttributeValue::Geometry(Geometry::new(
                    GeometryKind::Point,
                    format!("POINT ({} {})", i % 180, i % 90),
                )),
            )
            .write_to(&mut out);
    }
    out
}
