//! Geometry values and the pluggable text-format parser.
//!
//! Geometry attributes travel as WKT strings. Turning that text into a
//! geometry object belongs to a [`GeometryParser`]; the default [`WktParser`]
//! checks the outer structure and keeps the text verbatim.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::StreamError;

/// Top-level WKT geometry tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.to_ascii_uppercase().as_str() {
            "POINT" => GeometryKind::Point,
            "LINESTRING" => GeometryKind::LineString,
            "POLYGON" => GeometryKind::Polygon,
            "MULTIPOINT" => GeometryKind::MultiPoint,
            "MULTILINESTRING" => GeometryKind::MultiLineString,
            "MULTIPOLYGON" => GeometryKind::MultiPolygon,
            "GEOMETRYCOLLECTION" => GeometryKind::GeometryCollection,
            _ => return None,
        };
        Some(kind)
    }
}

/// A decoded geometry: its kind plus the WKT it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    kind: GeometryKind,
    wkt: String,
}

impl Geometry {
    pub fn new(kind: GeometryKind, wkt: impl Into<String>) -> Self {
        Self {
            kind,
            wkt: wkt.into(),
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    pub fn is_empty(&self) -> bool {
        self.wkt.trim_end().to_ascii_uppercase().ends_with("EMPTY")
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wkt)
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wkt)
    }
}

/// Converts the text payload of a geometry attribute into a [`Geometry`].
pub trait GeometryParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<Geometry, StreamError>;
}

/// Structural WKT check: a known tag followed by `EMPTY` or a balanced
/// parenthesized body. Coordinates are not interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct WktParser;

impl GeometryParser for WktParser {
    fn parse(&self, text: &str) -> Result<Geometry, StreamError> {
        let trimmed = text.trim();
        let tag_end = trimmed
            .find(|c: char| c == '(' || c.is_whitespace())
            .unwrap_or(trimmed.len());
        let (tag, rest) = trimmed.split_at(tag_end);
        let kind = GeometryKind::from_tag(tag)
            .ok_or_else(|| StreamError::InvalidGeometry(format!("unknown geometry tag in '{text}'")))?;

        let rest = rest.trim_start();
        // Optional dimension qualifier, e.g. `POINT Z (1 2 3)`.
        let rest = match rest.split_once(|c: char| c == '(' || c.is_whitespace()) {
            Some((word, _)) if matches!(word.to_ascii_uppercase().as_str(), "Z" | "M" | "ZM") => {
                rest[word.len()..].trim_start()
            }
            _ => rest,
        };

        if rest.eq_ignore_ascii_case("EMPTY") {
            return Ok(Geometry::new(kind, text));
        }
        if !rest.starts_with('(') || !rest.ends_with(')') || !balanced(rest) {
            return Err(StreamError::InvalidGeometry(format!(
                "unbalanced or missing body in '{text}'"
            )));
        }
        Ok(Geometry::new(kind, text))
    }
}

/// True if every prefix has at least as many `(` as `)` and the totals match,
/// and the outermost group closes only at the end.
fn balanced(body: &str) -> bool {
    let mut depth = 0usize;
    let last = body.len() - 1;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let g = WktParser.parse("POINT(1 2)").unwrap();
        assert_eq!(g.kind(), GeometryKind::Point);
        assert_eq!(g.wkt(), "POINT(1 2)");
        assert!(!g.is_empty());
    }

    #[test]
    fn test_parse_kinds() {
        let cases = [
            ("LINESTRING (0 0, 1 1)", GeometryKind::LineString),
            ("polygon((0 0, 1 0, 1 1, 0 0))", GeometryKind::Polygon),
            ("MULTIPOINT ((1 2), (3 4))", GeometryKind::MultiPoint),
            ("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)))", GeometryKind::MultiPolygon),
            (
                "GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1))",
                GeometryKind::GeometryCollection,
            ),
            ("POINT Z (1 2 3)", GeometryKind::Point),
        ];
        for (wkt, kind) in cases {
            assert_eq!(WktParser.parse(wkt).unwrap().kind(), kind, "{wkt}");
        }
    }

    #[test]
    fn test_parse_empty() {
        let g = WktParser.parse("POINT EMPTY").unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "CIRCLE(1 2)", "POINT", "POINT(1 2", "POINT(1 2))", "POINT(1)(2)", "POINT 1 2"] {
            assert!(WktParser.parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_serializes_as_wkt() {
        let g = WktParser.parse("POINT(1 2)").unwrap();
        assert_eq!(serde_json::to_string(&g).unwrap(), "\"POINT(1 2)\"");
    }
}
