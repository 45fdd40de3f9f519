//! Old and new schemas.
//!
//! An old [`Schema`] is the ordered field layout records in a stream were
//! encoded with. It is the sole authority for interpreting bytes: there is no
//! inline field tagging on the wire. A [`Projection`] is the set of attribute
//! names a caller wants materialized.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::types::{AttributeType, FieldSpec};

/// A field as written in a schema descriptor: name and type, no position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDef {
    pub fields: Vec<FieldDef>,
}

/// The ordered, immutable field layout of encoded records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema from `(name, type)` pairs in encoded order.
    ///
    /// Names must be non-empty and unique.
    pub fn new<I, S>(fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, AttributeType)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut specs = Vec::new();
        for (position, (name, attribute_type)) in fields.into_iter().enumerate() {
            let name = name.into();
            if name.is_empty() {
                return Err(SchemaError::EmptyFieldName(position));
            }
            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateField(name));
            }
            specs.push(FieldSpec {
                name,
                attribute_type,
                position,
            });
        }
        Ok(Self { fields: specs })
    }

    /// Parse a compact spec string such as `name:String,age:Integer,*geom:Point`.
    ///
    /// A leading `*` marks the default geometry and carries no wire meaning.
    /// An empty or all-whitespace string yields an empty schema.
    pub fn parse_spec(spec: &str) -> Result<Self, SchemaError> {
        let mut fields = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                if spec.trim().is_empty() {
                    continue;
                }
                return Err(SchemaError::MalformedSpec(format!(
                    "empty attribute entry in '{spec}'"
                )));
            }
            let (name, type_name) = part.split_once(':').ok_or_else(|| {
                SchemaError::MalformedSpec(format!("expected name:Type, got '{part}'"))
            })?;
            let name = name.trim().trim_start_matches('*');
            let attribute_type: AttributeType = type_name.parse()?;
            fields.push((name.to_string(), attribute_type));
        }
        Self::new(fields)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", field.name, field.attribute_type)?;
        }
        Ok(())
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        Self::new(
            def.fields
                .into_iter()
                .map(|f| (f.name, f.attribute_type)),
        )
    }
}

impl From<Schema> for SchemaDef {
    fn from(schema: Schema) -> Self {
        SchemaDef {
            fields: schema
                .fields
                .into_iter()
                .map(|f| FieldDef {
                    name: f.name,
                    attribute_type: f.attribute_type,
                })
                .collect(),
        }
    }
}

/// The attribute names a caller wants materialized.
///
/// [`Projection::All`] is resolved against whichever old schema the decoder
/// holds, so it keeps selecting every field across a reconfigure. Names in
/// [`Projection::Fields`] that do not exist in the old schema are not an
/// error; they are simply absent from decoded records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Fields(HashSet<String>),
}

impl Projection {
    /// Select every field of the current old schema.
    pub fn all() -> Self {
        Self::All
    }

    /// Select the given names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(names.into_iter().map(Into::into).collect())
    }

    /// Select no attributes; only identity and version are read.
    pub fn none() -> Self {
        Self::Fields(HashSet::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Fields(names) => names.contains(name),
        }
    }

    /// Explicitly named fields; empty for [`Projection::All`].
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let names = match self {
            Self::All => None,
            Self::Fields(names) => Some(names),
        };
        names.into_iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_declaration_order() {
        let schema = Schema::new([
            ("name", AttributeType::Text),
            ("age", AttributeType::Int32),
            ("geom", AttributeType::Geometry),
        ])
        .unwrap();
        let positions: Vec<_> = schema.fields().iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(schema.field("age").unwrap().attribute_type, AttributeType::Int32);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::new([("a", AttributeType::Text), ("a", AttributeType::Int32)]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(ref n) if n == "a"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Schema::new([("a", AttributeType::Text), ("", AttributeType::Int32)]).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyFieldName(1)));
    }

    #[test]
    fn test_parse_spec() {
        let schema =
            Schema::parse_spec("name:String, age:Integer, uid:UUID, seen:Date, *geom:Point").unwrap();
        assert_eq!(schema.len(), 5);
        assert_eq!(schema.fields()[4].name, "geom");
        assert_eq!(schema.fields()[4].attribute_type, AttributeType::Geometry);
        assert_eq!(schema.fields()[3].attribute_type, AttributeType::Timestamp);
        assert_eq!(
            schema.to_string(),
            "name:String,age:Integer,uid:UUID,seen:Date,geom:Geometry"
        );
    }

    #[test]
    fn test_parse_spec_empty() {
        assert!(Schema::parse_spec("").unwrap().is_empty());
        assert!(Schema::parse_spec("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_spec_malformed() {
        assert!(matches!(
            Schema::parse_spec("name"),
            Err(SchemaError::MalformedSpec(_))
        ));
        assert!(matches!(
            Schema::parse_spec("a:String,,b:Long"),
            Err(SchemaError::MalformedSpec(_))
        ));
        assert!(matches!(
            Schema::parse_spec("a:Decimal"),
            Err(SchemaError::UnknownTypeName(_))
        ));
    }

    #[test]
    fn test_schema_json_roundtrip() {
        let json = r#"{"fields":[{"name":"name","type":"String"},{"name":"dtg","type":"Date"}]}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields()[1].position, 1);
        let back = serde_json::to_string(&schema).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_schema_json_duplicate_rejected() {
        let json = r#"{"fields":[{"name":"a","type":"String"},{"name":"a","type":"Long"}]}"#;
        assert!(serde_json::from_str::<Schema>(json).is_err());
    }

    #[test]
    fn test_projection_all_and_of() {
        let schema = Schema::parse_spec("a:String,b:Long").unwrap();
        let all = Projection::all();
        assert!(all.is_all());
        assert!(schema.fields().iter().all(|f| all.contains(&f.name)));
        assert_eq!(all.names().count(), 0);
        assert_eq!(Projection::default(), all);

        let some = Projection::of(["b", "zzz"]);
        assert!(some.contains("b"));
        assert!(!some.contains("a"));
        assert_eq!(some.names().count(), 2);

        assert!(!Projection::none().contains("a"));
    }
}
