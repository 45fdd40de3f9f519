use std::collections::HashMap;

use crate::error::SchemaError;
use crate::schema::Schema;
use crate::types::AttributeType;

/// Attribute name to type, built once from an old schema.
#[derive(Debug, Clone, Default)]
pub struct AttributeTypeTable {
    types: HashMap<String, AttributeType>,
}

impl AttributeTypeTable {
    pub fn new(schema: &Schema) -> Self {
        Self {
            types: schema
                .fields()
                .iter()
                .map(|f| (f.name.clone(), f.attribute_type))
                .collect(),
        }
    }

    /// Type of `name`. A miss means the table and the schema being walked
    /// were built from different sources.
    pub fn type_of(&self, name: &str) -> Result<AttributeType, SchemaError> {
        self.types.get(name).copied().ok_or_else(|| {
            SchemaError::InvariantViolation(format!(
                "attribute '{name}' missing from the attribute type table"
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let schema = Schema::parse_spec("name:String,dtg:Date,geom:Point").unwrap();
        let table = AttributeTypeTable::new(&schema);
        assert_eq!(table.len(), 3);
        assert_eq!(table.type_of("dtg").unwrap(), AttributeType::Timestamp);
        assert_eq!(table.type_of("geom").unwrap(), AttributeType::Geometry);
    }

    #[test]
    fn test_missing_name_is_invariant_violation() {
        let schema = Schema::parse_spec("name:String").unwrap();
        let table = AttributeTypeTable::new(&schema);
        assert!(matches!(
            table.type_of("other"),
            Err(SchemaError::InvariantViolation(_))
        ));
    }
}
