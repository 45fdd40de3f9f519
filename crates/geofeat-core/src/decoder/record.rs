//! Positional record decoding.
//!
//! Record layout:
//! ```text
//! [version: int]
//! [identity: string]
//! [field_1 per its attribute type]
//! ...
//! [field_N per its attribute type]
//! ```
//! Field count and order come from the old schema alone. Each field is
//! either decoded into the result or skipped; both paths consume the same
//! bytes, so a projected read ends at the same cursor as a full read.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::encoding::codec::{CodecTable, FieldCodec};
use crate::encoding::reader::BinaryReader;
use crate::error::{Result, SchemaError};
use crate::geometry::{GeometryParser, WktParser};
use crate::schema::{Projection, Schema};
use crate::types::AttributeType;
use crate::value::DecodedRecord;

use super::selector::FieldSelector;
use super::type_table::AttributeTypeTable;

/// What to do with one field of the old schema.
#[derive(Debug, Clone, Copy)]
enum Step {
    Decode(FieldCodec),
    Skip(FieldCodec),
}

/// Everything derived from an (old schema, projection) pair. Rebuilt as a
/// unit so a failed rebuild never leaves the decoder half-updated.
#[derive(Debug, Clone)]
struct Plan {
    types: AttributeTypeTable,
    selector: FieldSelector,
    steps: Vec<Step>,
    /// First field whose type has no rule; reads fail before consuming bytes.
    unsupported: Option<(String, AttributeType)>,
}

impl Plan {
    fn build(schema: &Schema, projection: &Projection, codecs: &CodecTable) -> Result<Self> {
        let types = AttributeTypeTable::new(schema);
        let selector = FieldSelector::new(projection, schema);
        let mut steps = Vec::with_capacity(schema.len());
        let mut unsupported = None;

        for field in schema.fields() {
            let attribute_type = types.type_of(&field.name)?;
            let Some(codec) = codecs.rule(attribute_type) else {
                if unsupported.is_none() {
                    unsupported = Some((field.name.clone(), attribute_type));
                }
                continue;
            };
            if selector.wants(&field.name) {
                steps.push(Step::Decode(codec));
            } else {
                steps.push(Step::Skip(codec));
            }
        }

        Ok(Self {
            types,
            selector,
            steps,
            unsupported,
        })
    }
}

/// Decodes records encoded with an old schema into the fields a projection
/// selects.
///
/// A decoder holds mutable configuration and is meant for one sequential
/// consumer. Clones share the schema and geometry parser but are otherwise
/// independent.
#[derive(Clone)]
pub struct RecordDecoder {
    old_schema: Arc<Schema>,
    projection: Projection,
    codecs: CodecTable,
    geometry: Arc<dyn GeometryParser>,
    plan: Plan,
}

impl std::fmt::Debug for RecordDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDecoder")
            .field("old_schema", &self.old_schema.to_string())
            .field("projection", &self.projection)
            .field("pass_through", &self.plan.selector.is_pass_through())
            .finish_non_exhaustive()
    }
}

impl RecordDecoder {
    /// Create a decoder with the standard codec table and WKT geometry.
    pub fn new(old_schema: impl Into<Arc<Schema>>, projection: Projection) -> Result<Self> {
        Self::builder(old_schema).projection(projection).build()
    }

    pub fn builder(old_schema: impl Into<Arc<Schema>>) -> RecordDecoderBuilder {
        RecordDecoderBuilder {
            old_schema: old_schema.into(),
            projection: Projection::all(),
            codecs: CodecTable::standard(),
            geometry: Arc::new(WktParser),
        }
    }

    pub fn old_schema(&self) -> &Arc<Schema> {
        &self.old_schema
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Attribute type table for the current old schema.
    pub fn type_table(&self) -> &AttributeTypeTable {
        &self.plan.types
    }

    pub fn selector(&self) -> &FieldSelector {
        &self.plan.selector
    }

    /// Replace the old schema, rebuilding the type table and selector.
    ///
    /// On error the decoder keeps its previous schema.
    pub fn reconfigure(&mut self, old_schema: impl Into<Arc<Schema>>) -> Result<()> {
        let old_schema = old_schema.into();
        let plan = Plan::build(&old_schema, &self.projection, &self.codecs)?;
        self.old_schema = old_schema;
        self.plan = plan;
        self.log_configuration("reconfigured");
        Ok(())
    }

    /// Replace the projection, rebuilding the selector.
    pub fn set_projection(&mut self, projection: Projection) -> Result<()> {
        let plan = Plan::build(&self.old_schema, &projection, &self.codecs)?;
        self.projection = projection;
        self.plan = plan;
        self.log_configuration("projection changed");
        Ok(())
    }

    fn log_configuration(&self, event: &str) {
        let ignored: Vec<&str> = self
            .projection
            .names()
            .filter(|n| !self.old_schema.contains(n))
            .collect();
        debug!(
            fields = self.old_schema.len(),
            selected = self.plan.steps.iter().filter(|s| matches!(s, Step::Decode(_))).count(),
            pass_through = self.plan.selector.is_pass_through(),
            ?ignored,
            "{event}"
        );
    }

    /// Decode one record starting at the reader's cursor.
    ///
    /// Fails with `SchemaError::UnsupportedType` before consuming any bytes if
    /// the old schema names a type with no codec. Stream errors abort the
    /// record; no partial record is returned.
    pub fn read<R: Read>(&self, reader: &mut BinaryReader<R>) -> Result<DecodedRecord> {
        if let Some((field, attribute_type)) = &self.plan.unsupported {
            return Err(SchemaError::UnsupportedType {
                field: field.clone(),
                attribute_type: *attribute_type,
            }
            .into());
        }

        let start = reader.position();
        let version = reader.read_int()?;
        let identity = reader.read_string()?;

        let mut attributes = BTreeMap::new();
        for (field, step) in self.old_schema.fields().iter().zip(&self.plan.steps) {
            match *step {
                Step::Decode(codec) => {
                    let value = codec.decode(reader, self.geometry.as_ref())?;
                    attributes.insert(field.name.clone(), value);
                }
                Step::Skip(codec) => codec.skip(reader)?,
            }
        }

        trace!(
            identity = %identity,
            version,
            bytes = reader.position() - start,
            "decoded record"
        );

        Ok(DecodedRecord {
            identity,
            version,
            attributes,
        })
    }
}

/// Builder for [`RecordDecoder`] with non-default collaborators.
pub struct RecordDecoderBuilder {
    old_schema: Arc<Schema>,
    projection: Projection,
    codecs: CodecTable,
    geometry: Arc<dyn GeometryParser>,
}

impl RecordDecoderBuilder {
    /// Fields to materialize. Defaults to [`Projection::All`].
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn codecs(mut self, codecs: CodecTable) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn geometry_parser(mut self, parser: impl GeometryParser + 'static) -> Self {
        self.geometry = Arc::new(parser);
        self
    }

    pub fn build(self) -> Result<RecordDecoder> {
        let plan = Plan::build(&self.old_schema, &self.projection, &self.codecs)?;
        let decoder = RecordDecoder {
            old_schema: self.old_schema,
            projection: self.projection,
            codecs: self.codecs,
            geometry: self.geometry,
            plan,
        };
        decoder.log_configuration("decoder created");
        Ok(decoder)
    }
}
