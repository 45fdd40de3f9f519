//! Decoder configuration loaded from JSON.
//!
//! ```json
//! {
//!   "schema": "name:String,age:Integer,*geom:Point",
//!   "projection": ["name", "geom"],
//!   "max_blob_len": 1048576
//! }
//! ```
//!
//! `schema` may also be a field list: `{"fields": [{"name": "..", "type": ".."}]}`.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decoder::{RecordDecoder, RecordStream};
use crate::error::{ConfigError, Result, SchemaError};
use crate::schema::{Projection, Schema};
use crate::types::DEFAULT_MAX_BLOB_LEN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSource {
    Spec(String),
    Fields(Schema),
}

impl SchemaSource {
    pub fn resolve(&self) -> std::result::Result<Schema, SchemaError> {
        match self {
            SchemaSource::Spec(spec) => Schema::parse_spec(spec),
            SchemaSource::Fields(schema) => Ok(schema.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    pub schema: SchemaSource,
    /// Fields to materialize; all fields when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blob_len: Option<usize>,
}

impl DecoderConfig {
    pub fn from_spec(spec: impl Into<String>) -> Self {
        Self {
            schema: SchemaSource::Spec(spec.into()),
            projection: None,
            max_blob_len: None,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text).map_err(ConfigError::from)?)
    }

    pub fn max_blob_len(&self) -> usize {
        self.max_blob_len.unwrap_or(DEFAULT_MAX_BLOB_LEN)
    }

    /// An absent `projection` selects every field of whichever schema is
    /// current, including after a reconfigure.
    pub fn to_projection(&self) -> Projection {
        match &self.projection {
            Some(names) => Projection::of(names.iter().cloned()),
            None => Projection::all(),
        }
    }

    pub fn build(&self) -> Result<RecordDecoder> {
        let schema = Arc::new(self.schema.resolve()?);
        RecordDecoder::new(schema, self.to_projection())
    }

    /// Build a decoder and wrap `inner` in a record stream honoring
    /// `max_blob_len`.
    pub fn open_stream<R: BufRead>(&self, inner: R) -> Result<RecordStream<R>> {
        Ok(RecordStream::with_max_blob_len(
            self.build()?,
            inner,
            self.max_blob_len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::writer::RecordWriter;
    use crate::error::{Error, StreamError};
    use crate::value::AttributeValue;
    use std::io::Write;

    #[test]
    fn test_spec_string_config() {
        let config = DecoderConfig::from_json(
            r#"{"schema": "name:String,age:Integer,*geom:Point", "projection": ["geom"]}"#,
        )
        .unwrap();
        let decoder = config.build().unwrap();
        assert_eq!(decoder.old_schema().len(), 3);
        assert!(decoder.projection().contains("geom"));
        assert!(!decoder.selector().wants("name"));
        assert_eq!(config.max_blob_len(), DEFAULT_MAX_BLOB_LEN);
    }

    #[test]
    fn test_field_list_config() {
        let config = DecoderConfig::from_json(
            r#"{
                "schema": {"fields": [{"name": "id", "type": "UUID"}, {"name": "dtg", "type": "Date"}]},
                "max_blob_len": 1024
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_blob_len(), 1024);
        let decoder = config.build().unwrap();
        assert!(decoder.selector().is_pass_through());
    }

    #[test]
    fn test_absent_projection_follows_stream_reconfigure() {
        let v2 = Arc::new(Schema::parse_spec("name:String,extra:Long").unwrap());
        let bytes = RecordWriter::new(&v2)
            .identity("f1")
            .set("name", AttributeValue::Text("Bob".into()))
            .set("extra", AttributeValue::Int64(-3))
            .finish();

        let config = DecoderConfig::from_spec("name:String");
        let mut stream = config.open_stream(&bytes[..]).unwrap();
        stream.reconfigure(v2).unwrap();
        let record = stream.next().unwrap().unwrap();
        assert_eq!(record.get("name"), Some(&AttributeValue::Text("Bob".into())));
        assert_eq!(record.get("extra"), Some(&AttributeValue::Int64(-3)));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_max_blob_len_reaches_stream() {
        let schema = Schema::parse_spec("name:String").unwrap();
        let bytes = RecordWriter::new(&schema)
            .identity("f1")
            .set("name", AttributeValue::Text("longer than eight".into()))
            .finish();

        let config =
            DecoderConfig::from_json(r#"{"schema": "name:String", "max_blob_len": 8}"#).unwrap();
        let mut stream = config.open_stream(&bytes[..]).unwrap();
        let err = stream.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Stream(StreamError::LengthTooLarge { max: 8, actual: 17 })
        ));

        let mut roomy = DecoderConfig::from_spec("name:String").open_stream(&bytes[..]).unwrap();
        assert!(roomy.next().unwrap().is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DecoderConfig::from_json(r#"{"schema": "a:String", "projecton": []}"#).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Json(_))));
    }

    #[test]
    fn test_bad_spec_surfaces_schema_error() {
        let config = DecoderConfig::from_spec("a:Decimal");
        assert!(matches!(
            config.build(),
            Err(Error::Schema(SchemaError::UnknownTypeName(_)))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"schema": "name:String"}}"#).unwrap();
        let config = DecoderConfig::load(file.path()).unwrap();
        assert_eq!(config, DecoderConfig::from_spec("name:String"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DecoderConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Io(_))));
    }
}
