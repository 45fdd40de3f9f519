//! # geofeat
//!
//! Schema-evolving decoder for binary geospatial feature records.
//!
//! Records are written positionally against an *old schema*: a format
//! version, a feature identity, then one value per attribute in schema order
//! with no inline tags. A reader names the attributes it wants (a
//! [`Projection`]); every other attribute is skipped byte-exactly, so the
//! stream cursor always lands on the next record.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::io::BufReader;
//! use std::fs::File;
//!
//! use geofeat_core::decoder::{RecordDecoder, RecordStream};
//! use geofeat_core::schema::{Projection, Schema};
//!
//! let schema = Schema::parse_spec("name:String,age:Integer,uid:UUID,seen:Date,*geom:Point").unwrap();
//! let decoder = RecordDecoder::new(schema, Projection::of(["name", "geom"])).unwrap();
//!
//! let file = BufReader::new(File::open("features.bin").unwrap());
//! for record in RecordStream::new(decoder, file) {
//!     let record = record.unwrap();
//!     println!("{} {:?}", record.identity, record.get("geom"));
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod geometry;
pub mod schema;
pub mod types;
pub mod value;

pub use decoder::{RecordDecoder, RecordStream};
pub use error::{Error, Result};
pub use schema::{Projection, Schema};
pub use value::{AttributeValue, DecodedRecord};
