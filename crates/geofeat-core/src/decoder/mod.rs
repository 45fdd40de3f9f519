//! Decode engine: attribute type table, field selector, record decoder and
//! record stream.

pub mod record;
pub mod selector;
pub mod stream;
pub mod type_table;

pub use record::{RecordDecoder, RecordDecoderBuilder};
pub use selector::FieldSelector;
pub use stream::RecordStream;
pub use type_table::AttributeTypeTable;
