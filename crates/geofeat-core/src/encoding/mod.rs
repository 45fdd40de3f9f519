//! Wire encoding: primitive reader, per-type codecs, and a test-only writer.

pub mod codec;
pub mod reader;
#[cfg(any(test, feature = "test-utils"))]
pub mod writer;

pub use codec::{CodecTable, FieldCodec};
pub use reader::BinaryReader;
