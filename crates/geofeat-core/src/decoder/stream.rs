//! Iteration over consecutive records in one byte stream.

use std::io::BufRead;
use std::sync::Arc;

use tracing::warn;

use crate::encoding::reader::BinaryReader;
use crate::error::{Error, Result, StreamError};
use crate::schema::Schema;
use crate::types::DEFAULT_MAX_BLOB_LEN;
use crate::value::DecodedRecord;

use super::record::RecordDecoder;

/// Pulls records one at a time from a buffered reader.
///
/// Ends cleanly when input runs out exactly at a record boundary. The first
/// error is yielded once, after which the stream is exhausted: the cursor is
/// no longer trustworthy.
#[derive(Debug)]
pub struct RecordStream<R> {
    decoder: RecordDecoder,
    reader: BinaryReader<R>,
    records: u64,
    done: bool,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(decoder: RecordDecoder, inner: R) -> Self {
        Self::with_max_blob_len(decoder, inner, DEFAULT_MAX_BLOB_LEN)
    }

    pub fn with_max_blob_len(decoder: RecordDecoder, inner: R, max_blob_len: usize) -> Self {
        Self {
            decoder,
            reader: BinaryReader::with_max_blob_len(inner, max_blob_len),
            records: 0,
            done: false,
        }
    }

    /// Switch the old schema for the records that follow.
    pub fn reconfigure(&mut self, old_schema: impl Into<Arc<Schema>>) -> Result<()> {
        self.decoder.reconfigure(old_schema)
    }

    pub fn decoder(&self) -> &RecordDecoder {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut RecordDecoder {
        &mut self.decoder
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Records successfully decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn next_record(&mut self) -> Option<Result<DecodedRecord>> {
        match self.reader.at_eof() {
            Ok(true) => return None,
            Ok(false) => {}
            Err(e) => return Some(Err(e.into())),
        }
        let start = self.reader.position();
        match self.decoder.read(&mut self.reader) {
            Ok(record) => {
                self.records += 1;
                Some(Ok(record))
            }
            Err(e) => {
                if let Error::Stream(StreamError::UnexpectedEof { .. }) = e {
                    warn!(
                        record = self.records,
                        start,
                        position = self.reader.position(),
                        "stream ended inside a record"
                    );
                }
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_record();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<R: BufRead> std::iter::FusedIterator for RecordStream<R> {}
