//! Streaming CSV parser: a lazy, fail-fast sequence of validated concepts.
//!
//! Rows are read one at a time from the underlying reader. The first
//! malformed row or invalid concept ends the sequence; dropping the stream
//! closes the source.
//!
//! Without a header row, fields are taken by position in [`HEADERS`] order.
//! With one, the header must name exactly the schema's fields (in any order)
//! and each data row is read by field name.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, instrument};

use glossimport_shared::{Concept, GlossImportError, HEADERS, Result, Row, matches_schema};

use crate::extract::extract;
use crate::validate::{describe, validate};

/// How a CSV source is laid out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// The first record is a header row naming every schema field exactly
    /// once. When `false`, every record is a data row in schema order.
    pub has_header_row: bool,
}

/// Pull-based iterator over the concepts of one CSV source.
pub struct ConceptStream<R: io::Read = File> {
    reader: csv::Reader<R>,
    record: StringRecord,
    /// Records read so far, header included.
    records: usize,
    /// Data rows read so far (1-based ordinal of the last row).
    row: usize,
    header_pending: bool,
    /// Column names from the header row, when one was read.
    header: Option<Vec<String>>,
    finished: bool,
}

impl ConceptStream<File> {
    /// Open a CSV file for streaming.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, options: ParseOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| GlossImportError::io(path, e))?;
        debug!(has_header_row = options.has_header_row, "opened CSV source");
        Ok(Self::from_reader(file, options))
    }
}

impl<R: io::Read> ConceptStream<R> {
    /// Stream concepts from any reader.
    pub fn from_reader(reader: R, options: ParseOptions) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            reader,
            record: StringRecord::new(),
            records: 0,
            row: 0,
            header_pending: options.has_header_row,
            header: None,
            finished: false,
        }
    }

    /// Number of data rows consumed so far.
    pub fn rows_read(&self) -> usize {
        self.row
    }

    /// Read the next record into `self.record`. `Ok(false)` at end of input.
    fn read_record(&mut self) -> Result<bool> {
        let found = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| GlossImportError::Csv {
                row: self.row + 1,
                message: e.to_string(),
            })?;
        if found {
            self.records += 1;
        }
        Ok(found)
    }

    /// Field values of the current record. A UTF-8 byte order mark on the
    /// very first field of the file is dropped.
    fn values(&self) -> Vec<String> {
        let first_record = self.records == 1;
        self.record
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                if idx == 0 && first_record {
                    value.trim_start_matches('\u{feff}').to_string()
                } else {
                    value.to_string()
                }
            })
            .collect()
    }

    fn check_header(&mut self) -> Result<()> {
        self.header_pending = false;
        if !self.read_record()? {
            return Ok(());
        }
        let values = self.values();
        if !matches_schema(values.iter().map(String::as_str)) {
            return Err(GlossImportError::MalformedHeader {
                found: raw_json(&values),
            });
        }
        if !values.iter().map(String::as_str).eq(HEADERS) {
            debug!("header row names every field in a different column order");
        }
        self.header = Some(values);
        Ok(())
    }

    /// Pair the current values with the schema fields, by header name when a
    /// header was read and by position otherwise.
    fn to_row(&self, values: Vec<String>) -> Option<Row> {
        match &self.header {
            Some(header) if header.len() == values.len() => {
                Row::from_fields(header.iter().zip(values))
            }
            Some(_) => None,
            None => Row::from_record(values),
        }
    }

    fn next_concept(&mut self) -> Result<Option<Concept>> {
        if self.header_pending {
            self.check_header()?;
        }
        if !self.read_record()? {
            return Ok(None);
        }
        self.row += 1;

        let values = self.values();
        let raw_values = raw_json(&values);
        let row = self.to_row(values).ok_or_else(|| GlossImportError::MalformedRow {
            row: self.row,
            raw: raw_values,
        })?;

        let concept = validate(extract(&row)).map_err(|violations| {
            GlossImportError::InvalidConcept {
                row: self.row,
                raw: row.canonical_json(),
                reasons: describe(&violations),
            }
        })?;

        debug!(row = self.row, identifier = %concept.identifier, "parsed concept");
        Ok(Some(concept))
    }
}

impl<R: io::Read> Iterator for ConceptStream<R> {
    type Item = Result<Concept>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_concept() {
            Ok(Some(concept)) => Some(Ok(concept)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: io::Read> std::iter::FusedIterator for ConceptStream<R> {}

/// JSON array of raw field values, for diagnostics.
fn raw_json(values: &[String]) -> String {
    serde_json::to_string(values).expect("a list of strings always serializes to JSON")
}

/// Open `path` and stream its concepts.
pub fn parse_csv(path: &Path, options: ParseOptions) -> Result<ConceptStream<File>> {
    ConceptStream::open(path, options)
}

/// Count the data rows of a CSV file without interpreting them.
pub fn count_rows(path: &Path, options: ParseOptions) -> Result<usize> {
    let file = File::open(path).map_err(|e| GlossImportError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut record = StringRecord::new();
    let mut count = 0usize;
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => count += 1,
            Ok(false) => break,
            Err(e) => {
                return Err(GlossImportError::Csv {
                    row: count + 1,
                    message: e.to_string(),
                });
            }
        }
    }

    if options.has_header_row {
        count = count.saturating_sub(1);
    }
    Ok(count)
}
