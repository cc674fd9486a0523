//! Chunked access to flat tables stored as CSV or as the first sheet of an
//! `.xlsx` workbook.
//!
//! CSV input is streamed record by record. calamine decodes a whole sheet
//! into one `Range`, so workbook input keeps the decoded cells and turns
//! them into string rows one chunk at a time.

use std::fs::File;
use std::path::Path;

use calamine::{DataType, Range};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::energy::prep::error::{PrepError, Result};
use crate::energy::prep::io::excel_read;

/// Default number of rows handed to an extractor at a time.
pub const DEFAULT_CHUNK_SIZE: usize = 200_000;

/// Streams rows of a table in bounded chunks.
pub enum TableReader {
    Csv {
        headers: Vec<String>,
        reader: csv::Reader<File>,
        skipped: usize,
    },
    Sheet {
        headers: Vec<String>,
        range: Range<DataType>,
        next_row: usize,
    },
}

impl TableReader {
    /// Opens a table, choosing the workbook reader for `.xlsx`/`.xlsm` files
    /// and the CSV reader otherwise.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepError::MissingInput(path.to_path_buf()));
        }
        if is_workbook(path) {
            let (headers, range) = excel_read::read_first_sheet(path)?;
            return Ok(TableReader::Sheet {
                headers,
                range,
                next_row: 1,
            });
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();
        Ok(TableReader::Csv {
            headers,
            reader,
            skipped: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        match self {
            TableReader::Csv { headers, .. } | TableReader::Sheet { headers, .. } => headers,
        }
    }

    /// Position of a column by exact (trimmed) header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers().iter().position(|header| header == name)
    }

    /// Number of CSV records that could not be decoded so far.
    pub fn skipped_records(&self) -> usize {
        match self {
            TableReader::Csv { skipped, .. } => *skipped,
            TableReader::Sheet { .. } => 0,
        }
    }

    /// Reads up to `max_rows` rows. An empty chunk means the table is
    /// exhausted. Undecodable CSV records are skipped.
    pub fn next_chunk(&mut self, max_rows: usize) -> Result<Vec<Vec<String>>> {
        let max_rows = max_rows.max(1);
        let mut chunk = Vec::with_capacity(max_rows.min(DEFAULT_CHUNK_SIZE));
        match self {
            TableReader::Csv {
                reader, skipped, ..
            } => {
                let mut record = StringRecord::new();
                while chunk.len() < max_rows {
                    match reader.read_record(&mut record) {
                        Ok(true) => chunk.push(record.iter().map(str::to_string).collect()),
                        Ok(false) => break,
                        Err(error) if error.is_io_error() => return Err(error.into()),
                        Err(error) => {
                            *skipped += 1;
                            debug!(%error, "skipping undecodable CSV record");
                        }
                    }
                }
            }
            TableReader::Sheet {
                range, next_row, ..
            } => {
                let end = range.height().min(next_row.saturating_add(max_rows));
                let width = range.width();
                for row in *next_row..end {
                    chunk.push(
                        (0..width)
                            .map(|col| excel_read::cell_to_string(range.get((row, col))))
                            .collect(),
                    );
                }
                *next_row = end.max(*next_row);
            }
        }
        Ok(chunk)
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            let extension = extension.to_ascii_lowercase();
            extension == "xlsx" || extension == "xlsm"
        })
        .unwrap_or(false)
}
