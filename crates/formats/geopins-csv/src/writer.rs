//! CSV writer for table pins

use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;

use arrow_array::RecordBatch;
use arrow_csv::WriterBuilder;
use arrow_schema::ArrowError;
use geopins_core_common::{CodecErrorExt, CodecResult};
use log::debug;

/// Options for CSV writing
#[derive(Debug, Clone)]
pub struct CsvWriterOptions {
    /// Column delimiter (default: b',')
    pub delimiter: u8,
    /// Whether to write header row (default: true)
    pub has_header: bool,
    /// Timestamp format string (default: None)
    pub timestamp_format: Option<String>,
    /// Null value representation (default: empty string)
    pub null_value: String,
}

impl Default for CsvWriterOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            timestamp_format: None,
            null_value: String::new(),
        }
    }
}

impl CsvWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set column delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to write header row
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set timestamp format string
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Set null value representation
    #[must_use]
    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.null_value = null_value.into();
        self
    }
}

/// Write a table to any writer.
///
/// The header is written even when the table has no rows, so the columns
/// survive a round trip.
///
/// # Errors
///
/// Returns an error if writing to the output fails or if CSV serialization fails
pub fn write_csv<W: IoWrite>(
    writer: W,
    batch: &RecordBatch,
    options: &CsvWriterOptions,
) -> Result<(), ArrowError> {
    let mut builder = WriterBuilder::new()
        .with_delimiter(options.delimiter)
        .with_header(options.has_header);

    if let Some(ref format) = options.timestamp_format {
        builder = builder.with_timestamp_format(format.clone());
    }
    if !options.null_value.is_empty() {
        builder = builder.with_null(options.null_value.clone());
    }

    let mut csv_writer = builder.build(writer);
    csv_writer.write(batch)
}

/// Write a table to CSV bytes
///
/// # Errors
///
/// Returns an error if CSV serialization fails
pub fn write_csv_to_bytes(
    batch: &RecordBatch,
    options: &CsvWriterOptions,
) -> Result<Vec<u8>, ArrowError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, batch, options)?;
    Ok(buffer)
}

/// Write a table to a CSV file, replacing any existing file.
///
/// # Errors
///
/// Returns a `CodecError::Write` if the file cannot be created or written.
pub fn write_csv_file(
    path: &Path,
    batch: &RecordBatch,
    options: &CsvWriterOptions,
) -> CodecResult<()> {
    debug!("Writing {} rows as CSV to {}", batch.num_rows(), path.display());

    let file = File::create(path).with_write_context("CSV", path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, batch, options).with_write_context("CSV", path)?;
    writer.flush().with_write_context("CSV", path)
}
