//! CSV reader for table pins

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow_array::RecordBatch;
use arrow_csv::ReaderBuilder;
use arrow_csv::reader::Format;
use arrow_schema::ArrowError;
use geopins_core_common::{CodecErrorExt, CodecResult};
use log::debug;

/// Options for CSV reading
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Column delimiter (default: b',')
    pub delimiter: u8,
    /// Whether the first row holds column names (default: true)
    pub has_header: bool,
    /// Rows sampled for schema inference; `None` reads the whole file
    pub max_inference_records: Option<usize>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            max_inference_records: None,
        }
    }
}

impl CsvReadOptions {
    /// Set column delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row holds column names
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Limit the rows used for schema inference
    #[must_use]
    pub fn with_max_inference_records(mut self, records: usize) -> Self {
        self.max_inference_records = Some(records);
        self
    }

    fn format(&self) -> Format {
        Format::default()
            .with_delimiter(self.delimiter)
            .with_header(self.has_header)
    }
}

/// Read a whole CSV source into one table, inferring the schema.
///
/// # Errors
///
/// Returns an error if the source cannot be read or parsed.
pub fn read_csv<R: Read + Seek>(
    mut source: R,
    options: &CsvReadOptions,
) -> Result<RecordBatch, ArrowError> {
    let format = options.format();
    let (schema, _) = format.infer_schema(&mut source, options.max_inference_records)?;
    source.seek(SeekFrom::Start(0))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(source)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    concat_batches(&schema, &batches)
}

/// Read a CSV file into one table.
///
/// # Errors
///
/// Returns a `CodecError::Read` if the file is missing or not valid CSV.
pub fn read_csv_file(path: &Path, options: &CsvReadOptions) -> CodecResult<RecordBatch> {
    debug!("Reading CSV from {}", path.display());

    let file = File::open(path).with_read_context("CSV", path)?;
    read_csv(BufReader::new(file), options).with_read_context("CSV", path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Array;
    use arrow_array::cast::AsArray;
    use arrow_array::types::{Float64Type, Int64Type};
    use arrow_schema::DataType;
    use std::io::Cursor;

    #[test]
    fn test_read_csv_infers_types() {
        let data = "site,river,flow\n57004,Waimakariri,121.5\n62105,Rakaia,\n";
        let batch = read_csv(Cursor::new(data), &CsvReadOptions::default()).unwrap();

        assert_eq!(batch.num_rows(), 2);
        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);

        assert_eq!(batch.column(0).as_primitive::<Int64Type>().value(1), 62105);
        assert!(batch.column(2).as_primitive::<Float64Type>().is_null(1));
    }

    #[test]
    fn test_read_csv_semicolon() {
        let data = "a;b\n1;x\n";
        let options = CsvReadOptions::default().with_delimiter(b';');
        let batch = read_csv(Cursor::new(data), &options).unwrap();
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.column(1).as_string::<i32>().value(0), "x");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv_file(Path::new("/nonexistent/gauges.csv"), &CsvReadOptions::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read CSV file"));
    }
}
