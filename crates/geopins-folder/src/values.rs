//! Encoding of generic pin values.
//!
//! | Value | Types | Default |
//! |---|---|---|
//! | `PinData::Table` | `csv`, `parquet`, `arrow`, `feather` | `csv` |
//! | `PinData::Json` | `json` | `json` |
//!
//! `arrow` and `feather` are both written as Arrow IPC files.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow_array::RecordBatch;
use geopins_core_common::{BoardError, CodecErrorExt, CodecResult, PinData, PinValue};
use geopins_csv::{CsvReadOptions, CsvWriterOptions, read_csv_file, write_csv_file};
use geopins_parquet::{read_parquet, write_parquet};

/// Types a table value can be written as.
pub const TABLE_TYPES: [&str; 4] = ["csv", "parquet", "arrow", "feather"];

/// Types a JSON value can be written as.
pub const JSON_TYPES: [&str; 1] = ["json"];

/// Type used when the caller does not choose one.
#[must_use]
pub fn default_type(value: &PinData) -> &'static str {
    match value {
        PinData::Table(_) => "csv",
        PinData::Json(_) => "json",
    }
}

/// Checks that `value` can be written as `pin_type`.
///
/// # Errors
///
/// Returns [`BoardError::CannotSave`] for types this board never writes and
/// [`BoardError::ValueNotSupported`] for types meant for another kind of value.
pub fn check_writable(value: &PinData, pin_type: &str) -> Result<(), BoardError> {
    let accepted: &[&str] = match value {
        PinData::Table(_) => &TABLE_TYPES,
        PinData::Json(_) => &JSON_TYPES,
    };
    if accepted.contains(&pin_type) {
        return Ok(());
    }
    if TABLE_TYPES.contains(&pin_type) || JSON_TYPES.contains(&pin_type) {
        return Err(BoardError::ValueNotSupported {
            filetype: pin_type.to_string(),
            value_type: value.type_name().to_string(),
        });
    }
    Err(BoardError::CannotSave {
        filetype: pin_type.to_string(),
    })
}

/// Default title of a written value.
#[must_use]
pub fn default_title(name: &str, value: &PinData) -> String {
    match value {
        PinData::Table(batch) => format!(
            "{name}: a pinned {} x {} table",
            batch.num_rows(),
            batch.num_columns()
        ),
        PinData::Json(_) => format!("{name}: a pinned JSON document"),
    }
}

/// Writes `value` to `path` as `pin_type`.
///
/// # Errors
///
/// Returns an error if the type does not fit the value or encoding fails.
pub fn write_value(path: &Path, value: &PinData, pin_type: &str) -> Result<(), BoardError> {
    check_writable(value, pin_type)?;
    match (value, pin_type) {
        (PinData::Table(batch), "csv") => {
            write_csv_file(path, batch, &CsvWriterOptions::default())?;
        }
        (PinData::Table(batch), "parquet") => write_parquet(path, batch)?,
        (PinData::Table(batch), _) => write_ipc(path, batch)?,
        (PinData::Json(json), _) => write_json(path, json)?,
    }
    Ok(())
}

/// Reads the file at `path` as `pin_type`.
///
/// # Errors
///
/// Returns [`BoardError::NoDriver`] for types without a reader, or a codec
/// error if decoding fails.
pub fn read_value(path: &Path, pin_type: &str) -> Result<PinData, BoardError> {
    let value = match pin_type {
        "csv" => PinData::Table(read_csv_file(path, &CsvReadOptions::default())?),
        "parquet" => PinData::Table(read_parquet(path)?),
        "arrow" | "feather" => PinData::Table(read_ipc(path)?),
        "json" => PinData::Json(read_json(path)?),
        other => {
            return Err(BoardError::NoDriver {
                filetype: other.to_string(),
            });
        }
    };
    Ok(value)
}

fn write_ipc(path: &Path, batch: &RecordBatch) -> CodecResult<()> {
    let file = File::create(path).with_write_context("Arrow IPC", path)?;
    let mut writer = FileWriter::try_new(BufWriter::new(file), &batch.schema())
        .with_write_context("Arrow IPC", path)?;
    writer.write(batch).with_write_context("Arrow IPC", path)?;
    writer.finish().with_write_context("Arrow IPC", path)
}

fn read_ipc(path: &Path) -> CodecResult<RecordBatch> {
    let file = File::open(path).with_read_context("Arrow IPC", path)?;
    let reader =
        FileReader::try_new(BufReader::new(file), None).with_read_context("Arrow IPC", path)?;
    let schema = reader.schema();
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_read_context("Arrow IPC", path)?;
    concat_batches(&schema, &batches).with_read_context("Arrow IPC", path)
}

fn write_json(path: &Path, json: &serde_json::Value) -> CodecResult<()> {
    let file = File::create(path).with_write_context("JSON", path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, json).with_write_context("JSON", path)?;
    writer.flush().with_write_context("JSON", path)
}

fn read_json(path: &Path) -> CodecResult<serde_json::Value> {
    let file = File::open(path).with_read_context("JSON", path)?;
    serde_json::from_reader(BufReader::new(file)).with_read_context("JSON", path)
}
