//! Parquet readers and footer inspection

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow_array::RecordBatch;
use geopins_core_common::{CodecError, CodecErrorExt, CodecResult, GeoTable};
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::metadata::KeyValue;
use parquet::file::reader::{FileReader, SerializedFileReader};

use crate::metadata::{GEO_METADATA_KEY, GeoParquetMetadata};

/// Returns `true` if the Parquet file at `path` carries GeoParquet metadata.
///
/// Only the footer is read; no column data is decoded.
///
/// # Errors
///
/// Returns a `CodecError::Read` with format `Parquet` if the file is missing,
/// truncated or not a Parquet file.
pub fn has_geo_metadata(path: &Path) -> CodecResult<bool> {
    Ok(footer_value(path, GEO_METADATA_KEY)?.is_some())
}

/// Reads the GeoParquet metadata document from the footer, if present.
///
/// # Errors
///
/// Returns an error if the footer cannot be read or the document is malformed.
pub fn read_geo_metadata(path: &Path) -> CodecResult<Option<GeoParquetMetadata>> {
    footer_value(path, GEO_METADATA_KEY)?
        .map(|json| GeoParquetMetadata::from_json(&json))
        .transpose()
}

/// Read a Parquet file into one table.
///
/// Schema-level metadata (including the `geo` document) is dropped from the
/// returned batch.
///
/// # Errors
///
/// Returns a `CodecError::Read` if the file cannot be opened or decoded.
pub fn read_parquet(path: &Path) -> CodecResult<RecordBatch> {
    debug!("Reading Parquet from {}", path.display());
    read_batch(path, "Parquet")
}

/// Read a GeoParquet file into a geometry table.
///
/// # Errors
///
/// Returns an error if the file has no `geo` metadata, its primary column is
/// not WKB, or the file cannot be decoded.
pub fn read_geoparquet(path: &Path) -> CodecResult<GeoTable> {
    debug!("Reading GeoParquet from {}", path.display());

    let metadata = read_geo_metadata(path)?.ok_or_else(|| CodecError::InvalidData {
        format: "GeoParquet".to_string(),
        message: format!("'{}' has no '{GEO_METADATA_KEY}' metadata", path.display()),
    })?;
    let crs = metadata.primary()?.epsg();
    let batch = read_batch(path, "GeoParquet")?;

    GeoTable::try_new(batch, metadata.primary_column, crs)
}

fn footer_value(path: &Path, key: &str) -> CodecResult<Option<String>> {
    let file = File::open(path).with_read_context("Parquet", path)?;
    let reader = SerializedFileReader::new(file).with_read_context("Parquet", path)?;

    let value = reader
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|entries| find_key(entries, key));
    debug!(
        "Parquet footer of {} {} '{key}' metadata",
        path.display(),
        if value.is_some() { "has" } else { "has no" }
    );
    Ok(value)
}

fn find_key(entries: &[KeyValue], key: &str) -> Option<String> {
    entries
        .iter()
        .find(|entry| entry.key == key)
        .map(|entry| entry.value.clone().unwrap_or_default())
}

fn read_batch(path: &Path, format: &str) -> CodecResult<RecordBatch> {
    let file = File::open(path).with_read_context(format, path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).with_read_context(format, path)?;

    let schema = Arc::new(builder.schema().as_ref().clone().with_metadata(HashMap::new()));
    let reader = builder.build().with_read_context(format, path)?;
    let batches = reader
        .map(|batch| batch.and_then(|b| RecordBatch::try_new(schema.clone(), b.columns().to_vec())))
        .collect::<Result<Vec<_>, _>>()
        .with_read_context(format, path)?;

    concat_batches(&schema, &batches).with_read_context(format, path)
}
