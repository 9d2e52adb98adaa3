//! Parquet writers for table and geometry table pins

use std::fs::File;
use std::path::Path;

use arrow_array::RecordBatch;
use geopins_core_common::{CodecErrorExt, CodecResult, GeoTable};
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;

use crate::metadata::{GEO_METADATA_KEY, GeoParquetMetadata};

/// Write a plain table as a Parquet file.
///
/// # Errors
///
/// Returns a `CodecError::Write` if the file cannot be created or encoded.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> CodecResult<()> {
    debug!("Writing {} rows as Parquet to {}", batch.num_rows(), path.display());
    write_batch(path, batch, properties(None), "Parquet")
}

/// Write a geometry table as a GeoParquet file.
///
/// # Errors
///
/// Returns an error if a geometry cannot be decoded for the column summary or
/// the file cannot be written.
pub fn write_geoparquet(path: &Path, table: &GeoTable) -> CodecResult<()> {
    let metadata = GeoParquetMetadata::for_table(table)?;
    debug!(
        "Writing {} features as GeoParquet to {} (geometry column '{}')",
        table.num_rows(),
        path.display(),
        metadata.primary_column
    );

    let geo = KeyValue::new(GEO_METADATA_KEY.to_string(), metadata.to_json()?);
    write_batch(path, table.batch(), properties(Some(geo)), "GeoParquet")
}

fn properties(geo: Option<KeyValue>) -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(geo.map(|kv| vec![kv]))
        .build()
}

fn write_batch(
    path: &Path,
    batch: &RecordBatch,
    props: WriterProperties,
    format: &str,
) -> CodecResult<()> {
    let file = File::create(path).with_write_context(format, path)?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).with_write_context(format, path)?;
    writer.write(batch).with_write_context(format, path)?;
    writer.close().with_write_context(format, path)?;
    Ok(())
}
