//! Vector table driver: `GeoTable` in GeoPackage or GeoParquet files.

use geopins_core_common::{GeoTable, Meta, PinStorage, PinWriteOptions};
use geopins_gpkg::{layer_name, read_gpkg, write_gpkg};
use geopins_parquet::{read_geoparquet, write_geoparquet};
use log::debug;

use super::upload::{download_single, upload_encoded};
use crate::error::{Mode, Result, driver_not_supported};
use crate::infer::{Dtype, infer_driver_info};

/// Filetype used when the write options leave the type unset.
pub const DEFAULT_GDF_TYPE: &str = "gpkg";

/// Reads the `GeoTable` stored in a pin.
///
/// # Errors
///
/// Fails with a driver error when the pin does not hold a vector table, and
/// with board or codec errors when it cannot be downloaded or decoded.
pub fn pin_read_gdf<B>(
    name: &str,
    version: Option<&str>,
    hash: Option<&str>,
    board: &B,
) -> Result<GeoTable>
where
    B: PinStorage + ?Sized,
{
    let meta = board.pin_fetch(name, version)?;
    let info = infer_driver_info(&meta, board)?;
    if info.dtype != Some(Dtype::Gdf) {
        return Err(driver_not_supported(&info.filetype, GeoTable::TYPE_NAME, Mode::Read).into());
    }
    read_gdf(
        &info.filetype,
        name,
        Some(meta.version.version.as_str()),
        hash,
        board,
    )
}

pub(crate) fn read_gdf<B>(
    filetype: &str,
    name: &str,
    version: Option<&str>,
    hash: Option<&str>,
    board: &B,
) -> Result<GeoTable>
where
    B: PinStorage + ?Sized,
{
    let table = match filetype {
        "gpkg" => read_gpkg(&download_single(board, name, version, hash)?)?,
        "parquet" => read_geoparquet(&download_single(board, name, version, hash)?)?,
        other => {
            return Err(driver_not_supported(other, GeoTable::TYPE_NAME, Mode::Read).into());
        }
    };
    debug!(
        "Read {} features from pin '{name}' ({filetype})",
        table.num_rows()
    );
    Ok(table)
}

/// Writes a `GeoTable` as a new pin version.
///
/// `gpkg` (the default) and `geopackage` write a GeoPackage whose layer is
/// named after the pin, prefixed with `layer_` when the pin name starts like a
/// reserved SQLite or GeoPackage table; `parquet` writes GeoParquet.
///
/// # Errors
///
/// Fails for other filetypes, for options listed in
/// [`ConfigError`](crate::error::ConfigError), and when encoding or uploading
/// fails.
pub fn pin_write_gdf<B>(table: &GeoTable, options: &PinWriteOptions, board: &B) -> Result<Meta>
where
    B: PinStorage + ?Sized,
{
    let filetype = options.pin_type.as_deref().unwrap_or(DEFAULT_GDF_TYPE);
    match filetype {
        "gpkg" | "geopackage" => {
            upload_encoded(board, options, GeoTable::TYPE_NAME, "gpkg", |path| {
                write_gpkg(path, table, &layer_name(&options.name))
            })
        }
        "parquet" => upload_encoded(board, options, GeoTable::TYPE_NAME, "parquet", |path| {
            write_geoparquet(path, table)
        }),
        other => Err(driver_not_supported(other, GeoTable::TYPE_NAME, Mode::Write).into()),
    }
}
