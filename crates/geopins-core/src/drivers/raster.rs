//! Raster driver: `RasterGrid` in GeoTIFF files.

use geopins_core_common::{Meta, PinStorage, PinWriteOptions, RasterGrid};
use geopins_geotiff::{read_geotiff, write_geotiff};

use super::upload::{download_single, upload_encoded};
use crate::error::{Mode, Result, driver_not_supported};
use crate::infer::{Dtype, infer_driver_info};

/// Filetype used when the write options leave the type unset.
pub const DEFAULT_RASTER_TYPE: &str = "tif";

/// Reads the `RasterGrid` stored in a pin.
///
/// # Errors
///
/// Fails with a driver error when the pin does not hold a raster, and with
/// board or codec errors when it cannot be downloaded or decoded.
pub fn pin_read_raster<B>(
    name: &str,
    version: Option<&str>,
    hash: Option<&str>,
    board: &B,
) -> Result<RasterGrid>
where
    B: PinStorage + ?Sized,
{
    let meta = board.pin_fetch(name, version)?;
    let info = infer_driver_info(&meta, board)?;
    if info.dtype != Some(Dtype::Raster) {
        return Err(
            driver_not_supported(&info.filetype, RasterGrid::TYPE_NAME, Mode::Read).into(),
        );
    }
    read_raster(
        &info.filetype,
        name,
        Some(meta.version.version.as_str()),
        hash,
        board,
    )
}

pub(crate) fn read_raster<B>(
    filetype: &str,
    name: &str,
    version: Option<&str>,
    hash: Option<&str>,
    board: &B,
) -> Result<RasterGrid>
where
    B: PinStorage + ?Sized,
{
    if filetype != "tif" {
        return Err(driver_not_supported(filetype, RasterGrid::TYPE_NAME, Mode::Read).into());
    }
    let path = download_single(board, name, version, hash)?;
    Ok(read_geotiff(&path)?)
}

/// Writes a `RasterGrid` as a new GeoTIFF pin version.
///
/// # Errors
///
/// Fails for any filetype other than `tif`, for options listed in
/// [`ConfigError`](crate::error::ConfigError), and when encoding or uploading
/// fails.
pub fn pin_write_raster<B>(raster: &RasterGrid, options: &PinWriteOptions, board: &B) -> Result<Meta>
where
    B: PinStorage + ?Sized,
{
    let filetype = options.pin_type.as_deref().unwrap_or(DEFAULT_RASTER_TYPE);
    if filetype != "tif" {
        return Err(driver_not_supported(filetype, RasterGrid::TYPE_NAME, Mode::Write).into());
    }
    upload_encoded(board, options, RasterGrid::TYPE_NAME, "tif", |path| {
        write_geotiff(path, raster)
    })
}
