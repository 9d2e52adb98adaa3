//! Codec selection for reads and writes.
//!
//! | Datatype | Filetypes | Default |
//! |---|---|---|
//! | `GeoTable` | `gpkg`, `geopackage`, `parquet` | `gpkg` |
//! | `RasterGrid` | `tif` | `tif` |
//!
//! Everything else goes to the wrapped board unchanged.

pub mod gdf;
pub mod raster;
mod upload;

use geopins_core_common::{Board, Meta, PinWriteOptions};
use log::debug;

use crate::boards::PinObject;
use crate::error::{GeoPinsError, Result};
use crate::infer::{Dtype, DriverInfo};

pub use crate::error::{Mode, driver_not_supported};
pub use gdf::{DEFAULT_GDF_TYPE, pin_read_gdf, pin_write_gdf};
pub use raster::{DEFAULT_RASTER_TYPE, pin_read_raster, pin_write_raster};

/// Reads a classified pin with the matching codec.
///
/// Pins without a dedicated datatype are read by `board` itself.
///
/// # Errors
///
/// Returns a driver error when the classification names a filetype without a
/// codec for its datatype, or any board or codec error met while reading.
pub fn dispatch_read<B>(
    info: &DriverInfo,
    name: &str,
    version: Option<&str>,
    hash: Option<&str>,
    board: &B,
) -> Result<PinObject<B::Value>>
where
    B: Board + ?Sized,
    GeoPinsError: From<B::Error>,
{
    debug!("Dispatching read of pin '{name}' ({})", info.filetype);
    let object = match info.dtype {
        Some(Dtype::Gdf) => PinObject::GeoTable(gdf::read_gdf(
            &info.filetype,
            name,
            version,
            hash,
            board,
        )?),
        Some(Dtype::Raster) => PinObject::Raster(raster::read_raster(
            &info.filetype,
            name,
            version,
            hash,
            board,
        )?),
        None => PinObject::Other(board.pin_read(name, version, hash)?),
    };
    Ok(object)
}

/// Writes a value with the codec chosen by its variant and the requested type.
///
/// # Errors
///
/// Returns a driver error for filetypes that cannot hold the value, a config
/// error for unsupported options, or any board or codec error met while writing.
pub fn dispatch_write<B>(
    object: &PinObject<B::Value>,
    options: &PinWriteOptions,
    board: &B,
) -> Result<Meta>
where
    B: Board + ?Sized,
    GeoPinsError: From<B::Error>,
{
    match object {
        PinObject::GeoTable(table) => pin_write_gdf(table, options, board),
        PinObject::Raster(raster) => pin_write_raster(raster, options, board),
        PinObject::Other(value) => Ok(board.pin_write(value, options)?),
    }
}
