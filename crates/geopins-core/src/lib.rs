//! `geopins-core` adds vector and raster datatypes to pin boards.
//!
//! This crate includes:
//! - **Filetype Registry**: the filetype codes pins record and the values each can hold.
//! - **Driver Inference**: classification of a stored pin from its metadata, reading
//!   only the Parquet footer when `.parquet` is ambiguous.
//! - **Drivers**: `GeoTable` ⇄ GeoPackage / GeoParquet and `RasterGrid` ⇄ GeoTIFF,
//!   with dispatch between them and the wrapped board.
//! - **Board Facade**: [`GeoBoard`], a wrapper implementing the same board traits.

pub mod boards;
pub mod drivers;
pub mod error;
pub mod filetypes;
pub mod infer;

pub use boards::{FromPinObject, GeoBoard, IntoGeoBoard, PinObject};
pub use error::{ConfigError, DriverError, GeoPinsError, IoError, PinError, Result};
pub use infer::{DriverInfo, Dtype, PinnedPath, classify, infer_driver_info, pinned_file_path};
