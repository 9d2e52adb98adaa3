//! OGC GeoPackage codec for geometry tables.
//!
//! A [`GeoTable`](geopins_core_common::GeoTable) is stored as one feature
//! table in a SQLite database carrying the GeoPackage application id and the
//! required `gpkg_*` metadata tables. Geometries are stored as GeoPackage
//! binary blobs: a short header followed by the table's WKB bytes.

pub mod binary;
pub mod reader;
pub mod schema;
pub mod writer;

pub use reader::{list_feature_layers, read_gpkg, read_gpkg_layer};
pub use schema::layer_name;
pub use writer::write_gpkg;

/// `PRAGMA application_id` of a GeoPackage ("GPKG").
pub const GPKG_APPLICATION_ID: i32 = 0x4750_4B47;

/// `PRAGMA user_version` written for GeoPackage 1.4.0.
pub const GPKG_USER_VERSION: i32 = 10400;

/// Name of the integer primary key column of written feature tables.
pub const FID_COLUMN: &str = "fid";
