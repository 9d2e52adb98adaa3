//! Parquet and GeoParquet codec.
//!
//! Plain tables are stored as regular Parquet files. Geometry tables follow
//! GeoParquet 1.1: WKB geometry columns described by a JSON document under the
//! `geo` key of the file's key/value metadata. [`has_geo_metadata`] tells the
//! two apart by reading only the footer.

pub mod metadata;
pub mod reader;
pub mod writer;

pub use metadata::{GEO_METADATA_KEY, GeoParquetMetadata, GeometryColumnMetadata};
pub use reader::{has_geo_metadata, read_geo_metadata, read_geoparquet, read_parquet};
pub use writer::{write_geoparquet, write_parquet};
