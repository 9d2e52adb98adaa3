//! GeoTIFF codec for raster grids.
//!
//! Grids are written as single-band 64-bit float TIFFs. Placement is stored
//! with `ModelPixelScale` and `ModelTiepoint`, the CRS in the GeoKey
//! directory and the nodata value in the GDAL nodata tag, so GDAL-based tools
//! read the files as regular GeoTIFFs.

pub mod geokeys;
pub mod reader;
pub mod writer;

pub use geokeys::GeoKeyDirectory;
pub use reader::read_geotiff;
pub use writer::write_geotiff;
