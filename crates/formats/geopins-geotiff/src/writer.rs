//! GeoTIFF writer

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geopins_core_common::{CodecError, CodecErrorExt, CodecResult, RasterGrid};
use log::debug;
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

use crate::geokeys::GeoKeyDirectory;

const FORMAT: &str = "GeoTIFF";

/// Write a raster grid as a single-band `f64` GeoTIFF.
///
/// # Errors
///
/// Returns an error if the CRS cannot be expressed as GeoKeys, the grid is
/// larger than a TIFF dimension allows, or the file cannot be written.
pub fn write_geotiff(path: &Path, raster: &RasterGrid) -> CodecResult<()> {
    debug!(
        "Writing {}x{} raster as GeoTIFF to {}",
        raster.width(),
        raster.height(),
        path.display()
    );

    let dimension = |size: usize| {
        u32::try_from(size).map_err(|_| CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: format!("dimension {size} exceeds the TIFF limit"),
        })
    };
    let width = dimension(raster.width())?;
    let height = dimension(raster.height())?;
    let geokeys = GeoKeyDirectory::for_crs(raster.crs())?.to_tag();

    let transform = raster.transform();
    let pixel_scale = [transform.cell_width, transform.cell_height, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0];
    let nodata = raster.nodata().map(|value| value.to_string());

    let file = File::create(path).with_write_context(FORMAT, path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).with_write_context(FORMAT, path)?;
    let mut image = encoder
        .new_image::<colortype::Gray64Float>(width, height)
        .with_write_context(FORMAT, path)?;

    let directory = image.encoder();
    directory
        .write_tag(Tag::ModelPixelScaleTag, &pixel_scale[..])
        .with_write_context(FORMAT, path)?;
    directory
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .with_write_context(FORMAT, path)?;
    directory
        .write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])
        .with_write_context(FORMAT, path)?;
    if let Some(nodata) = nodata.as_deref() {
        directory
            .write_tag(Tag::GdalNodata, nodata)
            .with_write_context(FORMAT, path)?;
    }

    image
        .write_data(raster.values())
        .with_write_context(FORMAT, path)
}
