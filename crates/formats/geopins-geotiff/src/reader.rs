//! GeoTIFF reader

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geopins_core_common::{CodecError, CodecErrorExt, CodecResult, GeoTransform, RasterGrid};
use log::{debug, warn};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::geokeys::GeoKeyDirectory;

const FORMAT: &str = "GeoTIFF";

/// Read the first band of a GeoTIFF into a raster grid.
///
/// Any integer or float sample type is widened to `f64`. Files without a
/// pixel scale and tiepoint are placed at the origin with unit cells.
///
/// # Errors
///
/// Returns an error if the file cannot be decoded, carries more than one
/// sample per pixel, or has malformed GeoTIFF tags.
pub fn read_geotiff(path: &Path) -> CodecResult<RasterGrid> {
    debug!("Reading GeoTIFF from {}", path.display());

    let file = File::open(path).with_read_context(FORMAT, path)?;
    let mut decoder = Decoder::new(BufReader::new(file)).with_read_context(FORMAT, path)?;
    let (width, height) = decoder.dimensions().with_read_context(FORMAT, path)?;

    let pixel_scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)
        .with_read_context(FORMAT, path)?
        .map(tiff::decoder::ifd::Value::into_f64_vec)
        .transpose()
        .with_read_context(FORMAT, path)?;
    let tiepoint = decoder
        .find_tag(Tag::ModelTiepointTag)
        .with_read_context(FORMAT, path)?
        .map(tiff::decoder::ifd::Value::into_f64_vec)
        .transpose()
        .with_read_context(FORMAT, path)?;
    let geokeys = decoder
        .find_tag(Tag::GeoKeyDirectoryTag)
        .with_read_context(FORMAT, path)?
        .map(tiff::decoder::ifd::Value::into_u16_vec)
        .transpose()
        .with_read_context(FORMAT, path)?;
    let nodata = decoder
        .find_tag(Tag::GdalNodata)
        .with_read_context(FORMAT, path)?
        .map(tiff::decoder::ifd::Value::into_string)
        .transpose()
        .with_read_context(FORMAT, path)?;

    let transform = geo_transform(pixel_scale.as_deref(), tiepoint.as_deref())?;
    let crs = match geokeys {
        Some(values) => GeoKeyDirectory::from_tag(&values)?.crs(),
        None => None,
    };

    let width = usize::try_from(width).with_read_context(FORMAT, path)?;
    let height = usize::try_from(height).with_read_context(FORMAT, path)?;
    let image = decoder.read_image().with_read_context(FORMAT, path)?;
    let values = widen(image);
    if values.len() != width * height {
        return Err(CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: format!(
                "expected {} samples for a single band {width}x{height} image, got {}",
                width * height,
                values.len()
            ),
        });
    }

    let raster = RasterGrid::try_new(width, height, values, transform, crs)?;
    Ok(match nodata.as_deref().and_then(parse_nodata) {
        Some(nodata) => raster.with_nodata(nodata),
        None => raster,
    })
}

fn geo_transform(
    pixel_scale: Option<&[f64]>,
    tiepoint: Option<&[f64]>,
) -> CodecResult<GeoTransform> {
    match (pixel_scale, tiepoint) {
        (Some([sx, sy, ..]), Some([i, j, _, x, y, ..])) => Ok(GeoTransform::new(
            x - i * sx,
            y + j * sy,
            *sx,
            *sy,
        )),
        (None, None) => {
            warn!("GeoTIFF has no pixel scale or tiepoint, using unit cells at the origin");
            Ok(GeoTransform::new(0.0, 0.0, 1.0, 1.0))
        }
        _ => Err(CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: "incomplete ModelPixelScale/ModelTiepoint tags".to_string(),
        }),
    }
}

fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(char::from(0)).trim();
    let parsed = trimmed.parse().ok();
    if parsed.is_none() {
        warn!("Ignoring unparsable GDAL_NODATA value '{trimmed}'");
    }
    parsed
}

#[allow(clippy::cast_precision_loss)]
fn widen(image: DecodingResult) -> Vec<f64> {
    match image {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}
