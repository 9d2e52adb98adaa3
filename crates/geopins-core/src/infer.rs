//! Inference of the stored datatype and filetype of a pin.
//!
//! Only the pin metadata is needed to classify most pins: the extension of the
//! single stored file decides. `.parquet` is shared by plain tables and
//! GeoParquet, so for those the Parquet footer is inspected for the `geo`
//! key/value entry without decoding any row group.

use std::fmt;
use std::path::{Path, PathBuf};

use geopins_core_common::{GeoTable, Meta, PinFile, PinStorage, RasterGrid};
use geopins_parquet::has_geo_metadata;
use log::debug;

use crate::error::{PinError, Result};

/// Datatypes with a dedicated geospatial codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    /// A vector table, read as [`GeoTable`].
    Gdf,
    /// A raster grid, read as [`RasterGrid`].
    Raster,
}

impl Dtype {
    /// Class name of the values of this datatype.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Dtype::Gdf => GeoTable::TYPE_NAME,
            Dtype::Raster => RasterGrid::TYPE_NAME,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Gdf => f.write_str("gdf"),
            Dtype::Raster => f.write_str("raster"),
        }
    }
}

/// Classification of one pin version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    /// Dedicated datatype, `None` for pins the generic board reads.
    pub dtype: Option<Dtype>,
    /// Filetype code of the stored file.
    pub filetype: String,
}

impl DriverInfo {
    fn new(dtype: Dtype, filetype: &str) -> Self {
        Self {
            dtype: Some(dtype),
            filetype: filetype.to_string(),
        }
    }

    fn generic(meta: &Meta) -> Self {
        Self {
            dtype: None,
            filetype: meta.pin_type.clone(),
        }
    }

    /// Returns `true` when a geospatial codec handles this pin.
    #[must_use]
    pub fn is_specialized(&self) -> bool {
        self.dtype.is_some()
    }
}

/// Local path(s) of the files of a pin version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinnedPath {
    /// The pin holds one file.
    Single(PathBuf),
    /// The pin holds several files, in recorded order.
    Multiple(Vec<PathBuf>),
}

/// Classifies a pin from its metadata.
///
/// `probe` answers whether the stored Parquet file carries GeoParquet metadata.
/// It is only called for a single `.parquet` file, and its errors propagate.
///
/// # Errors
///
/// Returns the probe's error when the Parquet footer cannot be inspected.
pub fn classify<F>(meta: &Meta, probe: F) -> Result<DriverInfo>
where
    F: FnOnce() -> Result<bool>,
{
    let PinFile::Single(file) = &meta.file else {
        return Ok(DriverInfo::generic(meta));
    };

    let info = match Path::new(file).extension().and_then(|ext| ext.to_str()) {
        Some("tif") => DriverInfo::new(Dtype::Raster, "tif"),
        Some("gpkg") => DriverInfo::new(Dtype::Gdf, "gpkg"),
        Some("parquet") => {
            if probe()? {
                DriverInfo::new(Dtype::Gdf, "parquet")
            } else {
                DriverInfo::generic(meta)
            }
        }
        _ => DriverInfo::generic(meta),
    };
    Ok(info)
}

/// Classifies a pin stored on `board`.
///
/// The GeoParquet probe reads the pinned file in place when the board path is
/// local and downloads the version otherwise.
///
/// # Errors
///
/// Returns an error if the Parquet footer cannot be read (corrupt, truncated
/// or missing file) or the download fails.
pub fn infer_driver_info<B>(meta: &Meta, board: &B) -> Result<DriverInfo>
where
    B: PinStorage + ?Sized,
{
    let info = classify(meta, || {
        let path = local_parquet_path(meta, board)?;
        debug!("Inspecting Parquet footer of {}", path.display());
        Ok(has_geo_metadata(&path)?)
    })?;
    debug!(
        "Pin '{}' classified as {} ({})",
        meta.name,
        info.dtype.map_or_else(|| "generic".to_string(), |d| d.to_string()),
        info.filetype
    );
    Ok(info)
}

/// Resolves the board path(s) of the files of a pin version.
#[must_use]
pub fn pinned_file_path<B>(meta: &Meta, board: &B) -> PinnedPath
where
    B: PinStorage + ?Sized,
{
    let pin_path = board.construct_path(&[meta.name.as_str(), meta.version.version.as_str()]);
    match &meta.file {
        PinFile::Single(file) => PinnedPath::Single(pin_path.join(file)),
        PinFile::Multiple(files) => {
            PinnedPath::Multiple(files.iter().map(|file| pin_path.join(file)).collect())
        }
    }
}

fn local_parquet_path<B>(meta: &Meta, board: &B) -> Result<PathBuf>
where
    B: PinStorage + ?Sized,
{
    match pinned_file_path(meta, board) {
        PinnedPath::Single(path) if path.is_file() => return Ok(path),
        _ => {}
    }

    debug!("Pin '{}' is not local, downloading", meta.name);
    let mut paths = board.pin_download(&meta.name, Some(meta.version.version.as_str()), None)?;
    if paths.len() != 1 {
        return Err(PinError::FileCount {
            actual: paths.len(),
        }
        .into());
    }
    Ok(paths.remove(0))
}
