//! Registry of pin filetypes and the values each can hold.
//!
//! Pins record a short filetype code (`csv`, `gpkg`, `tif`, ...) in their
//! metadata. This module maps every code either board layer knows to a display
//! name and states which kinds of value can be stored in it: generic board
//! values (tables and JSON), [`GeoTable`] and [`RasterGrid`].
//!
//! # Examples
//!
//! ```
//! use geopins_core::filetypes::{display_name, find_filetype};
//!
//! let gpkg = find_filetype("gpkg").expect("gpkg is registered");
//! assert!(gpkg.support.geo_table.is_supported());
//! assert_eq!(display_name("tif").unwrap(), "GeoTIFF");
//! ```
//!
//! [`GeoTable`]: geopins_core_common::GeoTable
//! [`RasterGrid`]: geopins_core_common::RasterGrid

use crate::error::DriverError;

/// Support status of a filetype for one kind of value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The value can be written to and read from this filetype.
    Supported,
    /// The filetype cannot hold this kind of value.
    NotSupported,
}

impl SupportStatus {
    /// Returns `true` if the filetype is fully supported.
    ///
    /// # Examples
    ///
    /// ```
    /// use geopins_core::filetypes::SupportStatus;
    ///
    /// assert!(SupportStatus::Supported.is_supported());
    /// assert!(!SupportStatus::NotSupported.is_supported());
    /// ```
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    /// Returns the string representation of this support status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
        }
    }
}

/// Which kinds of value a filetype can hold.
#[derive(Debug, Clone, Copy)]
pub struct FiletypeSupport {
    /// Tables and JSON documents handled by the generic board.
    pub generic: SupportStatus,
    /// Vector tables with a geometry column.
    pub geo_table: SupportStatus,
    /// Raster grids.
    pub raster: SupportStatus,
}

/// A registered filetype.
#[derive(Debug, Clone)]
pub struct Filetype {
    /// Code recorded in pin metadata (e.g. `"gpkg"`).
    pub code: &'static str,
    /// Name used in messages (e.g. `"GeoPackage"`).
    pub display_name: &'static str,
    /// Values this filetype can hold.
    pub support: FiletypeSupport,
}

impl Filetype {
    /// Creates a filetype definition.
    #[must_use]
    pub const fn new(
        code: &'static str,
        display_name: &'static str,
        generic: SupportStatus,
        geo_table: SupportStatus,
        raster: SupportStatus,
    ) -> Self {
        Self {
            code,
            display_name,
            support: FiletypeSupport {
                generic,
                geo_table,
                raster,
            },
        }
    }
}

/// Returns every registered filetype.
///
/// `table` and `joblib` are legacy or foreign codes: they are recognized so
/// messages name them properly, but no codec exists for them. The `file` type
/// of uploaded pins is not listed, since nothing can be saved as it.
#[must_use]
pub fn get_filetypes() -> Vec<Filetype> {
    use SupportStatus::{NotSupported, Supported};

    vec![
        Filetype::new("csv", "CSV", Supported, NotSupported, NotSupported),
        Filetype::new("arrow", "Apache Arrow", Supported, NotSupported, NotSupported),
        Filetype::new("feather", "Feather", Supported, NotSupported, NotSupported),
        Filetype::new("table", "CSV", NotSupported, NotSupported, NotSupported),
        Filetype::new("joblib", "Joblib", NotSupported, NotSupported, NotSupported),
        Filetype::new("json", "JSON", Supported, NotSupported, NotSupported),
        Filetype::new("parquet", "Parquet", Supported, Supported, NotSupported),
        Filetype::new("gpkg", "GeoPackage", NotSupported, Supported, NotSupported),
        Filetype::new("geopackage", "GeoPackage", NotSupported, Supported, NotSupported),
        Filetype::new("tif", "GeoTIFF", NotSupported, NotSupported, Supported),
    ]
}

/// Finds a filetype by its code.
#[must_use]
pub fn find_filetype(code: &str) -> Option<Filetype> {
    get_filetypes().into_iter().find(|f| f.code == code)
}

/// Returns the codes of all registered filetypes.
#[must_use]
pub fn get_filetype_codes() -> Vec<&'static str> {
    get_filetypes().iter().map(|f| f.code).collect()
}

/// Display name of a filetype code.
///
/// # Errors
///
/// Returns [`DriverError::UnrecognizedFiletype`] for codes not in the registry.
pub fn display_name(code: &str) -> Result<&'static str, DriverError> {
    find_filetype(code)
        .map(|f| f.display_name)
        .ok_or_else(|| DriverError::UnrecognizedFiletype {
            filetype: code.to_string(),
        })
}
