//! Geospatial board wrapper.
//!
//! [`GeoBoard`] wraps any [`Board`] and implements the same interface. Reads
//! classify the stored file and decode `GeoTable` and `RasterGrid` pins with the
//! geospatial codecs; writes pick a codec from the [`PinObject`] variant.
//! Everything else is handed to the wrapped board untouched, so boards that are
//! not wrapped keep their behaviour.
//!
//! ```no_run
//! use geopins_core::{GeoBoard, PinObject};
//! use geopins_core_common::{Board, PinData, PinWriteOptions, RasterGrid};
//! # fn demo<B>(inner: B) -> geopins_core::Result<()>
//! # where
//! #     B: Board<Value = PinData>,
//! #     geopins_core::GeoPinsError: From<B::Error>,
//! # {
//! let board = GeoBoard::new(inner);
//! board.pin_write(
//!     &PinObject::from(RasterGrid::example()),
//!     &PinWriteOptions::new("elevation"),
//! )?;
//! let raster: RasterGrid = board.pin_read_as("elevation", None, None)?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use arrow_array::RecordBatch;
use geopins_core_common::{
    Board, BoardError, GeoTable, Meta, PinData, PinStorage, PinValue, PinWriteOptions, RasterGrid,
    UploadRequest, VersionMeta,
};
use log::debug;

use crate::drivers::{dispatch_read, dispatch_write};
use crate::error::{GeoPinsError, PinError, Result};
use crate::infer::infer_driver_info;

/// A value read from or written to a [`GeoBoard`].
#[derive(Debug, Clone, PartialEq)]
pub enum PinObject<V> {
    /// A vector table.
    GeoTable(GeoTable),
    /// A raster grid.
    Raster(RasterGrid),
    /// Any value of the wrapped board.
    Other(V),
}

impl<V: PinValue> PinObject<V> {
    /// Class name of the held value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::GeoTable(table) => table.type_name(),
            Self::Raster(raster) => raster.type_name(),
            Self::Other(value) => value.type_name(),
        }
    }
}

impl<V> From<GeoTable> for PinObject<V> {
    fn from(table: GeoTable) -> Self {
        Self::GeoTable(table)
    }
}

impl<V> From<RasterGrid> for PinObject<V> {
    fn from(raster: RasterGrid) -> Self {
        Self::Raster(raster)
    }
}

impl From<PinData> for PinObject<PinData> {
    fn from(value: PinData) -> Self {
        Self::Other(value)
    }
}

impl From<RecordBatch> for PinObject<PinData> {
    fn from(batch: RecordBatch) -> Self {
        Self::Other(PinData::Table(batch))
    }
}

impl From<serde_json::Value> for PinObject<PinData> {
    fn from(json: serde_json::Value) -> Self {
        Self::Other(PinData::Json(json))
    }
}

/// Types a [`PinObject`] can be narrowed to by [`GeoBoard::pin_read_as`].
pub trait FromPinObject<V>: Sized {
    /// Class name reported when the stored pin holds something else.
    const EXPECTED: &'static str;

    /// Returns the held value, or the object unchanged if it is another class.
    ///
    /// # Errors
    ///
    /// Returns the original object when it does not hold `Self`.
    fn from_pin_object(object: PinObject<V>) -> std::result::Result<Self, PinObject<V>>;
}

impl<V> FromPinObject<V> for GeoTable {
    const EXPECTED: &'static str = GeoTable::TYPE_NAME;

    fn from_pin_object(object: PinObject<V>) -> std::result::Result<Self, PinObject<V>> {
        match object {
            PinObject::GeoTable(table) => Ok(table),
            other => Err(other),
        }
    }
}

impl<V> FromPinObject<V> for RasterGrid {
    const EXPECTED: &'static str = RasterGrid::TYPE_NAME;

    fn from_pin_object(object: PinObject<V>) -> std::result::Result<Self, PinObject<V>> {
        match object {
            PinObject::Raster(raster) => Ok(raster),
            other => Err(other),
        }
    }
}

impl FromPinObject<PinData> for PinData {
    const EXPECTED: &'static str = "PinData";

    fn from_pin_object(object: PinObject<PinData>) -> std::result::Result<Self, PinObject<PinData>> {
        match object {
            PinObject::Other(value) => Ok(value),
            other => Err(other),
        }
    }
}

impl FromPinObject<PinData> for RecordBatch {
    const EXPECTED: &'static str = "RecordBatch";

    fn from_pin_object(object: PinObject<PinData>) -> std::result::Result<Self, PinObject<PinData>> {
        match object {
            PinObject::Other(PinData::Table(batch)) => Ok(batch),
            other => Err(other),
        }
    }
}

impl FromPinObject<PinData> for serde_json::Value {
    const EXPECTED: &'static str = "JSON";

    fn from_pin_object(object: PinObject<PinData>) -> std::result::Result<Self, PinObject<PinData>> {
        match object {
            PinObject::Other(PinData::Json(json)) => Ok(json),
            other => Err(other),
        }
    }
}

/// A board that stores `GeoTable` and `RasterGrid` values next to the values of
/// the board it wraps.
#[derive(Debug, Clone)]
pub struct GeoBoard<B> {
    inner: B,
}

impl<B> GeoBoard<B> {
    /// Wraps `inner`.
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    /// The wrapped board.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwraps the board.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B> GeoBoard<B>
where
    B: Board,
    B::Value: PinValue,
    GeoPinsError: From<B::Error>,
{
    /// Reads a pin and checks that it holds a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::TypeMismatch`] when the pin holds another class, or
    /// any error [`Board::pin_read`] returns.
    pub fn pin_read_as<T>(&self, name: &str, version: Option<&str>, hash: Option<&str>) -> Result<T>
    where
        T: FromPinObject<B::Value>,
    {
        let object = self.pin_read(name, version, hash)?;
        T::from_pin_object(object).map_err(|other| {
            PinError::TypeMismatch {
                name: name.to_string(),
                expected: T::EXPECTED.to_string(),
                actual: other.type_name().to_string(),
            }
            .into()
        })
    }
}

impl<B: PinStorage> PinStorage for GeoBoard<B> {
    fn pin_exists(&self, name: &str) -> std::result::Result<bool, BoardError> {
        self.inner.pin_exists(name)
    }

    fn pin_versions(&self, name: &str) -> std::result::Result<Vec<VersionMeta>, BoardError> {
        self.inner.pin_versions(name)
    }

    fn pin_fetch(&self, name: &str, version: Option<&str>) -> std::result::Result<Meta, BoardError> {
        self.inner.pin_fetch(name, version)
    }

    fn pin_download(
        &self,
        name: &str,
        version: Option<&str>,
        hash: Option<&str>,
    ) -> std::result::Result<Vec<PathBuf>, BoardError> {
        self.inner.pin_download(name, version, hash)
    }

    fn pin_upload(
        &self,
        paths: &[PathBuf],
        request: &UploadRequest,
    ) -> std::result::Result<Meta, BoardError> {
        self.inner.pin_upload(paths, request)
    }

    fn construct_path(&self, elements: &[&str]) -> PathBuf {
        self.inner.construct_path(elements)
    }

    fn validate_pin_name(&self, name: &str) -> std::result::Result<(), BoardError> {
        self.inner.validate_pin_name(name)
    }
}

impl<B> Board for GeoBoard<B>
where
    B: Board,
    GeoPinsError: From<B::Error>,
{
    type Value = PinObject<B::Value>;
    type Error = GeoPinsError;

    fn pin_read(
        &self,
        name: &str,
        version: Option<&str>,
        hash: Option<&str>,
    ) -> Result<PinObject<B::Value>> {
        let meta = self.inner.pin_fetch(name, version)?;
        let info = infer_driver_info(&meta, &self.inner)?;
        debug!("Reading pin '{name}' version '{}'", meta.version.version);
        dispatch_read(
            &info,
            name,
            Some(meta.version.version.as_str()),
            hash,
            &self.inner,
        )
    }

    fn pin_write(&self, value: &PinObject<B::Value>, options: &PinWriteOptions) -> Result<Meta> {
        dispatch_write(value, options, &self.inner)
    }
}

/// Extension for wrapping any board in a [`GeoBoard`].
pub trait IntoGeoBoard: Board + Sized {
    /// Wraps `self` in a [`GeoBoard`].
    fn into_geo_board(self) -> GeoBoard<Self> {
        GeoBoard::new(self)
    }
}

impl<B: Board> IntoGeoBoard for B {}
