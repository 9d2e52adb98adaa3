//! In-memory values stored in pins.
//!
//! [`PinData`] holds the values a generic board understands. [`GeoTable`] and
//! [`RasterGrid`] are the geospatial values handled by the drivers in
//! `geopins-core`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::{Array, ArrayRef, BinaryArray, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use geo_types::Geometry;
use geozero::wkb::Wkb;
use geozero::{CoordDimensions, ToGeo, ToWkb};

use crate::error::{CodecError, CodecResult};

/// Runtime type name of a pinned value, used in type mismatch reports.
pub trait PinValue {
    /// Returns the name of the value's type.
    fn type_name(&self) -> &'static str;
}

/// Values understood by a generic pin board.
#[derive(Debug, Clone, PartialEq)]
pub enum PinData {
    /// A plain (non-geospatial) table
    Table(RecordBatch),
    /// An arbitrary JSON document
    Json(serde_json::Value),
}

impl PinValue for PinData {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Table(_) => "RecordBatch",
            Self::Json(_) => "JSON",
        }
    }
}

impl From<RecordBatch> for PinData {
    fn from(batch: RecordBatch) -> Self {
        Self::Table(batch)
    }
}

impl From<serde_json::Value> for PinData {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// A coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    code: u32,
}

impl Crs {
    /// WGS 84 geographic coordinates.
    pub const WGS84: Crs = Crs::from_epsg(4326);

    /// Creates a CRS from an EPSG code.
    #[must_use]
    pub const fn from_epsg(code: u32) -> Self {
        Self { code }
    }

    /// Returns the EPSG code.
    #[must_use]
    pub const fn epsg(&self) -> u32 {
        self.code
    }

    /// Returns `true` for geographic (latitude/longitude) systems.
    ///
    /// EPSG allocates the 4000-4999 range to geographic 2D systems; everything
    /// else is treated as projected.
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        (4000..5000).contains(&self.code)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.code)
    }
}

impl FromStr for Crs {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once(':')
            .filter(|(authority, _)| authority.trim().eq_ignore_ascii_case("EPSG"))
            .and_then(|(_, code)| code.trim().parse::<u32>().ok())
            .map(Self::from_epsg)
            .ok_or_else(|| CodecError::UnsupportedCrs { crs: s.to_string() })
    }
}

/// A geometry-attributed table.
///
/// Attribute columns live next to one geometry column holding WKB-encoded
/// geometries in a `Binary` array.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable {
    batch: RecordBatch,
    geometry_column: String,
    crs: Option<Crs>,
}

impl GeoTable {
    /// Type name reported in type mismatch and driver errors.
    pub const TYPE_NAME: &'static str = "GeoTable";

    /// Column name used by [`GeoTable::from_geometries`].
    pub const DEFAULT_GEOMETRY_COLUMN: &'static str = "geometry";

    /// Wraps a record batch whose `geometry_column` holds WKB values.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingGeometryColumn`] if the column is absent or
    /// is not a `Binary` column.
    pub fn try_new(
        batch: RecordBatch,
        geometry_column: impl Into<String>,
        crs: Option<Crs>,
    ) -> CodecResult<Self> {
        let geometry_column = geometry_column.into();
        let is_wkb = batch
            .schema()
            .field_with_name(&geometry_column)
            .is_ok_and(|field| field.data_type() == &DataType::Binary);
        if !is_wkb {
            return Err(CodecError::MissingGeometryColumn {
                column: geometry_column,
            });
        }

        Ok(Self {
            batch,
            geometry_column,
            crs,
        })
    }

    /// Builds a table from attribute columns and one geometry per row.
    ///
    /// The geometries are appended as a nullable WKB column named
    /// [`GeoTable::DEFAULT_GEOMETRY_COLUMN`].
    ///
    /// # Errors
    ///
    /// Returns an error if the row counts differ or a geometry cannot be
    /// encoded.
    pub fn from_geometries(
        attributes: &RecordBatch,
        geometries: &[Geometry<f64>],
        crs: Option<Crs>,
    ) -> CodecResult<Self> {
        if attributes.num_columns() > 0 && attributes.num_rows() != geometries.len() {
            return Err(CodecError::InvalidData {
                format: "GeoTable".to_string(),
                message: format!(
                    "{} attribute rows but {} geometries",
                    attributes.num_rows(),
                    geometries.len()
                ),
            });
        }

        let wkb = geometries
            .iter()
            .map(|geometry| {
                geometry
                    .to_wkb(CoordDimensions::xy())
                    .map_err(|e| CodecError::Geometry {
                        message: e.to_string(),
                    })
            })
            .collect::<CodecResult<Vec<_>>>()?;
        let geometry_array: ArrayRef = Arc::new(BinaryArray::from_iter_values(wkb));

        let mut fields: Vec<_> = attributes.schema().fields().iter().cloned().collect();
        fields.push(Arc::new(Field::new(
            Self::DEFAULT_GEOMETRY_COLUMN,
            DataType::Binary,
            true,
        )));
        let mut columns = attributes.columns().to_vec();
        columns.push(geometry_array);

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(|e| {
            CodecError::InvalidData {
                format: "GeoTable".to_string(),
                message: e.to_string(),
            }
        })?;

        Self::try_new(batch, Self::DEFAULT_GEOMETRY_COLUMN, crs)
    }

    /// The full record batch, geometry column included.
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Name of the geometry column.
    #[must_use]
    pub fn geometry_column(&self) -> &str {
        &self.geometry_column
    }

    /// Coordinate reference system, if known.
    #[must_use]
    pub fn crs(&self) -> Option<Crs> {
        self.crs
    }

    /// Number of features.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The WKB geometry column.
    #[must_use]
    pub fn geometry_array(&self) -> &BinaryArray {
        // try_new guarantees the column exists and is Binary
        let index = self.geometry_index();
        self.batch.column(index).as_binary::<i32>()
    }

    /// Decodes every geometry; null entries stay `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Geometry`] if a value is not valid WKB.
    pub fn geometries(&self) -> CodecResult<Vec<Option<Geometry<f64>>>> {
        let array = self.geometry_array();
        (0..array.len())
            .map(|i| {
                if array.is_null(i) {
                    return Ok(None);
                }
                Wkb(array.value(i).to_vec())
                    .to_geo()
                    .map(Some)
                    .map_err(|e| CodecError::Geometry {
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    /// The attribute columns without the geometry column.
    #[must_use]
    pub fn attributes(&self) -> RecordBatch {
        let mut batch = self.batch.clone();
        batch.remove_column(self.geometry_index());
        batch
    }

    fn geometry_index(&self) -> usize {
        self.batch
            .schema()
            .index_of(&self.geometry_column)
            .unwrap_or_default()
    }
}

impl PinValue for GeoTable {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

/// North-up affine placement of a raster grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size along X
    pub cell_width: f64,
    /// Cell size along Y, positive (rows run southwards)
    pub cell_height: f64,
}

impl GeoTransform {
    /// Creates a transform from the upper-left corner and cell sizes.
    #[must_use]
    pub const fn new(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_width,
            cell_height,
        }
    }

    /// Coordinates of the centre of a cell.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_centre(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.cell_width,
            self.origin_y - (row as f64 + 0.5) * self.cell_height,
        )
    }
}

/// A regular grid of `f64` cells with spatial referencing.
///
/// Equality treats NaN cells and a NaN nodata value as equal to NaN.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
    transform: GeoTransform,
    crs: Option<Crs>,
    nodata: Option<f64>,
}

impl RasterGrid {
    /// Type name reported in type mismatch and driver errors.
    pub const TYPE_NAME: &'static str = "RasterGrid";

    /// Creates a grid from row-major cell values.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidData`] if the grid is empty, the number of
    /// values is not `width * height`, or a cell size is not positive.
    pub fn try_new(
        width: usize,
        height: usize,
        values: Vec<f64>,
        transform: GeoTransform,
        crs: Option<Crs>,
    ) -> CodecResult<Self> {
        let invalid = |message: String| CodecError::InvalidData {
            format: Self::TYPE_NAME.to_string(),
            message,
        };

        if width == 0 || height == 0 {
            return Err(invalid(format!("empty grid {width} x {height}")));
        }
        if values.len() != width * height {
            return Err(invalid(format!(
                "expected {} values for a {width} x {height} grid, got {}",
                width * height,
                values.len()
            )));
        }
        let positive = |size: f64| size.is_finite() && size > 0.0;
        if !positive(transform.cell_width) || !positive(transform.cell_height) {
            return Err(invalid(format!(
                "cell size must be positive, got {} x {}",
                transform.cell_width, transform.cell_height
            )));
        }

        Ok(Self {
            width,
            height,
            values,
            transform,
            crs,
            nodata: None,
        })
    }

    /// Sets the value marking missing cells.
    #[must_use]
    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// A small fixed grid: 4 columns by 3 rows of 1 m cells in NZTM2000.
    #[must_use]
    pub fn example() -> Self {
        Self {
            width: 4,
            height: 3,
            values: (0..12).map(f64::from).collect(),
            transform: GeoTransform::new(1_570_000.0, 5_180_003.0, 1.0, 1.0),
            crs: Some(Crs::from_epsg(2193)),
            nodata: None,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Spatial placement.
    #[must_use]
    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    /// Coordinate reference system, if known.
    #[must_use]
    pub fn crs(&self) -> Option<Crs> {
        self.crs
    }

    /// Value marking missing cells, if any.
    #[must_use]
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Value of one cell, `None` outside the grid.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// `(min_x, min_y, max_x, max_y)` of the grid extent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let t = &self.transform;
        (
            t.origin_x,
            t.origin_y - self.height as f64 * t.cell_height,
            t.origin_x + self.width as f64 * t.cell_width,
            t.origin_y,
        )
    }
}

#[allow(clippy::float_cmp)]
fn same_cell(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for RasterGrid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.transform == other.transform
            && self.crs == other.crs
            && match (self.nodata, other.nodata) {
                (Some(a), Some(b)) => same_cell(a, b),
                (None, None) => true,
                _ => false,
            }
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(&a, &b)| same_cell(a, b))
    }
}

impl PinValue for RasterGrid {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}
