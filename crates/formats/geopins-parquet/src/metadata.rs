//! GeoParquet file metadata.

use std::collections::BTreeMap;

use geo_types::Geometry;
use geopins_core_common::{CodecError, CodecResult, Crs, GeoTable};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Footer key holding the GeoParquet metadata document.
pub const GEO_METADATA_KEY: &str = "geo";

/// GeoParquet specification version written by this crate.
pub const GEOPARQUET_VERSION: &str = "1.1.0";

const WKB_ENCODING: &str = "WKB";

/// Top-level GeoParquet metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoParquetMetadata {
    /// Specification version
    pub version: String,
    /// Name of the default geometry column
    pub primary_column: String,
    /// Per-column geometry metadata
    pub columns: BTreeMap<String, GeometryColumnMetadata>,
}

/// Metadata of one geometry column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryColumnMetadata {
    /// Geometry encoding; only `WKB` is supported
    pub encoding: String,
    /// Geometry type names present in the column, empty when unknown
    #[serde(default)]
    pub geometry_types: Vec<String>,
    /// PROJJSON description of the CRS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
}

impl GeoParquetMetadata {
    /// Describes the geometry column of a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a geometry cannot be decoded.
    pub fn for_table(table: &GeoTable) -> CodecResult<Self> {
        let mut geometry_types: Vec<String> = Vec::new();
        for geometry in table.geometries()?.iter().flatten() {
            let name = geometry_type_name(geometry).to_string();
            if !geometry_types.contains(&name) {
                geometry_types.push(name);
            }
        }
        geometry_types.sort();

        let column = GeometryColumnMetadata {
            encoding: WKB_ENCODING.to_string(),
            geometry_types,
            crs: table.crs().map(crs_to_projjson),
        };

        Ok(Self {
            version: GEOPARQUET_VERSION.to_string(),
            primary_column: table.geometry_column().to_string(),
            columns: BTreeMap::from([(table.geometry_column().to_string(), column)]),
        })
    }

    /// Parses the JSON document stored under [`GEO_METADATA_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidData`] if the document is malformed.
    pub fn from_json(json: &str) -> CodecResult<Self> {
        serde_json::from_str(json).map_err(|e| CodecError::InvalidData {
            format: "GeoParquet".to_string(),
            message: format!("invalid '{GEO_METADATA_KEY}' metadata: {e}"),
        })
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidData`] if serialization fails.
    pub fn to_json(&self) -> CodecResult<String> {
        serde_json::to_string(self).map_err(|e| CodecError::InvalidData {
            format: "GeoParquet".to_string(),
            message: e.to_string(),
        })
    }

    /// Metadata of the primary geometry column.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary column is not described or is not WKB.
    pub fn primary(&self) -> CodecResult<&GeometryColumnMetadata> {
        let column = self.columns.get(&self.primary_column).ok_or_else(|| {
            CodecError::MissingGeometryColumn {
                column: self.primary_column.clone(),
            }
        })?;
        if !column.encoding.eq_ignore_ascii_case(WKB_ENCODING) {
            return Err(CodecError::InvalidData {
                format: "GeoParquet".to_string(),
                message: format!(
                    "column '{}' uses encoding {}, only WKB is supported",
                    self.primary_column, column.encoding
                ),
            });
        }
        Ok(column)
    }
}

impl GeometryColumnMetadata {
    /// EPSG code of the column CRS, if it carries an EPSG identifier.
    #[must_use]
    pub fn epsg(&self) -> Option<Crs> {
        let crs = self.crs.as_ref()?;
        if crs.is_null() {
            return None;
        }
        let parsed = crs_from_projjson(crs);
        if parsed.is_none() {
            warn!("GeoParquet CRS has no EPSG identifier, leaving it unset");
        }
        parsed
    }
}

fn crs_to_projjson(crs: Crs) -> Value {
    json!({ "id": { "authority": "EPSG", "code": crs.epsg() } })
}

fn crs_from_projjson(value: &Value) -> Option<Crs> {
    let id = value.get("id")?;
    let authority = id.get("authority")?.as_str()?;
    if !authority.eq_ignore_ascii_case("EPSG") {
        return None;
    }
    let code = match id.get("code")? {
        Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    Some(Crs::from_epsg(code))
}

fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gdal_style_projjson() {
        let json = r#"{
            "version": "1.0.0",
            "primary_column": "geom",
            "columns": {
                "geom": {
                    "encoding": "WKB",
                    "geometry_types": ["Polygon"],
                    "crs": {"type": "GeographicCRS", "name": "WGS 84",
                            "id": {"authority": "EPSG", "code": 4326}}
                }
            }
        }"#;
        let metadata = GeoParquetMetadata::from_json(json).unwrap();
        let primary = metadata.primary().unwrap();
        assert_eq!(primary.epsg(), Some(Crs::WGS84));
    }

    #[test]
    fn test_null_and_missing_crs() {
        let column = GeometryColumnMetadata {
            encoding: "WKB".to_string(),
            geometry_types: vec![],
            crs: Some(Value::Null),
        };
        assert_eq!(column.epsg(), None);

        let json = r#"{"version":"1.1.0","primary_column":"g","columns":{"g":{"encoding":"WKB"}}}"#;
        let metadata = GeoParquetMetadata::from_json(json).unwrap();
        assert_eq!(metadata.primary().unwrap().epsg(), None);
    }

    #[test]
    fn test_string_epsg_code() {
        let value = json!({"id": {"authority": "epsg", "code": "2193"}});
        assert_eq!(crs_from_projjson(&value), Some(Crs::from_epsg(2193)));
    }

    #[test]
    fn test_rejects_non_wkb_encoding() {
        let json = r#"{"version":"1.1.0","primary_column":"g","columns":{"g":{"encoding":"point"}}}"#;
        let metadata = GeoParquetMetadata::from_json(json).unwrap();
        assert!(metadata.primary().is_err());
    }

    #[test]
    fn test_rejects_malformed_document() {
        let err = GeoParquetMetadata::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("invalid 'geo' metadata"));
    }
}
