//! GeoPackage reader

use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    ArrayRef, BinaryArray, BooleanArray, Float32Array, Float64Array, Int8Array, Int16Array,
    Int32Array, Int64Array, RecordBatch, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use geopins_core_common::{CodecError, CodecErrorExt, CodecResult, Crs, GeoTable};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::GPKG_APPLICATION_ID;
use crate::binary::decode_geometry;
use crate::schema::{arrow_type, quote_identifier};

const FORMAT: &str = "GeoPackage";

/// A column of a feature table as declared in SQLite.
struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
    is_geometry: bool,
}

/// Names of the feature layers in a GeoPackage, in table name order.
///
/// # Errors
///
/// Returns an error if the file is not a readable GeoPackage.
pub fn list_feature_layers(path: &Path) -> CodecResult<Vec<String>> {
    let conn = open(path)?;
    feature_layers(&conn).with_read_context(FORMAT, path)
}

/// Read the first feature layer of a GeoPackage.
///
/// # Errors
///
/// Returns an error if the file is not a GeoPackage, has no feature layer, or
/// a column or geometry cannot be decoded.
pub fn read_gpkg(path: &Path) -> CodecResult<GeoTable> {
    let conn = open(path)?;
    let layers = feature_layers(&conn).with_read_context(FORMAT, path)?;
    let layer = layers.first().ok_or_else(|| CodecError::InvalidData {
        format: FORMAT.to_string(),
        message: format!("'{}' has no feature layer", path.display()),
    })?;
    if layers.len() > 1 {
        warn!(
            "{} has {} feature layers, reading '{layer}'",
            path.display(),
            layers.len()
        );
    }
    read_layer(&conn, path, layer)
}

/// Read a named feature layer of a GeoPackage.
///
/// # Errors
///
/// Returns an error if the layer does not exist or cannot be decoded.
pub fn read_gpkg_layer(path: &Path, layer: &str) -> CodecResult<GeoTable> {
    let conn = open(path)?;
    read_layer(&conn, path, layer)
}

fn open(path: &Path) -> CodecResult<Connection> {
    debug!("Opening GeoPackage {}", path.display());

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_read_context(FORMAT, path)?;
    let application_id: i32 = conn
        .pragma_query_value(None, "application_id", |row| row.get(0))
        .with_read_context(FORMAT, path)?;
    if application_id != GPKG_APPLICATION_ID {
        return Err(CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: format!(
                "'{}' has application_id {application_id:#x}, not a GeoPackage",
                path.display()
            ),
        });
    }
    Ok(conn)
}

fn feature_layers(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT table_name FROM gpkg_contents WHERE data_type = 'features' ORDER BY table_name",
    )?;
    let layers = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(layers)
}

fn read_layer(conn: &Connection, path: &Path, layer: &str) -> CodecResult<GeoTable> {
    let (geometry_column, srs_id): (String, i32) = conn
        .query_row(
            "SELECT column_name, srs_id FROM gpkg_geometry_columns WHERE table_name = ?1",
            params![layer],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .with_read_context(FORMAT, path)?
        .ok_or_else(|| CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: format!("layer '{layer}' has no geometry column"),
        })?;
    let crs = layer_crs(conn, srs_id).with_read_context(FORMAT, path)?;

    let columns = table_columns(conn, path, layer, &geometry_column)?;
    let names: Vec<String> = columns.iter().map(|c| quote_identifier(&c.name)).collect();
    let order = primary_key(conn, layer)
        .with_read_context(FORMAT, path)?
        .map(|pk| format!(" ORDER BY {}", quote_identifier(&pk)))
        .unwrap_or_default();

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM {}{order}",
            names.join(", "),
            quote_identifier(layer)
        ))
        .with_read_context(FORMAT, path)?;
    let rows = stmt
        .query_map([], |row| {
            (0..names.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .with_read_context(FORMAT, path)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_read_context(FORMAT, path)?;
    debug!("Read {} features from layer '{layer}'", rows.len());

    let arrays = columns
        .iter()
        .enumerate()
        .map(|(index, column)| build_array(column, rows.iter().map(|row| &row[index])))
        .collect::<CodecResult<Vec<_>>>()?;
    let fields: Vec<Field> = columns
        .iter()
        .map(|c| Field::new(&c.name, c.data_type.clone(), c.nullable))
        .collect();

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .with_read_context(FORMAT, path)?;
    GeoTable::try_new(batch, geometry_column, crs)
}

fn layer_crs(conn: &Connection, srs_id: i32) -> rusqlite::Result<Option<Crs>> {
    if srs_id <= 0 {
        return Ok(None);
    }
    let definition: Option<(String, i64)> = conn
        .query_row(
            "SELECT organization, organization_coordsys_id FROM gpkg_spatial_ref_sys WHERE srs_id = ?1",
            params![srs_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(match definition {
        Some((organization, code)) if organization.eq_ignore_ascii_case("EPSG") => {
            u32::try_from(code).ok().map(Crs::from_epsg)
        }
        _ => {
            warn!("srs_id {srs_id} is not an EPSG code, leaving the CRS unset");
            None
        }
    })
}

fn primary_key(conn: &Connection, layer: &str) -> rusqlite::Result<Option<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(layer)))?;
    let keys = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(5)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(keys.into_iter().find(|(_, pk)| *pk > 0).map(|(name, _)| name))
}

fn table_columns(
    conn: &Connection,
    path: &Path,
    layer: &str,
    geometry_column: &str,
) -> CodecResult<Vec<Column>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", quote_identifier(layer)))
        .with_read_context(FORMAT, path)?;
    let declared = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, i64>(5)?,
            ))
        })
        .with_read_context(FORMAT, path)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_read_context(FORMAT, path)?;

    if declared.is_empty() {
        return Err(CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: format!("layer '{layer}' does not exist"),
        });
    }

    declared
        .into_iter()
        .filter(|(_, _, _, pk)| *pk == 0)
        .map(|(name, sql_type, not_null, _)| {
            let is_geometry = name == geometry_column;
            let data_type = if is_geometry {
                DataType::Binary
            } else {
                arrow_type(&name, &sql_type)?
            };
            Ok(Column {
                name,
                data_type,
                nullable: !not_null,
                is_geometry,
            })
        })
        .collect()
}

fn build_array<'a>(
    column: &Column,
    values: impl Iterator<Item = &'a Value>,
) -> CodecResult<ArrayRef> {
    let mismatch = |value: &Value| CodecError::InvalidData {
        format: FORMAT.to_string(),
        message: format!(
            "column '{}' declared {:?} holds {:?}",
            column.name,
            column.data_type,
            value.data_type()
        ),
    };
    let integer = |value: &Value| match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(*i)),
        other => Err(mismatch(other)),
    };
    let real = |value: &Value| match value {
        Value::Null => Ok(None),
        Value::Real(f) => Ok(Some(*f)),
        #[allow(clippy::cast_precision_loss)]
        Value::Integer(i) => Ok(Some(*i as f64)),
        other => Err(mismatch(other)),
    };

    let array: ArrayRef = match column.data_type {
        DataType::Boolean => Arc::new(
            values
                .map(|v| integer(v).map(|i| i.map(|i| i != 0)))
                .collect::<CodecResult<BooleanArray>>()?,
        ),
        DataType::Int8 => Arc::new(
            values
                .map(|v| {
                    integer(v)?
                        .map(|i| i8::try_from(i).map_err(|_| mismatch(v)))
                        .transpose()
                })
                .collect::<CodecResult<Int8Array>>()?,
        ),
        DataType::Int16 => Arc::new(
            values
                .map(|v| {
                    integer(v)?
                        .map(|i| i16::try_from(i).map_err(|_| mismatch(v)))
                        .transpose()
                })
                .collect::<CodecResult<Int16Array>>()?,
        ),
        DataType::Int32 => Arc::new(
            values
                .map(|v| {
                    integer(v)?
                        .map(|i| i32::try_from(i).map_err(|_| mismatch(v)))
                        .transpose()
                })
                .collect::<CodecResult<Int32Array>>()?,
        ),
        DataType::Int64 => Arc::new(values.map(integer).collect::<CodecResult<Int64Array>>()?),
        #[allow(clippy::cast_possible_truncation)]
        DataType::Float32 => Arc::new(
            values
                .map(|v| real(v).map(|f| f.map(|f| f as f32)))
                .collect::<CodecResult<Float32Array>>()?,
        ),
        DataType::Float64 => Arc::new(values.map(real).collect::<CodecResult<Float64Array>>()?),
        DataType::Utf8 => Arc::new(
            values
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Text(s) => Ok(Some(s.clone())),
                    other => Err(mismatch(other)),
                })
                .collect::<CodecResult<StringArray>>()?,
        ),
        DataType::Binary => Arc::new(
            values
                .map(|v| match v {
                    Value::Null => Ok(None),
                    Value::Blob(blob) if column.is_geometry => {
                        decode_geometry(blob).map(|g| Some(g.wkb.to_vec()))
                    }
                    Value::Blob(blob) => Ok(Some(blob.clone())),
                    other => Err(mismatch(other)),
                })
                .collect::<CodecResult<BinaryArray>>()?,
        ),
        _ => {
            return Err(CodecError::UnsupportedColumnType {
                format: FORMAT.to_string(),
                column: column.name.clone(),
                data_type: format!("{:?}", column.data_type),
            });
        }
    };
    Ok(array)
}
