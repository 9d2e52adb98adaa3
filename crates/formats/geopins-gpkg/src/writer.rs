//! GeoPackage writer

use std::fs;
use std::path::Path;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
};
use arrow_array::{Array, ArrayRef};
use arrow_schema::DataType;
use geopins_core_common::{CodecError, CodecErrorExt, CodecResult, Crs, GeoTable};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use crate::binary::encode_geometry;
use crate::schema::{GEOMETRY_SQL_TYPE, is_reserved_table_name, quote_identifier, sql_type};
use crate::{FID_COLUMN, GPKG_APPLICATION_ID, GPKG_USER_VERSION};

const FORMAT: &str = "GeoPackage";

const WGS84_DEFINITION: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

const METADATA_TABLES: &str = "
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
";

/// Write a geometry table as a single-layer GeoPackage, replacing any
/// existing file.
///
/// The feature table is named `layer` and gets an `fid` integer primary key
/// followed by the table's columns in order.
///
/// # Errors
///
/// Returns an error if `layer` is a reserved table name (see
/// [`layer_name`](crate::schema::layer_name)), a column type has no GeoPackage
/// mapping, a column is named `fid`, or the database cannot be written.
pub fn write_gpkg(path: &Path, table: &GeoTable, layer: &str) -> CodecResult<()> {
    if is_reserved_table_name(layer) {
        return Err(CodecError::InvalidData {
            format: FORMAT.to_string(),
            message: format!("layer name '{layer}' is reserved"),
        });
    }
    debug!(
        "Writing {} features as GeoPackage layer '{layer}' to {}",
        table.num_rows(),
        path.display()
    );

    let columns = column_definitions(table)?;
    if path.exists() {
        fs::remove_file(path).with_write_context(FORMAT, path)?;
    }

    let mut conn = Connection::open(path).with_write_context(FORMAT, path)?;
    write_database(&mut conn, table, layer, &columns).with_write_context(FORMAT, path)
}

fn column_definitions(table: &GeoTable) -> CodecResult<Vec<String>> {
    let schema = table.batch().schema();
    schema
        .fields()
        .iter()
        .map(|field| {
            if field.name().eq_ignore_ascii_case(FID_COLUMN) {
                return Err(CodecError::InvalidData {
                    format: FORMAT.to_string(),
                    message: format!("column name '{}' is reserved", field.name()),
                });
            }
            let sql = if field.name() == table.geometry_column() {
                GEOMETRY_SQL_TYPE
            } else {
                sql_type(field.name(), field.data_type())?
            };
            let not_null = if field.is_nullable() { "" } else { " NOT NULL" };
            Ok(format!("{} {sql}{not_null}", quote_identifier(field.name())))
        })
        .collect()
}

fn write_database(
    conn: &mut Connection,
    table: &GeoTable,
    layer: &str,
    columns: &[String],
) -> rusqlite::Result<()> {
    conn.pragma_update(None, "application_id", GPKG_APPLICATION_ID)?;
    conn.pragma_update(None, "user_version", GPKG_USER_VERSION)?;

    let tx = conn.transaction()?;
    tx.execute_batch(METADATA_TABLES)?;

    tx.execute(
        "INSERT INTO gpkg_spatial_ref_sys VALUES
            ('Undefined cartesian SRS', -1, 'NONE', -1, 'undefined', 'undefined cartesian coordinate reference system'),
            ('Undefined geographic SRS', 0, 'NONE', 0, 'undefined', 'undefined geographic coordinate reference system'),
            ('WGS 84 geodetic', 4326, 'EPSG', 4326, ?1, 'longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid')",
        params![WGS84_DEFINITION],
    )?;
    let srs_id = srs_id(table.crs());
    if srs_id > 0 && srs_id != 4326 {
        tx.execute(
            "INSERT INTO gpkg_spatial_ref_sys VALUES (?1, ?2, 'EPSG', ?2, 'undefined', NULL)",
            params![format!("EPSG:{srs_id}"), srs_id],
        )?;
    }

    let quoted_layer = quote_identifier(layer);
    tx.execute_batch(&format!(
        "CREATE TABLE {quoted_layer} ({} INTEGER PRIMARY KEY AUTOINCREMENT, {});",
        quote_identifier(FID_COLUMN),
        columns.join(", ")
    ))?;
    tx.execute(
        "INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id) VALUES (?1, 'features', ?1, ?2)",
        params![layer, srs_id],
    )?;
    tx.execute(
        "INSERT INTO gpkg_geometry_columns VALUES (?1, ?2, ?3, ?4, 0, 0)",
        params![layer, table.geometry_column(), GEOMETRY_SQL_TYPE, srs_id],
    )?;

    insert_features(&tx, table, &quoted_layer, srs_id)?;
    tx.commit()
}

fn insert_features(
    conn: &Connection,
    table: &GeoTable,
    quoted_layer: &str,
    srs_id: i32,
) -> rusqlite::Result<()> {
    let batch = table.batch();
    let schema = batch.schema();
    let names: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| quote_identifier(field.name()))
        .collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();

    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {quoted_layer} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    ))?;

    let geometry_index = schema.index_of(table.geometry_column()).ok();
    for row in 0..batch.num_rows() {
        let values = batch.columns().iter().enumerate().map(|(index, column)| {
            let value = sql_value(column, row);
            match value {
                Value::Blob(wkb) if Some(index) == geometry_index => {
                    Value::Blob(encode_geometry(&wkb, srs_id))
                }
                other => other,
            }
        });
        stmt.execute(params_from_iter(values))?;
    }
    Ok(())
}

fn sql_value(column: &ArrayRef, row: usize) -> Value {
    if column.is_null(row) {
        return Value::Null;
    }
    match column.data_type() {
        DataType::Boolean => Value::Integer(i64::from(column.as_boolean().value(row))),
        DataType::Int8 => Value::Integer(column.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => Value::Integer(column.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => Value::Integer(column.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => Value::Integer(column.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Value::Real(column.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => Value::Real(column.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => Value::Text(column.as_string::<i32>().value(row).to_string()),
        DataType::Binary => Value::Blob(column.as_binary::<i32>().value(row).to_vec()),
        // rejected by column_definitions before any row is written
        _ => Value::Null,
    }
}

fn srs_id(crs: Option<Crs>) -> i32 {
    match crs {
        Some(crs) => i32::try_from(crs.epsg()).unwrap_or(-1),
        None => -1,
    }
}
