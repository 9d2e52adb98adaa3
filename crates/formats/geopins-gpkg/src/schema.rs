//! Column type mapping between Arrow and GeoPackage.

use arrow_schema::DataType;
use geopins_core_common::{CodecError, CodecResult};

/// Declared SQL type of the geometry column.
pub const GEOMETRY_SQL_TYPE: &str = "GEOMETRY";

/// GeoPackage column type for an Arrow type.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedColumnType`] for types without a mapping.
pub fn sql_type(column: &str, data_type: &DataType) -> CodecResult<&'static str> {
    let sql = match data_type {
        DataType::Boolean => "BOOLEAN",
        DataType::Int8 => "TINYINT",
        DataType::Int16 => "SMALLINT",
        DataType::Int32 => "MEDIUMINT",
        DataType::Int64 => "INTEGER",
        DataType::Float32 => "FLOAT",
        DataType::Float64 => "DOUBLE",
        DataType::Utf8 => "TEXT",
        DataType::Binary => "BLOB",
        other => {
            return Err(CodecError::UnsupportedColumnType {
                format: "GeoPackage".to_string(),
                column: column.to_string(),
                data_type: format!("{other:?}"),
            });
        }
    };
    Ok(sql)
}

/// Arrow type for a declared GeoPackage column type.
///
/// Length suffixes such as `TEXT(40)` are ignored. `DATE` and `DATETIME`
/// columns are read as text.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedColumnType`] for unknown declarations.
pub fn arrow_type(column: &str, declared: &str) -> CodecResult<DataType> {
    let declared = declared.trim().to_ascii_uppercase();
    let base = declared
        .split_once('(')
        .map_or(declared.as_str(), |(base, _)| base)
        .trim();

    let data_type = match base {
        "BOOLEAN" => DataType::Boolean,
        "TINYINT" => DataType::Int8,
        "SMALLINT" => DataType::Int16,
        "MEDIUMINT" => DataType::Int32,
        "INTEGER" | "INT" => DataType::Int64,
        "FLOAT" => DataType::Float32,
        "DOUBLE" | "REAL" => DataType::Float64,
        "TEXT" | "DATE" | "DATETIME" => DataType::Utf8,
        "BLOB" => DataType::Binary,
        _ => {
            return Err(CodecError::UnsupportedColumnType {
                format: "GeoPackage".to_string(),
                column: column.to_string(),
                data_type: declared.clone(),
            });
        }
    };
    Ok(data_type)
}

/// Table name prefixes owned by SQLite and the GeoPackage specification.
pub const RESERVED_PREFIXES: [&str; 3] = ["gpkg_", "sqlite_", "rtree_"];

/// Returns `true` if a feature table cannot be named `name`.
///
/// SQLite identifiers are case-insensitive, so the check is too.
#[must_use]
pub fn is_reserved_table_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// A feature table name derived from `name` that never collides with
/// reserved tables.
#[must_use]
pub fn layer_name(name: &str) -> String {
    if is_reserved_table_name(name) {
        format!("layer_{name}")
    } else {
        name.to_string()
    }
}

/// Quotes an SQL identifier.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping_is_symmetric() {
        let types = [
            DataType::Boolean,
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::Float32,
            DataType::Float64,
            DataType::Utf8,
            DataType::Binary,
        ];
        for data_type in types {
            let sql = sql_type("c", &data_type).unwrap();
            assert_eq!(arrow_type("c", sql).unwrap(), data_type, "{sql}");
        }
    }

    #[test]
    fn test_declared_type_variants() {
        assert_eq!(arrow_type("c", "text(40)").unwrap(), DataType::Utf8);
        assert_eq!(arrow_type("c", "DATETIME").unwrap(), DataType::Utf8);
        assert_eq!(arrow_type("c", "REAL").unwrap(), DataType::Float64);
        assert!(arrow_type("c", "POINTZ").is_err());
    }

    #[test]
    fn test_unsupported_arrow_type() {
        let err = sql_type("when", &DataType::Date32).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column 'when' has type Date32 which is not supported by GeoPackage"
        );
    }

    #[test]
    fn test_reserved_layer_names() {
        assert!(is_reserved_table_name("gpkg_contents"));
        assert!(is_reserved_table_name("SQLite_pins"));
        assert!(is_reserved_table_name("rtree_roads_geom"));
        assert!(!is_reserved_table_name("fid"));
        assert!(!is_reserved_table_name("roads_gpkg_"));

        assert_eq!(layer_name("gpkg_contents"), "layer_gpkg_contents");
        assert_eq!(layer_name("roads"), "roads");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("roads"), "\"roads\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
