//! GeoPackage file round trips

use std::fs;
use std::sync::Arc;

use arrow_array::{
    ArrayRef, BooleanArray, Float32Array, Int8Array, Int16Array, Int32Array, Int64Array,
    RecordBatch, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use geo_types::{Geometry, LineString, Point, Polygon};
use geopins_core_common::{CodecError, Crs, GeoTable};
use geopins_gpkg::{
    GPKG_APPLICATION_ID, GPKG_USER_VERSION, layer_name, list_feature_layers, read_gpkg,
    read_gpkg_layer, write_gpkg,
};
use rusqlite::Connection;
use tempfile::TempDir;

fn parcels() -> GeoTable {
    let schema = Arc::new(Schema::new(vec![
        Field::new("parcel_id", DataType::Int64, false),
        Field::new("owner", DataType::Utf8, true),
        Field::new("rated", DataType::Boolean, true),
        Field::new("zone", DataType::Int8, true),
        Field::new("lots", DataType::Int16, true),
        Field::new("area", DataType::Int32, true),
        Field::new("slope", DataType::Float32, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![101, 102, 103])),
        Arc::new(StringArray::from(vec![Some("Crown"), None, Some("Council")])),
        Arc::new(BooleanArray::from(vec![Some(true), Some(false), None])),
        Arc::new(Int8Array::from(vec![Some(1), Some(-2), None])),
        Arc::new(Int16Array::from(vec![Some(300), None, Some(2)])),
        Arc::new(Int32Array::from(vec![Some(70_000), Some(12), None])),
        Arc::new(Float32Array::from(vec![Some(0.25), Some(1.5), None])),
    ];
    let attributes = RecordBatch::try_new(schema, columns).unwrap();

    let geometries: Vec<Geometry<f64>> = vec![
        Point::new(1_570_000.0, 5_180_000.0).into(),
        LineString::from(vec![(0.0, 0.0), (10.0, 5.0)]).into(),
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        )
        .into(),
    ];
    GeoTable::from_geometries(&attributes, &geometries, Some(Crs::from_epsg(2193))).unwrap()
}

#[test]
fn test_gpkg_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("parcels.gpkg");

    let table = parcels();
    write_gpkg(&path, &table, "parcels").unwrap();
    let read = read_gpkg(&path).unwrap();

    assert_eq!(read, table);
    assert_eq!(read.geometries().unwrap(), table.geometries().unwrap());
}

#[test]
fn test_gpkg_header_and_metadata_tables() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("parcels.gpkg");
    write_gpkg(&path, &parcels(), "parcels").unwrap();

    let conn = Connection::open(&path).unwrap();
    let application_id: i32 = conn
        .pragma_query_value(None, "application_id", |row| row.get(0))
        .unwrap();
    let user_version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap();
    assert_eq!(application_id, GPKG_APPLICATION_ID);
    assert_eq!(user_version, GPKG_USER_VERSION);

    let (data_type, srs_id): (String, i32) = conn
        .query_row(
            "SELECT data_type, srs_id FROM gpkg_contents WHERE table_name = 'parcels'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(data_type, "features");
    assert_eq!(srs_id, 2193);

    let blob: Vec<u8> = conn
        .query_row("SELECT geometry FROM parcels WHERE fid = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(&blob[..2], b"GP");

    assert_eq!(list_feature_layers(&path).unwrap(), vec!["parcels"]);
}

#[test]
fn test_gpkg_without_crs() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plain.gpkg");

    let attributes = RecordBatch::new_empty(Arc::new(Schema::empty()));
    let geometries: Vec<Geometry<f64>> = vec![Point::new(1.0, 2.0).into()];
    let table = GeoTable::from_geometries(&attributes, &geometries, None).unwrap();

    write_gpkg(&path, &table, "plain").unwrap();
    let read = read_gpkg_layer(&path, "plain").unwrap();
    assert_eq!(read.crs(), None);
    assert_eq!(read.num_rows(), 1);
}

#[test]
fn test_reserved_fid_column() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("fid.gpkg");

    let schema = Arc::new(Schema::new(vec![Field::new("FID", DataType::Int64, true)]));
    let attributes =
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1])) as ArrayRef])
            .unwrap();
    let geometries: Vec<Geometry<f64>> = vec![Point::new(0.0, 0.0).into()];
    let table = GeoTable::from_geometries(&attributes, &geometries, None).unwrap();

    let err = write_gpkg(&path, &table, "fid").unwrap_err();
    assert!(err.to_string().contains("reserved"));
    assert!(!path.exists());
}

#[test]
fn test_reserved_layer_names() {
    let temp_dir = TempDir::new().unwrap();

    for name in ["gpkg_contents", "sqlite_pins", "GPKG_extensions"] {
        let path = temp_dir.path().join(format!("{name}.gpkg"));
        let err = write_gpkg(&path, &parcels(), name).unwrap_err();
        assert!(
            matches!(err, CodecError::InvalidData { ref message, .. } if message.contains("reserved")),
            "{name}: {err}"
        );
        assert!(!path.exists());

        write_gpkg(&path, &parcels(), &layer_name(name)).unwrap();
        assert_eq!(
            list_feature_layers(&path).unwrap(),
            vec![format!("layer_{name}")]
        );
        assert_eq!(read_gpkg(&path).unwrap(), parcels());
    }
}

#[test]
fn test_not_a_geopackage() {
    let temp_dir = TempDir::new().unwrap();

    let text = temp_dir.path().join("notes.gpkg");
    fs::write(&text, "just some text that is definitely not sqlite").unwrap();
    assert!(matches!(read_gpkg(&text), Err(CodecError::Read { .. })));

    let sqlite = temp_dir.path().join("other.gpkg");
    let conn = Connection::open(&sqlite).unwrap();
    conn.execute_batch("CREATE TABLE t (x INTEGER);").unwrap();
    drop(conn);
    assert!(matches!(read_gpkg(&sqlite), Err(CodecError::InvalidData { .. })));
}
