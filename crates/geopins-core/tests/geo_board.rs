//! Reading and writing geospatial pins through a wrapped folder board

use std::fs;
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chrono::{TimeZone, Utc};
use geo_types::{Geometry, LineString, Point};
use geopins_core::{
    ConfigError, DriverError, GeoBoard, GeoPinsError, IntoGeoBoard, PinError, PinObject,
};
use geopins_core_common::{
    Board, BoardError, CodecError, Crs, GeoTable, GeoTransform, PinData, PinFile, PinStorage,
    PinWriteOptions, RasterGrid, UploadRequest,
};
use geopins_folder::FolderBoard;
use serde_json::json;
use tempfile::TempDir;

fn geo_board() -> (TempDir, GeoBoard<FolderBoard>) {
    let temp_dir = TempDir::new().unwrap();
    let board = FolderBoard::new(temp_dir.path().join("board")).into_geo_board();
    (temp_dir, board)
}

fn ids(values: Vec<i64>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, true)]));
    let id: ArrayRef = Arc::new(Int64Array::from(values));
    RecordBatch::try_new(schema, vec![id]).unwrap()
}

fn three_points() -> GeoTable {
    let geometries: Vec<Geometry<f64>> = vec![
        Point::new(0.0, 0.0).into(),
        Point::new(1.0, 1.0).into(),
        Point::new(2.0, 2.0).into(),
    ];
    GeoTable::from_geometries(&ids(vec![1, 2, 3]), &geometries, Some(Crs::WGS84)).unwrap()
}

fn rivers() -> GeoTable {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("length_km", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("Waimakariri"), None])),
        Arc::new(Float64Array::from(vec![Some(151.0), Some(322.0)])),
    ];
    let attributes = RecordBatch::try_new(schema, columns).unwrap();
    let geometries: Vec<Geometry<f64>> = vec![
        LineString::from(vec![(1_500_000.0, 5_200_000.0), (1_580_000.0, 5_190_000.0)]).into(),
        LineString::from(vec![(1_300_000.0, 5_000_000.0), (1_350_000.0, 4_900_000.0)]).into(),
    ];
    GeoTable::from_geometries(&attributes, &geometries, Some(Crs::from_epsg(2193))).unwrap()
}

#[test]
fn test_geoparquet_points_round_trip() {
    let (_temp_dir, board) = geo_board();
    let table = three_points();

    let meta = board
        .pin_write(
            &PinObject::from(table.clone()),
            &PinWriteOptions::new("towns").with_type("parquet"),
        )
        .unwrap();
    assert_eq!(meta.file, PinFile::Single("towns.parquet".to_string()));

    let read = board.pin_read("towns", None, None).unwrap();
    assert_eq!(read, PinObject::GeoTable(table));
    let PinObject::GeoTable(read) = read else {
        unreachable!()
    };
    assert_eq!(read.crs(), Some(Crs::WGS84));
}

#[test]
fn test_example_raster_typed_read() {
    let (_temp_dir, board) = geo_board();

    let meta = board
        .pin_write(
            &PinObject::from(RasterGrid::example()),
            &PinWriteOptions::new("elevation"),
        )
        .unwrap();
    assert_eq!(meta.file, PinFile::Single("elevation.tif".to_string()));

    let raster: RasterGrid = board.pin_read_as("elevation", None, None).unwrap();
    assert_eq!(raster, RasterGrid::example());
}

#[test]
fn test_plain_table_is_unaffected() {
    let (_temp_dir, board) = geo_board();
    let batch = ids(vec![7, 8, 9]);

    let meta = board
        .pin_write(
            &PinObject::from(batch.clone()),
            &PinWriteOptions::new("plain").with_type("csv"),
        )
        .unwrap();
    assert_eq!(meta.pin_type, "csv");

    let read = board.pin_read("plain", None, None).unwrap();
    assert_eq!(read, PinObject::Other(PinData::Table(batch.clone())));

    let direct = board.inner().pin_read("plain", None, None).unwrap();
    assert_eq!(direct, PinData::Table(batch.clone()));

    let typed: RecordBatch = board.pin_read_as("plain", None, None).unwrap();
    assert_eq!(typed, batch);
}

#[test]
fn test_default_geopackage_round_trip() {
    let (_temp_dir, board) = geo_board();
    let table = rivers();

    let meta = board
        .pin_write(
            &PinObject::from(table.clone()),
            &PinWriteOptions::new("rivers")
                .with_title("Main rivers")
                .with_description("Canterbury and Otago"),
        )
        .unwrap();
    assert_eq!(meta.file, PinFile::Single("rivers.gpkg".to_string()));
    assert_eq!(meta.title, "Main rivers");
    assert_eq!(meta.description.as_deref(), Some("Canterbury and Otago"));

    let read: GeoTable = board.pin_read_as("rivers", None, None).unwrap();
    assert_eq!(read, table);
    assert_eq!(read.geometries().unwrap(), table.geometries().unwrap());
}

#[test]
fn test_geopackage_type_alias() {
    let (_temp_dir, board) = geo_board();

    let meta = board
        .pin_write(
            &PinObject::from(rivers()),
            &PinWriteOptions::new("rivers").with_type("geopackage"),
        )
        .unwrap();
    assert_eq!(meta.file, PinFile::Single("rivers.gpkg".to_string()));
}

#[test]
fn test_pin_names_shaped_like_geopackage_tables() {
    let (_temp_dir, board) = geo_board();

    for name in ["gpkg_contents", "sqlite_pins", "fid"] {
        let meta = board
            .pin_write(&PinObject::from(rivers()), &PinWriteOptions::new(name))
            .unwrap();
        assert_eq!(meta.file, PinFile::Single(format!("{name}.gpkg")));

        let read: GeoTable = board.pin_read_as(name, None, None).unwrap();
        assert_eq!(read, rivers());
    }
}

#[test]
fn test_raster_with_nan_cells_round_trip() {
    let (_temp_dir, board) = geo_board();
    let raster = RasterGrid::try_new(
        2,
        1,
        vec![1.0, f64::NAN],
        GeoTransform::new(1_570_000.0, 5_180_001.0, 1.0, 1.0),
        Some(Crs::from_epsg(2193)),
    )
    .unwrap()
    .with_nodata(f64::NAN);

    board
        .pin_write(&PinObject::from(raster.clone()), &PinWriteOptions::new("gaps"))
        .unwrap();

    let read: RasterGrid = board.pin_read_as("gaps", None, None).unwrap();
    assert_eq!(read, raster);
    assert!(read.value(0, 1).is_some_and(f64::is_nan));
    assert!(read.nodata().is_some_and(f64::is_nan));
}

#[test]
fn test_read_pinned_version_and_hash() {
    let (_temp_dir, board) = geo_board();

    let meta = board
        .pin_write(&PinObject::from(RasterGrid::example()), &PinWriteOptions::new("dem"))
        .unwrap();
    let again = board
        .pin_write(&PinObject::from(RasterGrid::example()), &PinWriteOptions::new("dem"))
        .unwrap();
    assert_eq!(again.version, meta.version);
    assert_eq!(board.pin_versions("dem").unwrap().len(), 1);

    let read: RasterGrid = board
        .pin_read_as(
            "dem",
            Some(meta.version.version.as_str()),
            Some(meta.pin_hash.as_str()),
        )
        .unwrap();
    assert_eq!(read, RasterGrid::example());

    let err = board
        .pin_read("dem", Some(meta.version.version.as_str()), Some("0000"))
        .unwrap_err();
    assert!(matches!(
        err,
        GeoPinsError::Board(BoardError::HashMismatch { .. })
    ));
}

#[test]
fn test_type_mismatch() {
    let (_temp_dir, board) = geo_board();
    board
        .pin_write(
            &PinObject::from(RasterGrid::example()),
            &PinWriteOptions::new("elevation"),
        )
        .unwrap();

    let err = board
        .pin_read_as::<GeoTable>("elevation", None, None)
        .unwrap_err();
    assert!(matches!(err, GeoPinsError::Pin(PinError::TypeMismatch { .. })));
    assert_eq!(
        err.to_string(),
        "Expected pin 'elevation' to be a GeoTable, got RasterGrid"
    );
}

#[test]
fn test_unsupported_filetypes() {
    let (_temp_dir, board) = geo_board();

    let err = board
        .pin_write(
            &PinObject::from(RasterGrid::example()),
            &PinWriteOptions::new("elevation").with_type("csv"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GeoPinsError::Driver(DriverError::WriteNotSupported { .. })
    ));
    assert_eq!(
        err.to_string(),
        "Writing to CSV is not supported for RasterGrid."
    );

    let err = board
        .pin_write(
            &PinObject::from(rivers()),
            &PinWriteOptions::new("rivers").with_type("shp"),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot save type: shp");

    let err = board
        .pin_write(
            &PinObject::from(rivers()),
            &PinWriteOptions::new("rivers").with_type("tif"),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Writing to GeoTIFF is not supported for GeoTable."
    );

    let err = board
        .pin_write(
            &PinObject::from(RasterGrid::example()),
            &PinWriteOptions::new("elevation").with_type("file"),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot save type: file");

    assert!(!board.pin_exists("elevation").unwrap());
    assert!(!board.pin_exists("rivers").unwrap());
}

#[test]
fn test_unsupported_options_write_nothing() {
    let (_temp_dir, board) = geo_board();
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let cases = [
        (
            PinWriteOptions::new("dem").with_force_identical_write(true),
            "`force_identical_write=True` is not supported for RasterGrid pins.",
        ),
        (
            PinWriteOptions::new("dem").with_versioned(true),
            "`versioned` is not supported for RasterGrid pins.",
        ),
        (
            PinWriteOptions::new("dem").with_created(created),
            "`created` is not supported for RasterGrid pins.",
        ),
    ];
    for (options, message) in cases {
        let err = board
            .pin_write(&PinObject::from(RasterGrid::example()), &options)
            .unwrap_err();
        assert!(matches!(
            err,
            GeoPinsError::Config(ConfigError::UnsupportedOption { .. })
        ));
        assert_eq!(err.to_string(), message);
    }

    let err = board
        .pin_write(
            &PinObject::from(rivers()),
            &PinWriteOptions::new("rivers").with_versioned(false),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "`versioned` is not supported for GeoTable pins."
    );

    assert!(!board.pin_exists("dem").unwrap());
    assert!(!board.pin_exists("rivers").unwrap());
}

#[test]
fn test_invalid_name_is_rejected() {
    let (_temp_dir, board) = geo_board();
    let err = board
        .pin_write(
            &PinObject::from(RasterGrid::example()),
            &PinWriteOptions::new("../dem"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GeoPinsError::Board(BoardError::InvalidName { .. })
    ));
}

#[test]
fn test_generic_options_still_reach_the_inner_board() {
    let (_temp_dir, board) = geo_board();
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let meta = board
        .pin_write(
            &PinObject::from(json!({"threshold": 3})),
            &PinWriteOptions::new("settings")
                .with_created(created)
                .with_versioned(true),
        )
        .unwrap();
    assert!(meta.version.version.starts_with("20240101T000000Z-"));

    let value: serde_json::Value = board.pin_read_as("settings", None, None).unwrap();
    assert_eq!(value, json!({"threshold": 3}));
}

#[test]
fn test_multi_file_pins_are_generic() {
    let (temp_dir, board) = geo_board();
    let first = temp_dir.path().join("a.tif");
    let second = temp_dir.path().join("b.tif");
    fs::write(&first, b"not a tiff").unwrap();
    fs::write(&second, b"not a tiff either").unwrap();

    board
        .pin_upload(&[first, second], &UploadRequest::new("tiles"))
        .unwrap();

    let err = board.pin_read("tiles", None, None).unwrap_err();
    assert!(matches!(
        err,
        GeoPinsError::Board(BoardError::FileTypePin { .. })
    ));
}

#[test]
fn test_corrupt_parquet_pin_fails_classification() {
    let (temp_dir, board) = geo_board();
    let path = temp_dir.path().join("broken.parquet");
    fs::write(&path, b"this is not parquet").unwrap();
    board
        .pin_upload(&[path], &UploadRequest::new("broken"))
        .unwrap();

    let err = board.pin_read("broken", None, None).unwrap_err();
    assert!(matches!(
        err,
        GeoPinsError::Codec(CodecError::Read { ref format, .. }) if format == "Parquet"
    ));
}

#[test]
fn test_plain_parquet_goes_to_the_inner_board() {
    let (_temp_dir, board) = geo_board();
    let batch = ids(vec![4, 5]);

    board
        .pin_write(
            &PinObject::from(batch.clone()),
            &PinWriteOptions::new("counts").with_type("parquet"),
        )
        .unwrap();

    let read = board.pin_read("counts", None, None).unwrap();
    assert_eq!(read, PinObject::Other(PinData::Table(batch)));

    let err = board
        .pin_read_as::<GeoTable>("counts", None, None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected pin 'counts' to be a GeoTable, got RecordBatch"
    );
}
