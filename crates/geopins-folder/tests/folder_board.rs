//! Behaviour of the folder board through the board traits

use std::fs;
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chrono::{TimeZone, Utc};
use geopins_core_common::{
    Board, BoardError, PinData, PinFile, PinStorage, PinWriteOptions, UploadRequest,
};
use geopins_folder::{FolderBoard, META_FILE};
use serde_json::json;
use tempfile::TempDir;

fn rainfall() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("station", DataType::Int64, true),
        Field::new("region", DataType::Utf8, true),
        Field::new("mm", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2, 3])),
        Arc::new(StringArray::from(vec!["Canterbury", "Otago", "Westland"])),
        Arc::new(Float64Array::from(vec![12.5, 3.25, 88.0])),
    ];
    RecordBatch::try_new(schema, columns).unwrap()
}

fn board() -> (TempDir, FolderBoard) {
    let temp_dir = TempDir::new().unwrap();
    let board = FolderBoard::new(temp_dir.path().join("board"));
    (temp_dir, board)
}

#[test]
fn test_table_round_trip_in_every_format() {
    let (_temp_dir, board) = board();
    let batch = rainfall();

    for pin_type in ["csv", "parquet", "arrow", "feather"] {
        let name = format!("rain-{pin_type}");
        let meta = board
            .pin_write(
                &PinData::Table(batch.clone()),
                &PinWriteOptions::new(&name).with_type(pin_type),
            )
            .unwrap();

        assert_eq!(meta.pin_type, pin_type);
        assert_eq!(meta.file, PinFile::Single(format!("{name}.{pin_type}")));
        assert_eq!(meta.title, format!("{name}: a pinned 3 x 3 table"));

        let read = board.pin_read(&name, None, None).unwrap();
        assert_eq!(read, PinData::Table(batch.clone()), "{pin_type}");
    }
}

#[test]
fn test_json_round_trip_and_metadata_record() {
    let (_temp_dir, board) = board();
    let value = json!({"threshold": 25, "regions": ["Canterbury", "Otago"]});
    let mut user = serde_json::Map::new();
    user.insert("source".to_string(), json!("NIWA"));

    let meta = board
        .pin_write(
            &PinData::Json(value.clone()),
            &PinWriteOptions::new("alerts")
                .with_description("Rainfall alert settings")
                .with_metadata(user),
        )
        .unwrap();

    let record = board.construct_path(&["alerts", meta.version.version.as_str(), META_FILE]);
    let text = fs::read_to_string(record).unwrap();
    assert!(text.contains(r#""type": "json""#));
    assert!(text.contains(r#""source": "NIWA""#));

    let fetched = board.pin_fetch("alerts", None).unwrap();
    assert_eq!(fetched, meta);
    assert_eq!(board.pin_read("alerts", None, None).unwrap(), PinData::Json(value));
}

#[test]
fn test_versions_are_kept_and_latest_wins() {
    let (_temp_dir, board) = board();
    let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let v1 = board
        .pin_write(
            &PinData::Json(json!(1)),
            &PinWriteOptions::new("counter").with_created(first),
        )
        .unwrap();
    let v2 = board
        .pin_write(
            &PinData::Json(json!(2)),
            &PinWriteOptions::new("counter").with_created(second),
        )
        .unwrap();

    assert!(v1.version.version.starts_with("20240101T000000Z-"));
    let versions = board.pin_versions("counter").unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1], v2.version);

    assert_eq!(board.pin_read("counter", None, None).unwrap(), PinData::Json(json!(2)));
    assert_eq!(
        board
            .pin_read("counter", Some(v1.version.version.as_str()), None)
            .unwrap(),
        PinData::Json(json!(1))
    );
}

#[test]
fn test_identical_content_is_not_written_twice() {
    let (_temp_dir, board) = board();
    let value = PinData::Table(rainfall());
    let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

    let v1 = board
        .pin_write(&value, &PinWriteOptions::new("rain").with_created(first))
        .unwrap();
    let again = board
        .pin_write(&value, &PinWriteOptions::new("rain").with_created(second))
        .unwrap();
    assert_eq!(again.version, v1.version);
    assert_eq!(board.pin_versions("rain").unwrap().len(), 1);

    board
        .pin_write(
            &value,
            &PinWriteOptions::new("rain")
                .with_created(second)
                .with_force_identical_write(true),
        )
        .unwrap();
    assert_eq!(board.pin_versions("rain").unwrap().len(), 2);
}

#[test]
fn test_unversioned_writes() {
    let (_temp_dir, board) = board();
    let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();

    board
        .pin_write(&PinData::Json(json!(1)), &PinWriteOptions::new("n").with_created(day(1)))
        .unwrap();
    board
        .pin_write(
            &PinData::Json(json!(2)),
            &PinWriteOptions::new("n").with_created(day(2)).with_versioned(false),
        )
        .unwrap();
    assert_eq!(board.pin_versions("n").unwrap().len(), 1);

    board
        .pin_write(&PinData::Json(json!(3)), &PinWriteOptions::new("n").with_created(day(3)))
        .unwrap();
    let err = board
        .pin_write(
            &PinData::Json(json!(4)),
            &PinWriteOptions::new("n").with_created(day(4)).with_versioned(false),
        )
        .unwrap_err();
    assert!(matches!(err, BoardError::UnversionedWrite { versions: 2, .. }));

    let unversioned = board.clone().with_versioned(false);
    assert!(!unversioned.versioned());
}

#[test]
fn test_download_checks_hash() {
    let (_temp_dir, board) = board();
    let meta = board
        .pin_write(&PinData::Json(json!("x")), &PinWriteOptions::new("h"))
        .unwrap();

    let paths = board.pin_download("h", None, Some(meta.pin_hash.as_str())).unwrap();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("h.json"));

    let err = board.pin_download("h", None, Some("0000")).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Pin hash {} does not match given hash 0000", meta.pin_hash)
    );
}

#[test]
fn test_upload_creates_file_pins() {
    let (temp_dir, board) = board();
    let shp = temp_dir.path().join("coast.shp");
    let dbf = temp_dir.path().join("coast.dbf");
    fs::write(&shp, b"shape").unwrap();
    fs::write(&dbf, b"attributes").unwrap();

    let single = board
        .pin_upload(&[shp.clone()], &UploadRequest::new("coast-shp"))
        .unwrap();
    assert_eq!(single.pin_type, "file");
    assert_eq!(single.file, PinFile::Single("coast.shp".to_string()));
    assert_eq!(single.title, "coast-shp: a pinned file");
    assert_eq!(single.file_size, 5);

    let multiple = board
        .pin_upload(&[shp, dbf], &UploadRequest::new("coast"))
        .unwrap();
    assert_eq!(multiple.file.len(), 2);
    assert_eq!(multiple.title, "coast: 2 pinned files");

    let err = board.pin_read("coast", None, None).unwrap_err();
    assert!(matches!(err, BoardError::FileTypePin { .. }));
    assert_eq!(board.pin_download("coast", None, None).unwrap().len(), 2);
}

#[test]
fn test_write_type_errors() {
    let (_temp_dir, board) = board();

    let err = board
        .pin_write(&PinData::Table(rainfall()), &PinWriteOptions::new("t").with_type("rds"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot save type: rds");

    let err = board
        .pin_write(&PinData::Table(rainfall()), &PinWriteOptions::new("t").with_type("json"))
        .unwrap_err();
    assert!(matches!(err, BoardError::ValueNotSupported { .. }));
    assert!(!board.pin_exists("t").unwrap());
}

#[test]
fn test_missing_pins_and_names() {
    let (_temp_dir, board) = board();

    assert!(matches!(
        board.pin_fetch("nothing", None),
        Err(BoardError::PinNotFound { .. })
    ));
    assert!(matches!(
        board.pin_write(&PinData::Json(json!(1)), &PinWriteOptions::new("../escape")),
        Err(BoardError::InvalidName { .. })
    ));
    assert!(board.pin_list().unwrap().is_empty());

    board
        .pin_write(&PinData::Json(json!(1)), &PinWriteOptions::new("present"))
        .unwrap();
    assert!(matches!(
        board.pin_fetch("present", Some("20000101T000000Z-abcde")),
        Err(BoardError::VersionNotFound { .. })
    ));
    assert_eq!(board.pin_list().unwrap(), vec!["present"]);

    board.pin_delete("present").unwrap();
    assert!(!board.pin_exists("present").unwrap());
}
