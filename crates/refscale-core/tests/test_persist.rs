mod common;

use approx::assert_abs_diff_eq;
use serde_json::{json, Value};

use refscale_core::board::{Board, Orientation, PaperSize};
use refscale_core::config::ScalerConfig;
use refscale_core::error::ScalerError;
use refscale_core::geometry::{CanvasPoint, LocalPoint};
use refscale_core::persist::{load_board, save_board, FileStore, KeyValueStore, MemoryStore};
use refscale_core::units::DraftingScale;

use common::{checkerboard, coordinate_raster};

const KEY: &str = "model-reference-scaler";

fn sample_board() -> Board {
    let mut board = Board::default();
    board.set_paper(PaperSize::A3, Orientation::Landscape);
    let a = board.add(coordinate_raster(40, 30), Some("plan.png".into())).unwrap();
    let b = board.add(checkerboard(24, 24, 4), None).unwrap();
    board.move_image(a, CanvasPoint::new(12.0, 34.0)).unwrap();
    board.calibrate(b, 20.0, 36.0).unwrap();
    board.set_drafting_scale(DraftingScale::HALF_INCH);
    board
}

fn stored_json(board: &Board) -> Value {
    serde_json::to_value(board.to_record().unwrap()).unwrap()
}

fn load_value(value: &Value) -> Board {
    let mut store = MemoryStore::new();
    store.put(KEY, &value.to_string()).unwrap();
    load_board(&store, KEY, ScalerConfig::default()).unwrap().unwrap()
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn test_memory_store_round_trip() {
    let board = sample_board();
    let mut store = MemoryStore::new();
    save_board(&mut store, KEY, &board).unwrap();
    let loaded = load_board(&store, KEY, ScalerConfig::default()).unwrap().unwrap();

    assert_eq!(loaded.paper(), PaperSize::A3);
    assert_eq!(loaded.orientation(), Orientation::Landscape);
    assert_eq!(loaded.drafting_scale(), DraftingScale::HALF_INCH);
    assert_eq!(loaded.len(), 2);

    for (before, after) in board.images().iter().zip(loaded.images()) {
        assert_eq!(before.id(), after.id());
        assert_eq!(before.name(), after.name());
        assert_eq!(before.position(), after.position());
        assert_eq!(before.size(), after.size());
        assert_abs_diff_eq!(before.scale_factor(), after.scale_factor());
        assert_eq!(before.calibration(), after.calibration());
        assert_eq!(before.pixels().as_raw(), after.pixels().as_raw());
        assert_eq!(before.pristine().raster().as_raw(), after.pristine().raster().as_raw());
    }
}

#[test]
fn test_loaded_board_continues_ids() {
    let board = sample_board();
    let mut loaded = load_value(&stored_json(&board));
    let max = board.images().iter().map(|img| img.id()).max().unwrap();
    let fresh = loaded.add(coordinate_raster(4, 4), None).unwrap();
    assert!(fresh > max);
}

#[test]
fn test_record_uses_camel_case_fields() {
    let value = stored_json(&sample_board());
    assert!(value.get("paperSize").is_some());
    assert!(value.get("draftingScaleValue").is_some());
    let image = &value["images"][1];
    for field in ["id", "src", "x", "y", "width", "height", "originalWidth", "originalHeight", "scaleFactor"] {
        assert!(image.get(field).is_some(), "missing {field}");
    }
    assert!(image.get("referencePixels").is_some());
    assert!(image.get("referenceInches").is_some());
    assert!(image["src"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(value["images"][0]["id"], "img-1");
}

#[test]
fn test_missing_key_loads_nothing() {
    let store = MemoryStore::new();
    assert!(load_board(&store, KEY, ScalerConfig::default()).unwrap().is_none());
}

#[test]
fn test_reset_survives_reload() {
    let mut board = Board::default();
    let id = board.add(coordinate_raster(60, 40), None).unwrap();
    board
        .crop(id, LocalPoint::new(0.0, 0.0), LocalPoint::new(30.0, 20.0))
        .unwrap();

    let mut loaded = load_value(&stored_json(&board));
    assert_eq!(loaded.get(id).unwrap().pixels().dimensions(), (30, 20));
    loaded.reset_image(id).unwrap();
    assert_eq!(loaded.get(id).unwrap().pixels().as_raw(), coordinate_raster(60, 40).as_raw());
}

#[test]
fn test_missing_pristine_uses_src() {
    let mut value = stored_json(&sample_board());
    value["images"][0].as_object_mut().unwrap().remove("pristineSrc");
    let loaded = load_value(&value);
    let img = &loaded.images()[0];
    assert_eq!(img.pristine().raster().as_raw(), img.pixels().as_raw());
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

#[test]
fn test_nan_width_record_is_dropped() {
    let board = sample_board();
    let mut record = board.to_record().unwrap();
    record.images[0].width = f64::NAN;
    // NaN serializes as null.
    let json = serde_json::to_string(&record).unwrap();

    let mut store = MemoryStore::new();
    store.put(KEY, &json).unwrap();
    let loaded = load_board(&store, KEY, ScalerConfig::default()).unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.images()[0].id(), board.images()[1].id());
}

#[test]
fn test_typed_record_with_nan_is_dropped() {
    let board = sample_board();
    let mut record = board.to_record().unwrap();
    record.images[1].height = f64::NAN;
    let loaded = Board::from_record(record, ScalerConfig::default());
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.images()[0].id(), board.images()[0].id());
}

#[test]
fn test_invalid_image_fields_are_dropped() {
    let base = stored_json(&sample_board());
    let cases: Vec<(&str, Value)> = vec![
        ("width", json!(0.0)),
        ("height", json!(-5.0)),
        ("x", Value::Null),
        ("scaleFactor", json!(0.0)),
        ("originalWidth", json!(41)),
        ("src", json!("data:image/png;base64,AAAA")),
        ("referencePixels", json!(-1.0)),
        ("id", json!("not-an-id")),
    ];
    for (field, bad) in cases {
        let mut value = base.clone();
        value["images"][0][field] = bad;
        let loaded = load_value(&value);
        assert_eq!(loaded.len(), 1, "kept record with bad {field}");
    }
}

#[test]
fn test_max_id_record_is_dropped() {
    let mut value = stored_json(&sample_board());
    value["images"][0]["id"] = json!(format!("img-{}", u64::MAX));
    let loaded = load_value(&value);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.images()[0].id().to_string(), "img-2");
}

#[test]
fn test_last_id_loads_but_blocks_further_adds() {
    let mut value = stored_json(&sample_board());
    value["images"][0]["id"] = json!(format!("img-{}", u64::MAX - 1));
    let mut loaded = load_value(&value);
    assert_eq!(loaded.len(), 2);

    let result = loaded.add(coordinate_raster(4, 4), None);
    assert!(matches!(result, Err(ScalerError::InvalidDimensionInput(_))));
    assert_eq!(loaded.len(), 2);
}

#[test]
fn test_half_calibration_is_dropped() {
    let mut value = stored_json(&sample_board());
    value["images"][1].as_object_mut().unwrap().remove("referenceInches");
    let loaded = load_value(&value);
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_duplicate_ids_keep_first() {
    let mut value = stored_json(&sample_board());
    let first = value["images"][0].clone();
    value["images"].as_array_mut().unwrap().push(first);
    let loaded = load_value(&value);
    assert_eq!(loaded.len(), 2);
}

#[test]
fn test_bad_board_fields_fall_back_to_defaults() {
    let mut value = stored_json(&sample_board());
    value["paperSize"] = json!("folio");
    value["orientation"] = json!(7);
    value["draftingScaleValue"] = json!(-0.5);
    let loaded = load_value(&value);
    assert_eq!(loaded.paper(), PaperSize::Letter);
    assert_eq!(loaded.orientation(), Orientation::Portrait);
    assert_eq!(loaded.drafting_scale(), DraftingScale::default());
    assert_eq!(loaded.len(), 2);
}

#[test]
fn test_non_json_document_is_an_error() {
    let mut store = MemoryStore::new();
    store.put(KEY, "{ this is not json").unwrap();
    let result = load_board(&store, KEY, ScalerConfig::default());
    assert!(matches!(result, Err(ScalerError::CorruptPersistedRecord(_))));
}

#[test]
fn test_images_not_an_array_gives_empty_board() {
    let loaded = load_value(&json!({
        "paperSize": "tabloid",
        "orientation": "portrait",
        "draftingScaleValue": 0.125,
        "images": "nope"
    }));
    assert!(loaded.is_empty());
    assert_eq!(loaded.paper(), PaperSize::Tabloid);
    assert_eq!(loaded.drafting_scale(), DraftingScale::EIGHTH_INCH);
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("boards")).unwrap();
    let board = sample_board();

    save_board(&mut store, KEY, &board).unwrap();
    assert!(store.path_for(KEY).exists());

    let reopened = FileStore::open(dir.path().join("boards")).unwrap();
    let loaded = load_board(&reopened, KEY, ScalerConfig::default()).unwrap().unwrap();
    assert_eq!(loaded.len(), board.len());

    store.remove(KEY).unwrap();
    assert!(!store.path_for(KEY).exists());
    assert!(load_board(&store, KEY, ScalerConfig::default()).unwrap().is_none());
    // Removing twice is fine.
    store.remove(KEY).unwrap();
}

#[test]
fn test_file_store_sanitizes_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    let path = store.path_for("../escape/attempt");
    assert_eq!(path.parent().unwrap(), dir.path());

    store.put("../escape/attempt", "{}").unwrap();
    assert_eq!(store.get("../escape/attempt").unwrap().as_deref(), Some("{}"));
}
