//! ファイル保存を使った記録リポジトリの結合テスト

use holo_manager::export::write_snapshot;
use holo_manager::storage::FileStorage;
use holo_manager_common::measurement::columns;
use holo_manager_common::types::capture_params;
use holo_manager_common::{
    Category, EntryDraft, EntryRepository, FixedClock, MeasurementMode, MeasurementTable,
};
use chrono::{TimeZone, Utc};
use std::path::Path;
use tempfile::tempdir;

fn open_repo(path: &Path) -> EntryRepository<FileStorage> {
    EntryRepository::open(FileStorage::open(path).unwrap())
        .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()))
}

fn exposure_draft(title: &str) -> EntryDraft {
    let mut draft = EntryDraft {
        title: title.to_string(),
        shot_at: "2024/3".to_string(),
        ..Default::default()
    };
    draft
        .capture_params
        .insert(capture_params::EXPOSURE_AREA.into(), "2".into());
    draft
        .capture_params
        .insert(capture_params::EXPOSURE_POWER.into(), "1000000".into());

    let mut table = MeasurementTable::build(MeasurementMode::Shutter);
    table.compute_shutter_times(
        draft.capture_number(capture_params::EXPOSURE_AREA),
        draft.capture_number(capture_params::EXPOSURE_POWER),
    );
    table.set_decision(0);
    draft.measurement = Some(table);
    draft.apply_capture_placeholders();
    draft
}

/// 保存した記録が開き直しても残っているか
#[test]
fn test_entries_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let mut repo = open_repo(&path);
        repo.create_entry(Category::Test, exposure_draft("1回目"));
        repo.create_entry(Category::Test, exposure_draft("2回目"));
        repo.create_entry(Category::Product, EntryDraft::new());
        repo.set_active_category(Category::Product);
        assert!(repo.take_persist_error().is_none());
    }

    let repo = open_repo(&path);
    assert_eq!(repo.storage().path(), path.as_path());
    assert_eq!(repo.active_category(), Category::Product);

    let tests = repo.list_entries(Category::Test);
    let titles: Vec<&str> = tests.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["2回目", "1回目"]);
    assert_eq!(tests[0].number, 2);
    assert_eq!(tests[0].shot_at, "2024-03");
    assert_eq!(tests[0].shot_display, "2024/03");
    assert_eq!(tests[0].created_at, "2024-03-05T10:00:00.000Z");
    assert_eq!(tests[0].capture_params[capture_params::SHUTTER_TIME], "－");

    let table = tests[0].measurement.as_ref().unwrap();
    assert_eq!(table.rows[0].get(columns::SHUTTER), "100");
    assert_eq!(table.selected_index(), Some(0));

    let products = repo.list_entries(Category::Product);
    assert_eq!(products[0].title, "作成ホログラム");
    assert!(products[0].measurement.is_none());
    assert_eq!(repo.next_number(Category::Product), 2);
}

/// 削除・メモ更新がファイルに反映されるか
#[test]
fn test_delete_and_memo_persist() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let (keep, removed) = {
        let mut repo = open_repo(&path);
        let keep = repo.create_entry(Category::Test, exposure_draft("残す"));
        let removed = repo.create_entry(Category::Test, exposure_draft("消す"));
        (keep.id, removed.id)
    };

    {
        let mut repo = open_repo(&path);
        assert!(repo.delete_entry(Category::Test, &removed));
        assert!(repo.update_memo(Category::Test, &keep, "  露光ムラあり "));
    }

    let mut repo = open_repo(&path);
    let list = repo.list_entries(Category::Test);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].memo, "露光ムラあり");
    // 削除した #2 は開き直しても再利用しない
    assert_eq!(repo.next_number(Category::Test), 3);
    let again = repo.create_entry(Category::Test, exposure_draft("次"));
    assert_eq!(again.number, 3);
}

/// エクスポートしたファイルを別の保存先へインポートすると同じ状態になるか
#[test]
fn test_export_import_between_files() {
    let dir = tempdir().unwrap();
    let mut source = open_repo(&dir.path().join("a.json"));
    source.create_entry(Category::Test, exposure_draft("露光"));
    let mut product = EntryDraft::new();
    product.params.insert("size".into(), "100".into());
    source.create_entry(Category::Product, product);

    let document = source.export_snapshot().unwrap();
    let exported = write_snapshot(&document, &dir.path().join("exports")).unwrap();
    assert!(exported
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("hologram-data-") && n.ends_with(".json")));

    let text = std::fs::read_to_string(&exported).unwrap();
    let mut target = open_repo(&dir.path().join("b.json"));
    assert!(target.import_snapshot_str(&text).unwrap());
    assert_eq!(target.snapshot(), source.snapshot());

    let reopened = open_repo(&dir.path().join("b.json"));
    assert_eq!(reopened.snapshot(), source.snapshot());
}

/// 形の崩れたファイルのインポート
#[test]
fn test_import_malformed_document() {
    let dir = tempdir().unwrap();
    let mut repo = open_repo(&dir.path().join("storage.json"));
    repo.create_entry(Category::Test, exposure_draft("消える"));

    assert!(repo.import_snapshot_str(r#"{"test": "not-an-array"}"#).unwrap());
    assert!(repo.list_entries(Category::Test).is_empty());
    assert!(repo.list_entries(Category::Product).is_empty());

    assert!(repo.import_snapshot_str("{not json").is_err());
}

/// 距離モードの記録
#[test]
fn test_distance_entry() {
    let dir = tempdir().unwrap();
    let mut repo = open_repo(&dir.path().join("storage.json"));

    let mut table = MeasurementTable::build(MeasurementMode::Distance);
    table.set_value(2, columns::DISTANCE, "120").unwrap();
    table.set_decision(2);
    let mut draft = EntryDraft {
        measurement: Some(table),
        ..Default::default()
    };
    draft.apply_capture_placeholders();

    let entry = repo.create_entry(Category::Test, draft);
    let table = entry.measurement.as_ref().unwrap();
    assert_eq!(table.mode, MeasurementMode::Distance);
    assert_eq!(table.selected_row().unwrap().get(columns::DISTANCE), "120");
    assert_eq!(entry.capture_params[capture_params::L3_HOLOPLATE], "－");
    assert_eq!(entry.shot_label(), "ー");
}
