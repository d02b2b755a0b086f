//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use holo_manager::error::HoloError;
use holo_manager::export;
use holo_manager::image_input;
use holo_manager_common::{Category, Entry};
use std::path::Path;
use tempfile::tempdir;

/// 存在しない写真ファイルを読み込んだ場合
#[tokio::test]
async fn test_load_nonexistent_image() {
    let result = image_input::load_image_data_url(Path::new("/nonexistent/path/12345.jpg")).await;
    assert!(matches!(result, Err(HoloError::Io(_))));
}

/// 画像ではないファイルを読み込んだ場合
#[tokio::test]
async fn test_load_text_as_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("memo.jpg");
    std::fs::write(&path, "hello").unwrap();

    let result = image_input::load_image_data_url(&path).await;
    assert!(matches!(result, Err(HoloError::NotAnImage(_))));
}

/// 露光テストのLaTeX出力
#[test]
fn test_latex_for_test_entry() {
    let entry = Entry {
        number: 1,
        ..Default::default()
    };
    let err = export::entry_latex(Category::Test, &entry).unwrap_err();
    assert!(format!("{}", err).contains("#1"));
}

/// 共通ライブラリのエラーの変換
#[test]
fn test_common_error_conversion() {
    let err: HoloError = holo_manager_common::Error::UnknownCategory("draft".into()).into();
    assert!(matches!(err, HoloError::Common(_)));
    assert_eq!(format!("{}", err), "Unknown category: draft");
}

/// HoloErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        HoloError::Config("テスト設定エラー".to_string()),
        HoloError::NotAnImage("memo.txt".to_string()),
        HoloError::EntryNotFound("abc".to_string()),
        HoloError::LatexUnavailable("#1 露光テスト".to_string()),
        HoloError::InvalidArgument("slot".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}
