//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown measurement mode: {0}")]
    UnknownMode(String),

    #[error("Row index out of range: {0} (rows: {1})")]
    RowOutOfRange(usize, usize),

    #[error("Column is read-only: {0}")]
    ReadOnlyColumn(String),

    #[error("Unknown column for this mode: {0}")]
    UnknownColumn(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
