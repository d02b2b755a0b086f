use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoloError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] holo_manager_common::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("画像ファイルではありません: {0}")]
    NotAnImage(String),

    #[error("記録が見つかりません: {0}")]
    EntryNotFound(String),

    #[error("LaTeX出力は作成ホログラムの記録のみ対応しています: {0}")]
    LatexUnavailable(String),

    #[error("引数が不正です: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, HoloError>;
