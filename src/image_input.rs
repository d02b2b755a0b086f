//! 写真ファイルの読み込み
//!
//! ファイルの中身から画像形式を判定し、記録に添付するData URLにする。

use crate::error::{HoloError, Result};
use holo_manager_common::images::encode_data_url;
use image::ImageFormat;
use std::path::Path;
use tracing::debug;

/// 写真ファイルを読み込んでData URLにする
///
/// 画像として判定できないファイルは [`HoloError::NotAnImage`]
pub async fn load_image_data_url(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let format = image::guess_format(&bytes)
        .map_err(|_| HoloError::NotAnImage(path.display().to_string()))?;
    let mime = format.to_mime_type();
    debug!(path = %path.display(), mime, bytes = bytes.len(), "写真を読み込みました");
    Ok(encode_data_url(mime, &bytes))
}

/// 拡張子から推定した形式と中身の形式が食い違うか
pub fn extension_mismatch(path: &Path, data_url: &str) -> bool {
    let Ok(by_ext) = ImageFormat::from_path(path) else {
        return false;
    };
    holo_manager_common::images::mime_type(data_url)
        .is_some_and(|mime| mime != by_ext.to_mime_type())
}
