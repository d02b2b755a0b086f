//! 写真データ（Data URL）の変換
//!
//! 記録の写真は `data:image/jpeg;base64,/9j/4AAQ...` 形式の文字列で保持する。

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// バイト列をData URLにする
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Data URLからMIMEタイプを抽出
///
/// 形式が崩れている場合は `None`
pub fn mime_type(data_url: &str) -> Option<&str> {
    let header = data_url.strip_prefix("data:")?.split(',').next()?;
    let mime = header.split(';').next()?;
    (!mime.is_empty()).then_some(mime)
}

/// Data URLを (MIMEタイプ, バイト列) に戻す
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let invalid = || Error::InvalidDataUrl(truncate(data_url));

    let rest = data_url.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or_default().to_string();
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(invalid());
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::InvalidDataUrl(e.to_string()))?;
    Ok((mime, bytes))
}

/// MIMEタイプに対応する拡張子
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "bin",
    }
}

fn truncate(data_url: &str) -> String {
    data_url.chars().take(32).collect()
}
