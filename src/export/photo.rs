//! 記録に添付された写真の書き出し

use crate::error::{HoloError, Result};
use holo_manager_common::images::{decode_data_url, extension_for};
use holo_manager_common::{Entry, ImageSlot};
use std::path::{Path, PathBuf};

/// 写真をファイルへ書き出す
///
/// 出力先がディレクトリなら `photo-<番号>-<スロット>.<拡張子>` を付ける。
pub fn write_photo(entry: &Entry, slot: ImageSlot, output: &Path) -> Result<PathBuf> {
    let slot_number = match slot {
        ImageSlot::First => 1,
        ImageSlot::Second => 2,
    };
    let data_url = entry.image(slot).ok_or_else(|| {
        HoloError::InvalidArgument(format!("{} に写真{}はありません", entry.badge(), slot_number))
    })?;
    let (mime, bytes) = decode_data_url(data_url)?;

    let path = if output.is_dir() {
        output.join(format!(
            "photo-{}-{}.{}",
            entry.number,
            slot_number,
            extension_for(&mime)
        ))
    } else {
        output.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(path)
}
