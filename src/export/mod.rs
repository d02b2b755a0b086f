pub mod photo;

use crate::error::{HoloError, Result};
use holo_manager_common::{build_params_latex, Category, Entry, SnapshotDocument};
use std::path::{Path, PathBuf};

const LATEX_EXTENSION: &str = "tex";

/// 出力先がディレクトリ指定ならファイル名を付ける
fn output_path_for(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

/// スナップショットをディレクトリへ書き出す
pub fn write_snapshot(document: &SnapshotDocument, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&document.file_name);
    std::fs::write(&path, &document.contents)?;
    Ok(path)
}

/// 記録のLaTeX表（作成ホログラムのみ）
pub fn entry_latex(category: Category, entry: &Entry) -> Result<String> {
    if category != Category::Product {
        return Err(HoloError::LatexUnavailable(entry.badge()));
    }
    Ok(build_params_latex(entry))
}

/// LaTeX表をファイルへ書き出す
///
/// ディレクトリ指定の場合は `holo-params-<番号>.tex`
pub fn write_latex(latex: &str, entry: &Entry, output: &Path) -> Result<PathBuf> {
    let file_name = format!("holo-params-{}.{}", entry.number, LATEX_EXTENSION);
    let path = output_path_for(output, &file_name);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, format!("{}\n", latex))?;
    Ok(path)
}
