//! ホロパラメータのLaTeX表
//!
//! 作成ホログラムのパラメータから、論文・報告書に貼り付ける `table` 環境を作る。

use crate::format::format_numeric_text;
use crate::types::{product_params, Entry};

/// 表に載せる行（ラベル, パラメータキー）
const ROWS: &[(&str, &str)] = &[
    ("視点数 (Viewpoints)", product_params::PARALLAX_COUNT),
    ("ホログラムのサイズ (mm)", product_params::SIZE),
    ("解像度 (pixel)", product_params::RESOLUTION),
    ("画素ピッチ ({\\textmu}m)", product_params::PITCH),
    ("視点距離 (m)", product_params::DISTANCE),
    ("参照光 (rad)", product_params::REFERENCE),
];

const NO_DATA_ROW: &str = "\\multicolumn{2}{|c|}{データなし} \\\\";

/// パラメータ表のLaTeXを生成
///
/// 空欄のパラメータは行ごと省く。1行も無ければ「データなし」の行を出す。
pub fn build_params_latex(entry: &Entry) -> String {
    let rows: Vec<String> = ROWS
        .iter()
        .filter_map(|(label, key)| {
            let value = entry.params.get(*key)?.trim();
            if value.is_empty() {
                return None;
            }
            Some(format!("{} & {} \\\\", label, format_numeric_text(value)))
        })
        .collect();

    let body = if rows.is_empty() {
        NO_DATA_ROW.to_string()
    } else {
        rows.join("\n\\hline\n")
    };

    [
        "\\begin{table}[h]",
        "\\centering",
        "\\caption{ホログラムのパラメータ}",
        "\\label{tab:holo-params}",
        "\\begin{tabular}{|c|c|}",
        "\\hline",
        body.as_str(),
        "\\hline",
        "\\end{tabular}",
        "\\end{table}",
    ]
    .join("\n")
}
