//! 端末表示用の整形

use holo_manager_common::format::{to_input_date, EMPTY_VALUE_PLACEHOLDER};
use holo_manager_common::images::mime_type;
use holo_manager_common::types::{capture_params, product_params};
use holo_manager_common::{Category, Entry, ImageSlot, MeasurementTable, Page};
use std::fmt::Write;

/// 一覧の1行
///
/// 露光テストは計測モード、作成ホログラムはホログラムの種類を添える。
pub fn entry_line(category: Category, entry: &Entry) -> String {
    let detail = match category {
        Category::Test => entry
            .measurement
            .as_ref()
            .map(|m| m.mode.list_label())
            .unwrap_or(EMPTY_VALUE_PLACEHOLDER)
            .to_string(),
        Category::Product => entry
            .params
            .get(product_params::TYPE)
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(EMPTY_VALUE_PLACEHOLDER)
            .to_string(),
    };
    let photo = if entry.main_image().is_some() { " 📷" } else { "" };
    format!(
        "{:<32} {:<12} {}{}  [{}]",
        entry.badge(),
        entry.shot_label(),
        detail,
        photo,
        entry.id
    )
}

/// 一覧ページ
pub fn page_listing(
    category: Category,
    page: &Page<'_>,
    page_size: usize,
    next_number: u64,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({}件)", category.label(), page.total);
    if page.entries.is_empty() {
        let _ = writeln!(out, "  記録がありません");
    }
    for entry in page.entries {
        let _ = writeln!(out, "  {}", entry_line(category, entry));
    }
    let _ = writeln!(
        out,
        "ページ {}/{}（1ページ{}件）",
        page.page, page.total_pages, page_size
    );
    let _ = write!(out, "次の番号: #{}", next_number);
    out
}

/// 記録の詳細
pub fn entry_detail(category: Category, entry: &Entry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", entry.badge());
    let _ = writeln!(out, "  区分: {}", category.label());
    let _ = writeln!(out, "  撮影日: {}", entry.shot_label());
    if !entry.shot_at.trim().is_empty() {
        let _ = writeln!(out, "  撮影日（入力形式）: {}", to_input_date(&entry.shot_at));
    }
    let _ = writeln!(out, "  作成日時: {}", or_dash(&entry.created_at));
    let _ = writeln!(out, "  ID: {}", entry.id);
    let _ = writeln!(out, "  メモ: {}", or_dash(&entry.memo));

    for (slot, name) in [(ImageSlot::First, "写真1"), (ImageSlot::Second, "写真2")] {
        let state = match entry.image(slot) {
            Some(data_url) => mime_type(data_url).unwrap_or("形式不明"),
            None => "なし",
        };
        let _ = writeln!(out, "  {}: {}", name, state);
    }

    if category == Category::Product {
        let _ = writeln!(out, "\nホロパラメータ");
        for &key in product_params::ALL {
            let label = product_params::label(key).unwrap_or(key);
            let value = entry.params.get(key).map(String::as_str).unwrap_or("");
            let _ = writeln!(out, "  {}: {}", label, or_dash(value));
        }
    }

    let _ = writeln!(out, "\n撮影パラメータ");
    for &key in capture_params::ALL {
        let label = capture_params::label(key).unwrap_or(key);
        let value = entry
            .capture_params
            .get(key)
            .map(String::as_str)
            .unwrap_or("");
        let _ = writeln!(out, "  {}: {}", label, or_dash(value));
    }

    if let Some(table) = &entry.measurement {
        let _ = writeln!(out, "\n{}", table.mode.list_label());
        out.push_str(&measurement_table(table));
    }
    out.trim_end().to_string()
}

/// 計測テーブル
pub fn measurement_table(table: &MeasurementTable) -> String {
    let columns = table.mode.columns();
    let mut out = String::new();

    let _ = write!(out, "  {:>3}", "#");
    for column in columns {
        let _ = write!(out, " | {}", column.header);
    }
    out.push('\n');

    for (index, row) in table.rows.iter().enumerate() {
        let _ = write!(out, "  {:>3}", index + 1);
        for column in columns {
            let value = if column.key == holo_manager_common::measurement::columns::DECISION {
                if row.is_selected() { "●" } else { "" }
            } else {
                row.get(column.key)
            };
            let _ = write!(out, " | {}", value);
        }
        out.push('\n');
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        EMPTY_VALUE_PLACEHOLDER
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holo_manager_common::MeasurementMode;

    fn test_entry() -> Entry {
        Entry {
            id: "id-1".into(),
            number: 2,
            title: "露光テスト".into(),
            shot_display: "2024/03".into(),
            measurement: Some(MeasurementTable::build(MeasurementMode::Shutter)),
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_line_test_category() {
        let line = entry_line(Category::Test, &test_entry());
        assert!(line.starts_with("#2 露光テスト"));
        assert!(line.contains("2024/03"));
        assert!(line.contains("シャッター時間計測"));
        assert!(line.ends_with("[id-1]"));
    }

    #[test]
    fn test_entry_line_product_type() {
        let mut entry = test_entry();
        entry.measurement = None;
        entry.params.insert("type".into(), "フルカラー".into());
        assert!(entry_line(Category::Product, &entry).contains("フルカラー"));
        entry.params.clear();
        assert!(entry_line(Category::Product, &entry).contains(" - "));
    }

    #[test]
    fn test_measurement_table_marks_decision() {
        let mut table = MeasurementTable::build(MeasurementMode::Distance);
        table.set_decision(1);
        let text = measurement_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 17);
        assert!(lines[0].contains("L3-Holoplate間[mm]"));
        assert!(lines[2].ends_with("| ●"));
        assert!(!lines[1].contains('●'));
    }

    #[test]
    fn test_entry_detail_sections() {
        let detail = entry_detail(Category::Test, &test_entry());
        assert!(detail.contains("撮影パラメータ"));
        assert!(detail.contains("最適露光量[μJ/cm2]"));
        assert!(!detail.contains("ホロパラメータ"));
        assert!(detail.contains("写真1: なし"));
        assert!(!detail.contains("入力形式"));
    }

    #[test]
    fn test_entry_detail_input_date() {
        let mut entry = test_entry();
        entry.shot_at = "2024-03".into();
        let detail = entry_detail(Category::Test, &entry);
        assert!(detail.contains("撮影日: 2024/03"));
        assert!(detail.contains("撮影日（入力形式）: 2024-03"));
    }

    #[test]
    fn test_page_listing() {
        let entries = vec![test_entry()];
        let page = Page {
            entries: &entries,
            page: 1,
            total_pages: 2,
            total: 13,
        };
        let text = page_listing(Category::Test, &page, 12, 14);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "露光テスト (13件)");
        assert!(lines[1].starts_with("  #2 露光テスト"));
        assert_eq!(lines[2], "ページ 1/2（1ページ12件）");
        assert_eq!(lines[3], "次の番号: #14");
    }

    #[test]
    fn test_page_listing_empty() {
        let page = Page {
            entries: &[],
            page: 1,
            total_pages: 1,
            total: 0,
        };
        let text = page_listing(Category::Product, &page, 12, 1);
        assert!(text.contains("記録がありません"));
    }
}
