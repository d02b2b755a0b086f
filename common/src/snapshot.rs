//! 記録データ全体のスナップショット
//!
//! 保存形式・エクスポート形式は共通で、`test` と `product` の2配列だけを持つJSON。
//!
//! ```json
//! { "test": [ {...}, ... ], "product": [ {...}, ... ] }
//! ```
//!
//! 読み込みは寛容に行う。配列でないフィールドは空配列、記録として読めない要素は読み飛ばす。

use crate::types::{Category, Entry, MAX_ENTRY_NUMBER};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// 両区分の記録一覧
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub test: Vec<Entry>,
    #[serde(default)]
    pub product: Vec<Entry>,
}

impl Snapshot {
    /// 任意のJSON値から読み込む（失敗しない）
    pub fn from_value(value: &Value) -> Self {
        Self {
            test: read_entries(value, Category::Test),
            product: read_entries(value, Category::Product),
        }
    }

    pub fn entries(&self, category: Category) -> &[Entry] {
        match category {
            Category::Test => &self.test,
            Category::Product => &self.product,
        }
    }

    pub fn entries_mut(&mut self, category: Category) -> &mut Vec<Entry> {
        match category {
            Category::Test => &mut self.test,
            Category::Product => &mut self.product,
        }
    }

    pub fn len(&self) -> usize {
        self.test.len() + self.product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_entries(value: &Value, category: Category) -> Vec<Entry> {
    let Some(items) = value.get(category.key()).and_then(Value::as_array) else {
        if value.get(category.key()).is_some() {
            warn!(category = %category, "配列ではないため空として読み込みます");
        }
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match Entry::deserialize(item) {
            Ok(entry) if entry.number > MAX_ENTRY_NUMBER => {
                warn!(category = %category, index, number = entry.number, "番号が上限を超えるため読み飛ばします");
                None
            }
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(category = %category, index, error = %e, "記録として読めない要素を読み飛ばします");
                None
            }
        })
        .collect()
}

/// エクスポート用のドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDocument {
    /// `hologram-data-YYYYMMDD_HHMM.json`
    pub file_name: String,
    /// 整形済みJSON
    pub contents: String,
}

/// エクスポートファイル名
pub fn snapshot_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("hologram-data-{}.json", at.format("%Y%m%d_%H%M"))
}
