//! 計測テーブル
//!
//! 露光テストに付く16行の計測データを扱う。
//!
//! ## モード
//! - シャッター時間計測: 最適露光量 `e` [μJ/cm2] から シャッター時間 [μs] を算出
//! - L3-Holoplate間計測: 距離 [mm] を自由記入
//!
//! どちらのモードでも「決定値」は全行を通して最大1行だけ選択できる。

use crate::error::{Error, Result};
use crate::types::capture_params;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 行数（固定）
pub const ROW_COUNT: usize = 16;

/// シャッター時間計測の最適露光量の刻み [μJ/cm2]
pub const EXPOSURE_STEP: u32 = 50;

/// 決定値が選択されている行の値
pub const DECISION_SELECTED: &str = "selected";

/// 列キー
pub mod columns {
    pub const EXPOSURE: &str = "e";
    pub const SHUTTER: &str = "shutter";
    pub const DISTANCE: &str = "distance";
    pub const DECISION: &str = "decision";
}

/// 旧形式のデータで決定値に使われていたキー
const LEGACY_DECISION_KEYS: &[&str] = &["m3", "d2"];

lazy_static::lazy_static! {
    static ref LEADING_NUMBER_RE: Regex =
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap();
}

/// 入力文字列先頭の数値を読む
///
/// `"2cm"` は 2.0、空文字や数値で始まらない文字列は `None`。
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let value = raw.trim();
    let m = LEADING_NUMBER_RE.find(value)?;
    m.as_str().parse::<f64>().ok()
}

/// 計測モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    /// シャッター時間計測
    #[default]
    Shutter,
    /// L3-Holoplate間計測
    Distance,
}

impl MeasurementMode {
    /// 一覧表示用のラベル
    pub fn list_label(&self) -> &'static str {
        match self {
            MeasurementMode::Shutter => "シャッター時間計測",
            MeasurementMode::Distance => "L3-Holoplate間計測",
        }
    }

    /// 計測テーブルで値が決まるため `－` にする撮影パラメータ
    pub fn dashed_capture_key(&self) -> &'static str {
        match self {
            MeasurementMode::Shutter => capture_params::SHUTTER_TIME,
            MeasurementMode::Distance => capture_params::L3_HOLOPLATE,
        }
    }

    /// このモードで使う列
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            MeasurementMode::Shutter => SHUTTER_COLUMNS,
            MeasurementMode::Distance => DISTANCE_COLUMNS,
        }
    }
}

impl FromStr for MeasurementMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "shutter" | "s" => Ok(MeasurementMode::Shutter),
            "distance" | "d" => Ok(MeasurementMode::Distance),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for MeasurementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementMode::Shutter => write!(f, "shutter"),
            MeasurementMode::Distance => write!(f, "distance"),
        }
    }
}

/// 列定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub header: &'static str,
    /// 利用者が直接書き換えられるか
    pub editable: bool,
}

const SHUTTER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { key: columns::EXPOSURE, header: "最適露光量[μJ/cm2]", editable: false },
    ColumnSpec { key: columns::SHUTTER, header: "シャッター時間[μs]", editable: false },
    ColumnSpec { key: columns::DECISION, header: "決定値", editable: false },
];

const DISTANCE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { key: columns::DISTANCE, header: "L3-Holoplate間[mm]", editable: true },
    ColumnSpec { key: columns::DECISION, header: "決定値", editable: false },
];

/// 計測テーブルの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementRow(
    #[serde(deserialize_with = "crate::lenient::string_map")] BTreeMap<String, String>,
);

impl MeasurementRow {
    fn with_keys(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| (k.to_string(), String::new())).collect())
    }

    /// セル値を取得（キーがなければ空文字）
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// 決定値として選択されているか
    pub fn is_selected(&self) -> bool {
        if let Some(value) = self.0.get(columns::DECISION) {
            return value == DECISION_SELECTED;
        }
        LEGACY_DECISION_KEYS
            .iter()
            .any(|k| self.0.get(*k).map(String::as_str) == Some(DECISION_SELECTED))
    }

    fn set_selected(&mut self, selected: bool) {
        for key in LEGACY_DECISION_KEYS {
            self.0.remove(*key);
        }
        let value = if selected { DECISION_SELECTED } else { "" };
        self.set(columns::DECISION, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// 計測テーブル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementTable {
    #[serde(default)]
    pub mode: MeasurementMode,
    #[serde(default)]
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    /// 指定モードの初期テーブルを作る
    ///
    /// シャッター時間計測では `e` に 50, 100, …, 800 を入れる。
    /// L3-Holoplate間計測では全セル空。
    pub fn build(mode: MeasurementMode) -> Self {
        let rows = (0..ROW_COUNT)
            .map(|i| match mode {
                MeasurementMode::Shutter => {
                    let mut row = MeasurementRow::with_keys(&[
                        columns::EXPOSURE,
                        columns::SHUTTER,
                        columns::DECISION,
                    ]);
                    let seed = EXPOSURE_STEP * (i as u32 + 1);
                    row.set(columns::EXPOSURE, seed.to_string());
                    row
                }
                MeasurementMode::Distance => {
                    MeasurementRow::with_keys(&[columns::DISTANCE, columns::DECISION])
                }
            })
            .collect();

        Self { mode, rows }
    }

    /// モードを切り替える
    ///
    /// テーブルは作り直しになり、入力済みの値は破棄される。
    /// 切り替え前とモードが異なっていれば `true`。
    pub fn switch_mode(&mut self, mode: MeasurementMode) -> bool {
        let changed = self.mode != mode;
        *self = Self::build(mode);
        changed
    }

    /// 決定値をトグルする
    ///
    /// 選択済みの行なら解除、それ以外なら他の行をすべて解除してからその行だけを選択する。
    /// 範囲外のインデックスは何もしない。
    pub fn set_decision(&mut self, index: usize) {
        if index >= self.rows.len() {
            return;
        }
        if self.rows[index].is_selected() {
            self.rows[index].set_selected(false);
            return;
        }
        for row in &mut self.rows {
            row.set_selected(false);
        }
        self.rows[index].set_selected(true);
    }

    /// 選択中の行番号 (0始まり)
    pub fn selected_index(&self) -> Option<usize> {
        self.rows.iter().position(MeasurementRow::is_selected)
    }

    pub fn selected_row(&self) -> Option<&MeasurementRow> {
        self.selected_index().map(|i| &self.rows[i])
    }

    /// 編集可能な列に値を書き込む
    pub fn set_value(&mut self, index: usize, column: &str, value: &str) -> Result<()> {
        let spec = self
            .mode
            .columns()
            .iter()
            .find(|c| c.key == column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))?;
        if !spec.editable {
            return Err(Error::ReadOnlyColumn(column.to_string()));
        }
        let rows = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(Error::RowOutOfRange(index, rows))?;
        row.set(column, value.trim());
        Ok(())
    }

    /// シャッター時間 [μs] を算出
    ///
    /// `shutter = round(e * area / power * 1_000_000)`
    ///
    /// * `exposure_area_cm2` - 露光パワーの面積 [cm2]
    /// * `exposure_power_uw` - 露光パワー [μW]
    ///
    /// 面積かパワーが未入力・0の場合は全行のシャッター時間を消す。
    /// `e` が数値として読めない行はその行だけ空になる。
    /// L3-Holoplate間計測モードでは何もしない。
    pub fn compute_shutter_times(
        &mut self,
        exposure_area_cm2: Option<f64>,
        exposure_power_uw: Option<f64>,
    ) {
        if self.mode != MeasurementMode::Shutter {
            return;
        }

        let factors = match (exposure_area_cm2, exposure_power_uw) {
            (Some(area), Some(power)) if is_truthy(area) && is_truthy(power) => Some((area, power)),
            _ => None,
        };

        for row in &mut self.rows {
            let value = factors
                .and_then(|(area, power)| {
                    let e = parse_leading_number(row.get(columns::EXPOSURE))?;
                    shutter_micros(e, area, power)
                })
                .map(|us| us.to_string())
                .unwrap_or_default();
            row.set(columns::SHUTTER, value);
        }
    }
}

impl Default for MeasurementTable {
    fn default() -> Self {
        Self::build(MeasurementMode::default())
    }
}

fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// 最適露光量と露光条件からシャッター時間 [μs] を求める
///
/// 0.5 は正の無限大方向に丸める。
pub fn shutter_micros(e: f64, area_cm2: f64, power_uw: f64) -> Option<i64> {
    let raw = e * area_cm2 / power_uw * 1_000_000.0;
    let rounded = (raw + 0.5).floor();
    if !rounded.is_finite() || rounded.abs() > i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}
