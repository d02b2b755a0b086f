//! 記録データの型定義
//!
//! - Category: 露光テスト / 作成ホログラム
//! - Entry: 保存済みの1件の記録
//! - EntryDraft: 保存前の入力内容

use crate::error::{Error, Result};
use crate::format::{format_date_display, EMPTY_DATE_PLACEHOLDER};
use crate::measurement::MeasurementTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 文字列キー・文字列値のパラメータ表
pub type ParamMap = BTreeMap<String, String>;

/// 記録番号の上限（JSONの数値として誤差なく扱える最大の整数）
pub const MAX_ENTRY_NUMBER: u64 = 9_007_199_254_740_991;

/// 作成ホログラムのパラメータキー
pub mod product_params {
    pub const TYPE: &str = "type";
    pub const PARALLAX_COUNT: &str = "parallaxCount";
    pub const SIZE: &str = "size";
    pub const RESOLUTION: &str = "resolution";
    pub const PITCH: &str = "pitch";
    pub const DISTANCE: &str = "distance";
    pub const REFERENCE: &str = "reference";

    pub const ALL: &[&str] = &[TYPE, PARALLAX_COUNT, SIZE, RESOLUTION, PITCH, DISTANCE, REFERENCE];

    /// 表示ラベル
    pub fn label(key: &str) -> Option<&'static str> {
        match key {
            TYPE => Some("ホログラムの種類"),
            PARALLAX_COUNT => Some("視点数 (Viewpoints)"),
            SIZE => Some("ホログラムのサイズ (mm)"),
            RESOLUTION => Some("解像度 (pixel)"),
            PITCH => Some("画素ピッチ (μm)"),
            DISTANCE => Some("視点距離 (m)"),
            REFERENCE => Some("参照光 (rad)"),
            _ => None,
        }
    }
}

/// 撮影パラメータキー
pub mod capture_params {
    pub const LASER_POWER: &str = "laserPower";
    pub const EXPOSURE_POWER: &str = "exposurePower";
    pub const EXPOSURE_AREA: &str = "exposureArea";
    pub const SETTLING_TIME: &str = "settlingTime";
    pub const SHUTTER_TIME: &str = "shutterTime";
    pub const L3_HOLOPLATE: &str = "l3Holoplate";

    pub const ALL: &[&str] = &[
        LASER_POWER,
        EXPOSURE_POWER,
        EXPOSURE_AREA,
        SETTLING_TIME,
        SHUTTER_TIME,
        L3_HOLOPLATE,
    ];

    /// 計測モード側で値を決める項目に入れるダッシュ
    pub const DASH_PLACEHOLDER: &str = "－";

    /// 表示ラベル
    pub fn label(key: &str) -> Option<&'static str> {
        match key {
            LASER_POWER => Some("レーザーパワー[ｍW]"),
            EXPOSURE_POWER => Some("露光パワー[μW]"),
            EXPOSURE_AREA => Some("露光パワーの面積[cm2]"),
            SETTLING_TIME => Some("セトリング時間[ms]"),
            SHUTTER_TIME => Some("シャッター時間[μs]"),
            L3_HOLOPLATE => Some("L3-Holoplate間[mm]"),
            _ => None,
        }
    }
}

/// 記録の区分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// 露光テスト
    #[default]
    Test,
    /// 作成ホログラム
    Product,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Test, Category::Product];

    /// 保存キー・JSONフィールド名
    pub fn key(&self) -> &'static str {
        match self {
            Category::Test => "test",
            Category::Product => "product",
        }
    }

    /// 表示ラベル（タイトル未入力時の既定タイトルにも使う）
    pub fn label(&self) -> &'static str {
        match self {
            Category::Test => "露光テスト",
            Category::Product => "作成ホログラム",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "test" | "t" | "露光テスト" => Ok(Category::Test),
            "product" | "p" | "作成ホログラム" => Ok(Category::Product),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 写真スロット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    First,
    Second,
}

impl ImageSlot {
    /// 1始まりの番号から変換
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(ImageSlot::First),
            2 => Some(ImageSlot::Second),
            _ => None,
        }
    }
}

/// 保存済みの記録
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entry {
    #[serde(deserialize_with = "crate::lenient::string")]
    pub id: String,

    #[serde(deserialize_with = "crate::lenient::number")]
    pub number: u64,

    #[serde(deserialize_with = "crate::lenient::string")]
    pub title: String,

    #[serde(deserialize_with = "crate::lenient::string")]
    pub memo: String,

    /// 正規化済み撮影日
    #[serde(deserialize_with = "crate::lenient::string")]
    pub shot_at: String,

    /// 保存時点で固定した撮影日表示
    #[serde(deserialize_with = "crate::lenient::string")]
    pub shot_display: String,

    /// ホロパラメータ（作成ホログラムのみ）
    #[serde(deserialize_with = "crate::lenient::string_map")]
    pub params: ParamMap,

    /// 撮影パラメータ
    #[serde(deserialize_with = "crate::lenient::string_map")]
    pub capture_params: ParamMap,

    /// 計測データ（露光テストのみ）
    #[serde(deserialize_with = "crate::lenient::optional")]
    pub measurement: Option<MeasurementTable>,

    #[serde(
        deserialize_with = "crate::lenient::non_empty_string",
        serialize_with = "crate::lenient::empty_if_none"
    )]
    pub image1: Option<String>,

    #[serde(
        deserialize_with = "crate::lenient::non_empty_string",
        serialize_with = "crate::lenient::empty_if_none"
    )]
    pub image2: Option<String>,

    /// 旧形式の単一写真
    #[serde(
        deserialize_with = "crate::lenient::non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,

    #[serde(deserialize_with = "crate::lenient::string")]
    pub created_at: String,
}

impl Entry {
    /// 一覧・詳細で使う撮影日ラベル
    ///
    /// 優先順位: 保存時の表示 → 撮影日 → 作成日時 → `ー`
    pub fn shot_label(&self) -> String {
        let display = self.shot_display.trim();
        if !display.is_empty() {
            return display.to_string();
        }
        [&self.shot_at, &self.created_at]
            .iter()
            .map(|value| format_date_display(value))
            .find(|label| !label.is_empty())
            .unwrap_or_else(|| EMPTY_DATE_PLACEHOLDER.to_string())
    }

    /// 一覧のサムネイルに使う写真
    pub fn main_image(&self) -> Option<&str> {
        self.image1
            .as_deref()
            .or(self.image.as_deref())
            .or(self.image2.as_deref())
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        match slot {
            ImageSlot::First => self.image1.as_deref().or(self.image.as_deref()),
            ImageSlot::Second => self.image2.as_deref(),
        }
    }

    /// 見出し用タイトル
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(無題)"
        } else {
            &self.title
        }
    }

    /// 見出し (`#番号 タイトル`)
    pub fn badge(&self) -> String {
        format!("#{} {}", self.number, self.display_title())
    }
}

/// 保存前の入力内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub title: String,
    pub memo: String,
    /// 入力されたままの撮影日
    pub shot_at: String,
    pub params: ParamMap,
    pub capture_params: ParamMap,
    pub measurement: Option<MeasurementTable>,
    pub image1: Option<String>,
    pub image2: Option<String>,
}

impl EntryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写真を設定（同じスロットへの再設定は上書き）
    pub fn set_image(&mut self, slot: ImageSlot, data_url: String) {
        match slot {
            ImageSlot::First => self.image1 = Some(data_url),
            ImageSlot::Second => self.image2 = Some(data_url),
        }
    }

    pub fn clear_image(&mut self, slot: ImageSlot) {
        match slot {
            ImageSlot::First => self.image1 = None,
            ImageSlot::Second => self.image2 = None,
        }
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        match slot {
            ImageSlot::First => self.image1.as_deref(),
            ImageSlot::Second => self.image2.as_deref(),
        }
    }

    pub(crate) fn take_images(&mut self) -> (Option<String>, Option<String>) {
        (self.image1.take(), self.image2.take())
    }

    /// 計測モードに応じて撮影パラメータのダッシュを整える
    ///
    /// 計測テーブル側で値を決める項目は `－` に固定し、もう一方の項目に
    /// 残ったダッシュは空に戻す。計測テーブルが無ければ両方とも戻す。
    pub fn apply_capture_placeholders(&mut self) {
        let dashed = self
            .measurement
            .as_ref()
            .map(|table| table.mode.dashed_capture_key());
        for key in [capture_params::SHUTTER_TIME, capture_params::L3_HOLOPLATE] {
            if Some(key) == dashed {
                self.capture_params
                    .insert(key.to_string(), capture_params::DASH_PLACEHOLDER.to_string());
            } else if self.capture_params.get(key).map(String::as_str)
                == Some(capture_params::DASH_PLACEHOLDER)
            {
                self.capture_params.insert(key.to_string(), String::new());
            }
        }
    }

    /// 撮影パラメータの数値を読む（先頭の数値部分のみ）
    pub fn capture_number(&self, key: &str) -> Option<f64> {
        self.capture_params
            .get(key)
            .and_then(|v| crate::measurement::parse_leading_number(v))
    }
}
