//! Holo Manager Common Library
//!
//! ホログラム作製ラボの記録（露光テスト・作成ホログラム）のデータモデル、
//! 計測テーブル、記録リポジトリ、エクスポート形式

pub mod clock;
pub mod error;
pub mod format;
pub mod images;
pub mod latex;
pub mod lenient;
pub mod measurement;
pub mod repository;
pub mod snapshot;
pub mod storage;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use format::{format_date_display, format_numeric_text, normalize_date};
pub use latex::build_params_latex;
pub use measurement::{MeasurementMode, MeasurementRow, MeasurementTable, ROW_COUNT};
pub use repository::{EntryRepository, Page, DEFAULT_PAGE_SIZE};
pub use snapshot::{Snapshot, SnapshotDocument};
pub use storage::{MemoryStorage, Storage};
pub use types::{Category, Entry, EntryDraft, ImageSlot, ParamMap};
