//! 記録リポジトリ
//!
//! 露光テスト・作成ホログラムの一覧を保持し、採番・追加・削除・メモ更新と
//! ページ送り、最後に開いていた区分の記憶を担当する。
//!
//! 変更はすべてメモリ上で先に反映し、その後ストレージへ書き込む。
//! 書き込みに失敗してもメモリ上の状態は戻さない。失敗内容は
//! [`EntryRepository::take_persist_error`] で呼び出し側が取り出す。

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::format::{normalize_date, shot_display};
use crate::snapshot::{snapshot_file_name, Snapshot, SnapshotDocument};
use crate::storage::{Storage, ACTIVE_TAB_KEY, COUNTERS_KEY, STATE_KEY};
use crate::types::{Category, Entry, EntryDraft, ParamMap, MAX_ENTRY_NUMBER};
use chrono::{Local, SecondsFormat};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use uuid::Uuid;

/// 1ページあたりの件数
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// 一覧の1ページ分
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    pub entries: &'a [Entry],
    /// 1始まり
    pub page: usize,
    /// 0件でも1
    pub total_pages: usize,
    pub total: usize,
}

pub struct EntryRepository<S: Storage> {
    storage: S,
    state: Snapshot,
    active: Category,
    pages: HashMap<Category, usize>,
    /// 発行済みの最大番号（削除された番号も含む）
    issued: HashMap<Category, u64>,
    page_size: usize,
    clock: Box<dyn Clock>,
    persist_error: Option<Error>,
}

impl<S: Storage> EntryRepository<S> {
    /// ストレージから状態を読み込んで開く
    ///
    /// 保存データが無い・壊れている場合は空の状態から始める。
    pub fn open(storage: S) -> Self {
        let state = match storage.get(STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => Snapshot::from_value(&value),
                Err(e) => {
                    warn!(error = %e, "保存データを解析できないため空の状態で開きます");
                    Snapshot::default()
                }
            },
            Ok(None) => Snapshot::default(),
            Err(e) => {
                warn!(error = %e, "保存データを読み込めないため空の状態で開きます");
                Snapshot::default()
            }
        };

        let active = match storage.get(ACTIVE_TAB_KEY) {
            Ok(Some(raw)) => raw.parse::<Category>().unwrap_or_else(|_| {
                warn!(value = %raw, "不明な区分のため既定の区分を使います");
                Category::default()
            }),
            Ok(None) => Category::default(),
            Err(e) => {
                warn!(error = %e, "区分を読み込めないため既定の区分を使います");
                Category::default()
            }
        };

        let issued = load_counters(&storage);

        debug!(
            test = state.test.len(),
            product = state.product.len(),
            active = %active,
            "リポジトリを開きました"
        );

        Self {
            storage,
            state,
            active,
            pages: HashMap::new(),
            issued,
            page_size: DEFAULT_PAGE_SIZE,
            clock: Box::new(SystemClock),
            persist_error: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// 現在の状態全体
    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    /// 区分の一覧（新しい順）
    pub fn list_entries(&self, category: Category) -> &[Entry] {
        self.state.entries(category)
    }

    /// 次に割り当てる番号
    ///
    /// 既存の最大番号と発行済みの最大番号の大きい方+1（どちらも無ければ1）。
    /// 削除された番号は再利用せず、残りの記録も詰めない。
    /// 読み込み時に [`MAX_ENTRY_NUMBER`] を超える番号は除外しているため桁あふれしない。
    pub fn next_number(&self, category: Category) -> u64 {
        let existing = self
            .state
            .entries(category)
            .iter()
            .map(|e| e.number)
            .max()
            .unwrap_or(0);
        let issued = self.issued.get(&category).copied().unwrap_or(0);
        existing.max(issued).saturating_add(1)
    }

    pub fn find_by_id(&self, category: Category, id: &str) -> Option<&Entry> {
        self.state.entries(category).iter().find(|e| e.id == id)
    }

    /// 入力内容から記録を作成し、一覧の先頭に追加する
    ///
    /// 撮影日表示はこの時点で固定する。保存の成否にかかわらず作成した記録を返す。
    pub fn create_entry(&mut self, category: Category, mut draft: EntryDraft) -> Entry {
        let shot_at = normalize_date(&draft.shot_at);
        let title = match draft.title.trim() {
            "" => category.label().to_string(),
            title => title.to_string(),
        };
        let params = match category {
            Category::Product => trim_values(&draft.params),
            Category::Test => ParamMap::new(),
        };
        let measurement = match category {
            Category::Test => draft.measurement.take(),
            Category::Product => None,
        };
        let (image1, image2) = draft.take_images();

        let entry = Entry {
            id: self.generate_id(category),
            number: self.next_number(category),
            title,
            memo: draft.memo.trim().to_string(),
            shot_display: shot_display(&shot_at),
            shot_at,
            params,
            capture_params: trim_values(&draft.capture_params),
            measurement,
            image1,
            image2,
            image: None,
            created_at: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        self.state.entries_mut(category).insert(0, entry.clone());
        self.issued.insert(category, entry.number);
        self.pages.insert(category, 1);
        debug!(category = %category, number = entry.number, id = %entry.id, "記録を追加しました");
        self.persist_state();
        entry
    }

    /// 記録を削除する
    ///
    /// 確認は呼び出し側で行うこと。削除した場合だけ `true` を返し保存する。
    pub fn delete_entry(&mut self, category: Category, id: &str) -> bool {
        let list = self.state.entries_mut(category);
        let Some(index) = list.iter().position(|e| e.id == id) else {
            return false;
        };
        let removed = list.remove(index);
        debug!(category = %category, number = removed.number, id = %removed.id, "記録を削除しました");
        self.persist_state();
        true
    }

    /// メモだけを書き換える（作成後に変更できる唯一の項目）
    pub fn update_memo(&mut self, category: Category, id: &str, memo: &str) -> bool {
        let Some(entry) = self
            .state
            .entries_mut(category)
            .iter_mut()
            .find(|e| e.id == id)
        else {
            return false;
        };
        entry.memo = memo.trim().to_string();
        self.persist_state();
        true
    }

    pub fn active_category(&self) -> Category {
        self.active
    }

    /// 区分を切り替えて記憶する（その区分のページは1に戻る）
    pub fn set_active_category(&mut self, category: Category) {
        self.active = category;
        self.pages.insert(category, 1);
        if let Err(e) = self.storage.set(ACTIVE_TAB_KEY, category.key()) {
            warn!(error = %e, "区分を保存できませんでした");
            self.persist_error = Some(e);
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 区分のページ数（0件でも1）
    pub fn total_pages(&self, category: Category) -> usize {
        self.state.entries(category).len().div_ceil(self.page_size).max(1)
    }

    /// 現在のページ（件数が減っていれば範囲内に丸める）
    pub fn current_page(&self, category: Category) -> usize {
        let page = self.pages.get(&category).copied().unwrap_or(1);
        page.clamp(1, self.total_pages(category))
    }

    pub fn set_page(&mut self, category: Category, page: usize) -> usize {
        let page = page.clamp(1, self.total_pages(category));
        self.pages.insert(category, page);
        page
    }

    pub fn next_page(&mut self, category: Category) -> usize {
        let page = self.current_page(category) + 1;
        self.set_page(category, page)
    }

    pub fn prev_page(&mut self, category: Category) -> usize {
        let page = self.current_page(category).saturating_sub(1);
        self.set_page(category, page)
    }

    /// 現在ページの記録
    pub fn page(&self, category: Category) -> Page<'_> {
        let list = self.state.entries(category);
        let page = self.current_page(category);
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(list.len());
        Page {
            entries: list.get(start..end).unwrap_or(&[]),
            page,
            total_pages: self.total_pages(category),
            total: list.len(),
        }
    }

    /// 全データをエクスポート用ドキュメントにする
    pub fn export_snapshot(&self) -> Result<SnapshotDocument> {
        let contents = serde_json::to_string_pretty(&self.state)?;
        let file_name = snapshot_file_name(&self.clock.now().with_timezone(&Local));
        Ok(SnapshotDocument {
            file_name,
            contents,
        })
    }

    /// 読み込んだドキュメントで状態を丸ごと置き換える
    ///
    /// 形が不正でも失敗しない。戻り値は保存に成功したかどうか。
    pub fn import_snapshot(&mut self, document: &Value) -> bool {
        self.state = Snapshot::from_value(document);
        self.pages.clear();
        debug!(
            test = self.state.test.len(),
            product = self.state.product.len(),
            "インポートしました"
        );
        self.persist_state()
    }

    /// JSON文字列からインポート（JSONとして読めない場合だけエラー）
    pub fn import_snapshot_str(&mut self, text: &str) -> Result<bool> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.import_snapshot(&value))
    }

    /// 直近の保存失敗を取り出す
    pub fn take_persist_error(&mut self) -> Option<Error> {
        self.persist_error.take()
    }

    fn persist_state(&mut self) -> bool {
        let counters: BTreeMap<&str, u64> = self
            .issued
            .iter()
            .map(|(category, number)| (category.key(), *number))
            .collect();
        let result = serde_json::to_string(&self.state)
            .map_err(Error::from)
            .and_then(|json| self.storage.set(STATE_KEY, &json))
            .and_then(|()| serde_json::to_string(&counters).map_err(Error::from))
            .and_then(|json| self.storage.set(COUNTERS_KEY, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "保存に失敗しました（メモリ上の変更は保持されます）");
                self.persist_error = Some(e);
                false
            }
        }
    }

    fn generate_id(&self, category: Category) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.find_by_id(category, &id).is_none() {
                return id;
            }
        }
    }
}

/// 発行済み番号を読む（無い・壊れている場合は空）
fn load_counters<S: Storage>(storage: &S) -> HashMap<Category, u64> {
    let raw = match storage.get(COUNTERS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HashMap::new(),
        Err(e) => {
            warn!(error = %e, "発行済み番号を読み込めません");
            return HashMap::new();
        }
    };
    let counters: BTreeMap<String, u64> = match serde_json::from_str(&raw) {
        Ok(counters) => counters,
        Err(e) => {
            warn!(error = %e, "発行済み番号を解析できません");
            return HashMap::new();
        }
    };
    counters
        .into_iter()
        .filter_map(|(key, number)| {
            if number > MAX_ENTRY_NUMBER {
                warn!(category = %key, number, "発行済み番号が上限を超えるため無視します");
                return None;
            }
            Some((key.parse::<Category>().ok()?, number))
        })
        .collect()
}

fn trim_values(params: &ParamMap) -> ParamMap {
    params
        .iter()
        .map(|(k, v)| (k.clone(), v.trim().to_string()))
        .collect()
}
