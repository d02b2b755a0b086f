use crate::error::{HoloError, Result};
use clap::{Parser, Subcommand};
use holo_manager_common::{Category, Entry, EntryRepository, MeasurementMode, Storage, ROW_COUNT};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "holo")]
#[command(about = "ホログラム作製ラボの露光テスト・作成ホログラム記録ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 対象の区分 (test/product)（省略時は最後に開いた区分）
    #[arg(short, long, global = true)]
    pub category: Option<Category>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 記録一覧を表示
    List {
        /// ページ番号（1始まり）
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// 対話的にページを送る (n:次 p:前 q:終了)
        #[arg(short, long)]
        interactive: bool,
    },

    /// 記録を追加
    Add {
        /// タイトル（省略時は区分名）
        #[arg(short, long, default_value = "")]
        title: String,

        /// メモ
        #[arg(short, long, default_value = "")]
        memo: String,

        /// 撮影日 (2024 / 2024-03 / 2024/3/5 など)
        #[arg(short, long, default_value = "")]
        shot_at: String,

        /// ホロパラメータ key=value（作成ホログラムのみ）
        #[arg(long = "param")]
        params: Vec<KeyValue>,

        /// 撮影パラメータ key=value
        #[arg(long = "capture")]
        capture: Vec<KeyValue>,

        /// 計測モード (shutter/distance)（露光テストのみ）
        #[arg(long)]
        mode: Option<MeasurementMode>,

        /// L3-Holoplate間の値 行番号=値（行番号は1始まり）
        #[arg(long = "distance")]
        distances: Vec<RowValue>,

        /// 決定値にする行番号（1始まり）
        #[arg(long)]
        decision: Option<usize>,

        /// 撮影パラメータの露光面積・露光パワーからシャッター時間を算出
        #[arg(long)]
        calc_shutter: bool,

        /// 写真1
        #[arg(long)]
        image1: Option<PathBuf>,

        /// 写真2
        #[arg(long)]
        image2: Option<PathBuf>,
    },

    /// 記録の詳細を表示
    Show {
        /// 記録ID
        #[arg(required = true)]
        id: String,
    },

    /// メモを更新
    Memo {
        /// 記録ID
        #[arg(required = true)]
        id: String,

        /// 新しいメモ
        #[arg(required = true)]
        text: String,
    },

    /// 記録を削除
    Delete {
        /// 記録ID
        #[arg(required = true)]
        id: String,

        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },

    /// ホロパラメータのLaTeX表を出力（作成ホログラムのみ）
    Latex {
        /// 記録ID
        #[arg(required = true)]
        id: String,

        /// 出力ファイル/ディレクトリ（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 記録の写真をファイルに書き出す
    Photo {
        /// 記録ID
        #[arg(required = true)]
        id: String,

        /// 写真の番号 (1/2)
        #[arg(long, default_value = "1")]
        slot: u8,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long, required = true)]
        output: PathBuf,
    },

    /// 全データをJSONにエクスポート
    Export {
        /// 出力ディレクトリ（省略時は設定の export_dir、未設定ならカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// JSONからインポート（現在のデータは置き換えられます）
    Import {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },

    /// 区分を表示/切り替え
    Tab {
        /// 切り替え先 (test/product)
        category: Option<Category>,
    },

    /// 計測テーブルをプレビュー
    Table {
        /// 計測モード (shutter/distance)
        #[arg(long, default_value = "shutter")]
        mode: MeasurementMode,

        /// 露光パワーの面積 [cm2]
        #[arg(long)]
        area: Option<f64>,

        /// 露光パワー [μW]
        #[arg(long)]
        power: Option<f64>,
    },

    /// 設定を表示/編集
    Config {
        /// 記録データの保存ディレクトリを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// エクスポート先ディレクトリを設定
        #[arg(long)]
        set_export_dir: Option<PathBuf>,

        /// 1ページの件数を設定
        #[arg(long)]
        set_page_size: Option<usize>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `key=value` 形式の引数
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl FromStr for KeyValue {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("key=value の形式で指定してください: {}", s))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("キーが空です: {}", s));
        }
        Ok(KeyValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// `行番号=値` 形式の引数（行番号は1始まり）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowValue {
    pub row: usize,
    pub value: String,
}

impl RowValue {
    /// 0始まりの行インデックス
    pub fn index(&self) -> usize {
        self.row - 1
    }
}

impl FromStr for RowValue {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (row, value) = s
            .split_once('=')
            .ok_or_else(|| format!("行番号=値 の形式で指定してください: {}", s))?;
        let row: usize = row
            .trim()
            .parse()
            .map_err(|_| format!("行番号が数値ではありません: {}", s))?;
        if row == 0 {
            return Err("行番号は1から指定してください".to_string());
        }
        Ok(RowValue {
            row,
            value: value.to_string(),
        })
    }
}

/// 一覧の対話ページ送りの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Next,
    Prev,
    Quit,
}

/// ページ送りの入力を解釈（空入力は次ページ）
pub fn parse_page_action(input: &str) -> Option<PageAction> {
    match input.trim() {
        "" | "n" | "N" => Some(PageAction::Next),
        "p" | "P" => Some(PageAction::Prev),
        "q" | "Q" => Some(PageAction::Quit),
        _ => None,
    }
}

/// IDまたは番号（`7` / `#7`）で記録を探す
pub fn find_entry<'a, S: Storage>(
    repo: &'a EntryRepository<S>,
    category: Category,
    key: &str,
) -> Result<&'a Entry> {
    if let Some(entry) = repo.find_by_id(category, key) {
        return Ok(entry);
    }
    key.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .and_then(|n| repo.list_entries(category).iter().find(|e| e.number == n))
        .ok_or_else(|| HoloError::EntryNotFound(format!("{} ({})", key, category.label())))
}

/// 決定値の行番号（1始まり）を行インデックスにする
pub fn decision_index(row: usize) -> Result<usize> {
    row.checked_sub(1)
        .filter(|i| *i < ROW_COUNT)
        .ok_or_else(|| {
            HoloError::InvalidArgument(format!("決定値の行番号は1〜{}で指定してください", ROW_COUNT))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use holo_manager_common::{EntryDraft, MemoryStorage};

    #[test]
    fn test_key_value_parse() {
        let kv: KeyValue = "size=100x100".parse().unwrap();
        assert_eq!(kv.key, "size");
        assert_eq!(kv.value, "100x100");

        let kv: KeyValue = "reference=a=b".parse().unwrap();
        assert_eq!(kv.value, "a=b");

        assert!("size".parse::<KeyValue>().is_err());
        assert!("=100".parse::<KeyValue>().is_err());
    }

    #[test]
    fn test_row_value_parse() {
        let rv: RowValue = "3=120mm".parse().unwrap();
        assert_eq!(rv.row, 3);
        assert_eq!(rv.index(), 2);
        assert!("0=1".parse::<RowValue>().is_err());
        assert!("x=1".parse::<RowValue>().is_err());
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "holo",
            "--category",
            "test",
            "add",
            "--mode",
            "distance",
            "--distance",
            "1=120",
            "--decision",
            "1",
        ])
        .unwrap();
        assert_eq!(cli.category, Some(Category::Test));
        match cli.command {
            Commands::Add {
                mode, distances, ..
            } => {
                assert_eq!(mode, Some(MeasurementMode::Distance));
                assert_eq!(distances.len(), 1);
            }
            _ => panic!("unexpected command"),
        }
    }

    fn repo_with_entries() -> (EntryRepository<MemoryStorage>, String) {
        let mut repo = EntryRepository::open(MemoryStorage::new());
        for _ in 0..7 {
            repo.create_entry(Category::Test, EntryDraft::new());
        }
        let id = repo.create_entry(Category::Product, EntryDraft::new()).id;
        (repo, id)
    }

    #[test]
    fn test_find_entry_by_id_and_number() {
        let (repo, product_id) = repo_with_entries();
        assert_eq!(find_entry(&repo, Category::Product, &product_id).unwrap().number, 1);
        assert_eq!(find_entry(&repo, Category::Test, "7").unwrap().number, 7);
        assert_eq!(find_entry(&repo, Category::Test, "#3").unwrap().number, 3);
        assert_eq!(find_entry(&repo, Category::Test, " #1 ").unwrap().number, 1);
    }

    #[test]
    fn test_find_entry_not_found() {
        let (repo, product_id) = repo_with_entries();
        assert!(matches!(
            find_entry(&repo, Category::Test, "#8"),
            Err(HoloError::EntryNotFound(_))
        ));
        assert!(matches!(
            find_entry(&repo, Category::Test, &product_id),
            Err(HoloError::EntryNotFound(_))
        ));
        assert!(matches!(
            find_entry(&repo, Category::Product, "abc"),
            Err(HoloError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_decision_index_range() {
        assert_eq!(decision_index(1).unwrap(), 0);
        assert_eq!(decision_index(ROW_COUNT).unwrap(), ROW_COUNT - 1);
        assert!(matches!(decision_index(0), Err(HoloError::InvalidArgument(_))));
        assert!(matches!(
            decision_index(ROW_COUNT + 1),
            Err(HoloError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_page_action() {
        assert_eq!(parse_page_action(""), Some(PageAction::Next));
        assert_eq!(parse_page_action(" n "), Some(PageAction::Next));
        assert_eq!(parse_page_action("p"), Some(PageAction::Prev));
        assert_eq!(parse_page_action("Q"), Some(PageAction::Quit));
        assert_eq!(parse_page_action("x"), None);
    }

    #[test]
    fn test_cli_parses_list_interactive() {
        let cli = Cli::try_parse_from(["holo", "list", "-i", "--page", "2"]).unwrap();
        match cli.command {
            Commands::List { page, interactive } => {
                assert_eq!(page, 2);
                assert!(interactive);
            }
            _ => panic!("unexpected command"),
        }
    }
}
