//! 永続化ポート
//!
//! キーごとに文字列を保存するだけの最小インターフェース。
//! ブラウザの localStorage と同じ形で、実装はCLI側（ファイル）やテスト側（メモリ）が差し込む。

use crate::error::{Error, Result};
use std::collections::HashMap;

/// 記録データ全体を保存するキー
pub const STATE_KEY: &str = "holo-manager-entries";

/// 区分ごとに発行済みの最大番号を保存するキー
pub const COUNTERS_KEY: &str = "holo-manager-counters";

/// 最後に開いていた区分を保存するキー
pub const ACTIVE_TAB_KEY: &str = "holo-active-tab";

/// キー・値ストレージ
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// メモリ上のストレージ
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書き込みが常に失敗するストレージ（容量超過などの再現用）
    pub fn read_only() -> Self {
        Self {
            values: HashMap::new(),
            read_only: true,
        }
    }

    /// 初期値入りで作る
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        Self {
            values,
            read_only: false,
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::Storage(format!("{} への書き込みが拒否されました", key)));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_get_set() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get(STATE_KEY).unwrap(), None);
        storage.set(STATE_KEY, "{}").unwrap();
        assert_eq!(storage.get(STATE_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_memory_storage_read_only() {
        let mut storage = MemoryStorage::read_only();
        let result = storage.set(ACTIVE_TAB_KEY, "product");
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(storage.get(ACTIVE_TAB_KEY).unwrap(), None);

        storage.set_read_only(false);
        storage.set(ACTIVE_TAB_KEY, "product").unwrap();
        assert_eq!(storage.get(ACTIVE_TAB_KEY).unwrap().as_deref(), Some("product"));
    }

    #[test]
    fn test_boxed_storage() {
        let mut storage: Box<dyn Storage> = Box::new(MemoryStorage::with_value(STATE_KEY, "x"));
        assert_eq!(storage.get(STATE_KEY).unwrap().as_deref(), Some("x"));
        storage.set(STATE_KEY, "y").unwrap();
        assert_eq!(storage.get(STATE_KEY).unwrap().as_deref(), Some("y"));
    }
}
