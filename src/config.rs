use crate::error::{HoloError, Result};
use holo_manager_common::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データ保存先を上書きする環境変数
pub const DATA_DIR_ENV: &str = "HOLO_MANAGER_DATA_DIR";

/// 記録データのファイル名
pub const DATA_FILE_NAME: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| HoloError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("holo-manager").join("config.json"))
    }

    /// 記録データの保存ディレクトリ
    ///
    /// 環境変数 → 設定ファイル → OS標準のデータディレクトリ の順
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| HoloError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("holo-manager"))
    }

    pub fn data_file(&self) -> Result<PathBuf> {
        Ok(self.resolve_data_dir()?.join(DATA_FILE_NAME))
    }

    /// エクスポート先（未設定ならカレント）
    pub fn resolve_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(HoloError::InvalidArgument(
                "ページサイズは1以上を指定してください".into(),
            ));
        }
        self.page_size = page_size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_page_size() {
        assert_eq!(Config::default().page_size, 12);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/holo")),
            export_dir: None,
            page_size: 20,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export_dir": "/tmp/out"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.resolve_export_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_set_page_size_rejects_zero() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_page_size(0),
            Err(HoloError::InvalidArgument(_))
        ));
        config.set_page_size(5).unwrap();
        assert_eq!(config.page_size, 5);
    }
}
