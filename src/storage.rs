//! ファイル保存のストレージ
//!
//! キー → 文字列のJSONオブジェクトを1ファイルに保持する。
//! 書き込みは一時ファイルへ書いてから置き換える。

use crate::error::Result;
use holo_manager_common::{Error, Storage};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// ファイルを開く（無ければ空、壊れていれば警告して空）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let values = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            match serde_json::from_reader(reader) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "保存ファイルを読めないため空として扱います");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = values.len(), "保存ファイルを開きました");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self) -> std::io::Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &self.values)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> holo_manager_common::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> holo_manager_common::Result<()> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_file() {
            match previous {
                Some(v) => self.values.insert(key.to_string(), v),
                None => self.values.remove(key),
            };
            return Err(Error::Storage(format!("{}: {}", self.path.display(), e)));
        }
        debug!(key, bytes = value.len(), "保存しました");
        Ok(())
    }
}
