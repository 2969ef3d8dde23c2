use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::StateError;
use crate::utils::time_utils;

/// 已下载图片的持久化记录
///
/// 图片ID → 下载完成时间 (ISO-8601)。启动时加载一次,每页处理完后保存。
/// 不支持多个进程同时写同一个状态文件。
#[derive(Debug, Clone)]
pub struct DownloadState {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl DownloadState {
    /// 从状态文件加载
    ///
    /// 文件不存在时返回空状态。
    ///
    /// # 错误
    /// - `StateError::Corrupt`: 文件存在但不是合法的 `{id: timestamp}` JSON
    /// - `StateError::Io`: 文件无法读取
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "状态文件不存在,从空状态开始");
                return Ok(Self {
                    path,
                    entries: BTreeMap::new(),
                });
            }
            Err(e) => {
                return Err(StateError::Io {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let entries: BTreeMap<String, String> =
            serde_json::from_slice(&content).map_err(|e| StateError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            "状态文件已加载"
        );

        Ok(Self { path, entries })
    }

    /// 记录一张图片已下载 (当前UTC时间),仅修改内存
    pub fn mark(&mut self, img_id: &str) {
        self.entries
            .insert(img_id.to_string(), time_utils::now_iso8601());
    }

    pub fn contains(&self, img_id: &str) -> bool {
        self.entries.contains_key(img_id)
    }

    /// 原子地保存全部记录
    ///
    /// 先写入同目录下的临时文件再 rename,状态文件要么是旧的完整内容,
    /// 要么是新的完整内容。
    pub fn save(&self) -> Result<(), StateError> {
        let io_error = |e: std::io::Error| StateError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_vec_pretty(&self.entries).map_err(|e| StateError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let tmp_path = temp_path(&self.path);
        {
            let mut file = fs::File::create(&tmp_path).map_err(io_error)?;
            file.write_all(&content).map_err(io_error)?;
            file.sync_all().map_err(io_error)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(io_error)?;

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "状态文件已保存"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 保存时使用的临时文件: `<state>.tmp`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
