//! 文档目录适配器 - 业务能力层
//!
//! 只负责"列出 / 读取交易文档"能力，不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::StoreError;

/// 文档目录（VDR）
///
/// 职责：
/// - 目录不存在时自动创建
/// - 按文件名字典序列出可识别扩展名的文档
/// - 过滤掉已处理的文档
/// - 读取单个文档全文
/// - 跳过程序自己写在目录里的文件（审查日志、进度文件）
pub struct DocumentStore {
    root: PathBuf,
    extensions: Vec<String>,
    excluded: Vec<PathBuf>,
}

impl DocumentStore {
    /// 创建新的文档目录适配器
    pub fn new(root: impl AsRef<Path>, extensions: &[String]) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            excluded: Vec::new(),
        }
    }

    /// 列出文档时排除这些文件（路径可以是相对当前目录的）
    pub fn with_excluded<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.excluded
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// 使用配置中的目录和扩展名创建
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.deal_folder, &config.document_extensions)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 确保目录存在，不存在则创建
    pub async fn ensure_folder(&self) -> Result<(), StoreError> {
        let path = self.root.display().to_string();

        if fs::metadata(&self.root).await.is_err() {
            info!("📁 文档目录不存在，正在创建: {}", path);
            fs::create_dir_all(&self.root)
                .await
                .map_err(|e| StoreError::folder_unavailable(&path, e))?;
        }

        let metadata = fs::metadata(&self.root)
            .await
            .map_err(|e| StoreError::folder_unavailable(&path, e))?;
        if !metadata.is_dir() {
            return Err(StoreError::folder_unavailable(
                &path,
                std::io::Error::new(std::io::ErrorKind::Other, "路径不是目录"),
            ));
        }

        Ok(())
    }

    /// 列出目录中所有可识别的文档（按文件名排序）
    pub async fn list_documents(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_folder().await?;

        let path = self.root.display().to_string();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::folder_unavailable(&path, e))?;

        let excluded = self.resolved_exclusions().await;
        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::folder_unavailable(&path, e))?
        {
            let entry_path = entry.path();
            if !self.is_recognized(&entry_path) || !is_candidate_file(&entry).await {
                continue;
            }
            if !excluded.is_empty() {
                let resolved = fs::canonicalize(&entry_path)
                    .await
                    .unwrap_or_else(|_| entry_path.clone());
                if excluded.contains(&resolved) {
                    debug!("跳过程序文件: {}", entry_path.display());
                    continue;
                }
            }
            if let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) {
                ids.push(name.to_string());
            }
        }

        ids.sort();
        debug!("目录 {} 中共有 {} 个文档", path, ids.len());
        Ok(ids)
    }

    /// 列出尚未处理的文档
    ///
    /// # 参数
    /// - `processed_ids`: 已处理的文档标识
    ///
    /// # 返回
    /// 按文件名字典序排列的未处理文档标识
    pub async fn list_unprocessed(&self, processed_ids: &[String]) -> Result<Vec<String>, StoreError> {
        let unprocessed: Vec<String> = self
            .list_documents()
            .await?
            .into_iter()
            .filter(|id| !processed_ids.contains(id))
            .collect();

        debug!("未处理文档: {} 个", unprocessed.len());
        Ok(unprocessed)
    }

    /// 读取文档全文
    ///
    /// 非 UTF-8 字节按替换字符处理。文档在列出后被删除时返回 `NotFound`。
    pub async fn read_document(&self, id: &str) -> Result<String, StoreError> {
        let path = self.root.join(id);
        match fs::read(&path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { id: id.to_string() })
            }
            Err(e) => Err(StoreError::ReadFailed {
                id: id.to_string(),
                source: Box::new(e),
            }),
        }
    }

    /// 已存在的排除文件的规范路径（还没创建的文件不可能被列出）
    async fn resolved_exclusions(&self) -> Vec<PathBuf> {
        let mut resolved = Vec::with_capacity(self.excluded.len());
        for path in &self.excluded {
            if let Ok(canonical) = fs::canonicalize(path).await {
                resolved.push(canonical);
            }
        }
        resolved
    }

    fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }
}

/// 普通文件，或者指向非目录的符号链接
///
/// 失效的链接也算：它会在读取时以 `NotFound` 被跳过。
async fn is_candidate_file(entry: &fs::DirEntry) -> bool {
    match entry.file_type().await {
        Ok(file_type) if file_type.is_file() => true,
        Ok(file_type) if file_type.is_symlink() => match fs::metadata(entry.path()).await {
            Ok(meta) => meta.is_file(),
            Err(_) => true,
        },
        _ => false,
    }
}
