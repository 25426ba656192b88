//! 运行进度持久化
//!
//! 把已处理列表和审查结果存成 JSON，下次运行可以接着跑。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::workflow::{AlertLog, ProcessingState};

#[derive(Debug, Serialize, Deserialize)]
struct SavedProgress {
    source_path: String,
    processed_ids: Vec<String>,
    alerts: AlertLog,
    saved_at: String,
}

/// 进度文件
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 相对路径放在交易目录里
    pub fn in_folder(deal_folder: &Path, state_file: &str) -> Self {
        let file = Path::new(state_file);
        if file.is_absolute() {
            Self::new(file)
        } else {
            Self::new(deal_folder.join(file))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存进度（终止标记不保存）
    pub async fn save(&self, state: &ProcessingState) -> AppResult<()> {
        let progress = SavedProgress {
            source_path: state.source_path().to_string(),
            processed_ids: state.processed_ids().to_vec(),
            alerts: state.alerts().without_terminal(),
            saved_at: chrono::Local::now().to_rfc3339(),
        };

        let json = serde_json::to_string_pretty(&progress)?;
        let shown = self.path.display().to_string();
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::file_write_failed(&shown, e))?;

        info!(
            "💾 进度已保存: {} (已处理 {} 个文档)",
            shown,
            progress.processed_ids.len()
        );
        Ok(())
    }

    /// 读取进度；文件不存在时从头开始
    pub async fn load(&self, source_path: &str) -> AppResult<ProcessingState> {
        let shown = self.path.display().to_string();
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("进度文件不存在，从头开始: {}", shown);
                return Ok(ProcessingState::new(source_path));
            }
            Err(e) => return Err(AppError::file_read_failed(&shown, e)),
        };

        let progress: SavedProgress =
            serde_json::from_str(&content).map_err(|e| AppError::json_parse_failed(&shown, e))?;

        info!(
            "📂 读取进度: {} (已处理 {} 个文档, 保存于 {})",
            shown,
            progress.processed_ids.len(),
            progress.saved_at
        );
        Ok(ProcessingState::resume(
            source_path,
            progress.processed_ids,
            progress.alerts,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Alert, Finding, RiskTag};
    use crate::workflow::StateUpdate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load_carries_progress_forward() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::in_folder(dir.path(), ".audit_state.json");

        let mut state = ProcessingState::new("deal");
        state.apply(StateUpdate {
            processed_ids: vec!["doc1.txt".to_string()],
            alerts: vec![
                Alert::Finding(Finding::new("doc1.txt", RiskTag::Critical, "lien")),
                Alert::Terminal,
            ],
            current_document: None,
        });
        store.save(&state).await.unwrap();

        let loaded = store.load("deal").await.unwrap();
        assert_eq!(loaded.processed_ids(), ["doc1.txt"]);
        assert_eq!(loaded.alerts().len(), 1);
        assert!(!loaded.alerts().has_terminal());
    }

    #[tokio::test]
    async fn test_load_missing_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::in_folder(dir.path(), "state.json");

        let state = store.load("deal").await.unwrap();
        assert!(state.processed_ids().is_empty());
        assert!(state.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::in_folder(dir.path(), "state.json");
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.load("deal").await.unwrap_err();
        assert!(matches!(err, AppError::File(_)));
    }
}
