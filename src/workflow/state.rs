//! 流水线状态
//!
//! `ProcessingState` 在整次运行中只有一份，按引用传给每一步。
//! 每一步产出一个 `StateUpdate`，合并规则按字段区分：
//! - `processed_ids`：追加（去重，不删除、不重排）
//! - `alerts`：追加（终止标记每次运行最多一个）
//! - `current_document`：替换

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Alert;

/// 当前正在处理的文档
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CurrentDocument {
    /// 运行尚未开始扫描
    #[default]
    Pending,
    /// 已读入的文档
    Loaded { id: String, text: String },
    /// 没有未处理的文档了
    NoDocument,
}

/// 一步产出的增量
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub processed_ids: Vec<String>,
    pub alerts: Vec<Alert>,
    pub current_document: Option<CurrentDocument>,
}

impl StateUpdate {
    pub fn current(document: CurrentDocument) -> Self {
        Self {
            current_document: Some(document),
            ..Self::default()
        }
    }
}

/// 审查日志（只追加）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertLog {
    entries: Vec<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加审查结果，保持到达顺序
    ///
    /// 日志里已有终止标记时，再来的终止标记会被忽略。
    pub fn append(&mut self, alerts: impl IntoIterator<Item = Alert>) {
        for alert in alerts {
            if alert.is_terminal() && self.has_terminal() {
                warn!("⚠️ 本次运行已写入终止标记，忽略重复的终止标记");
                continue;
            }
            self.entries.push(alert);
        }
    }

    pub fn has_terminal(&self) -> bool {
        self.entries.iter().any(Alert::is_terminal)
    }

    pub fn entries(&self) -> &[Alert] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 只保留审查结果（去掉终止标记），用于续跑
    pub fn without_terminal(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|a| !a.is_terminal())
                .cloned()
                .collect(),
        }
    }
}

/// 流水线运行状态
#[derive(Debug, Clone)]
pub struct ProcessingState {
    source_path: String,
    processed_ids: Vec<String>,
    alerts: AlertLog,
    current_document: CurrentDocument,
}

impl ProcessingState {
    /// 新的一次运行，已处理列表和审查日志为空
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            processed_ids: Vec::new(),
            alerts: AlertLog::new(),
            current_document: CurrentDocument::Pending,
        }
    }

    /// 带着上次保存的进度开始新的一次运行
    ///
    /// 上次的终止标记不会带入。
    pub fn resume(source_path: impl Into<String>, processed_ids: Vec<String>, alerts: AlertLog) -> Self {
        let mut state = Self::new(source_path);
        state.apply(StateUpdate {
            processed_ids,
            alerts: alerts.without_terminal().entries,
            current_document: None,
        });
        state
    }

    /// 合并一步的增量
    pub fn apply(&mut self, update: StateUpdate) {
        for id in update.processed_ids {
            if !self.processed_ids.contains(&id) {
                self.processed_ids.push(id);
            }
        }
        self.alerts.append(update.alerts);
        if let Some(document) = update.current_document {
            self.current_document = document;
        }
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn processed_ids(&self) -> &[String] {
        &self.processed_ids
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn current_document(&self) -> &CurrentDocument {
        &self.current_document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, RiskTag};

    fn finding(doc: &str) -> Alert {
        Alert::Finding(Finding::new(doc, RiskTag::Clear, "ok"))
    }

    #[test]
    fn test_apply_merges_by_field() {
        let mut state = ProcessingState::new("./deal");

        state.apply(StateUpdate::current(CurrentDocument::Loaded {
            id: "a.txt".to_string(),
            text: "A".to_string(),
        }));
        state.apply(StateUpdate {
            processed_ids: vec!["a.txt".to_string()],
            alerts: vec![finding("a.txt")],
            current_document: None,
        });
        state.apply(StateUpdate {
            processed_ids: vec!["a.txt".to_string(), "b.txt".to_string()],
            alerts: vec![finding("b.txt")],
            current_document: Some(CurrentDocument::NoDocument),
        });

        assert_eq!(state.source_path(), "./deal");
        assert_eq!(state.processed_ids(), ["a.txt", "b.txt"]);
        assert_eq!(state.alerts().len(), 2);
        assert_eq!(state.current_document(), &CurrentDocument::NoDocument);
    }

    #[test]
    fn test_terminal_marker_appended_once() {
        let mut log = AlertLog::new();
        log.append(vec![finding("a.txt"), Alert::Terminal]);
        log.append(vec![Alert::Terminal]);

        assert_eq!(log.len(), 2);
        assert!(log.has_terminal());
        assert_eq!(log.without_terminal().len(), 1);
    }

    #[test]
    fn test_resume_drops_previous_terminal() {
        let mut log = AlertLog::new();
        log.append(vec![finding("a.txt"), Alert::Terminal]);

        let state = ProcessingState::resume("./deal", vec!["a.txt".to_string()], log);
        assert_eq!(state.processed_ids(), ["a.txt"]);
        assert_eq!(state.alerts().len(), 1);
        assert!(!state.alerts().has_terminal());
        assert_eq!(state.current_document(), &CurrentDocument::Pending);
    }
}
