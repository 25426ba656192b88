//! 文档审查流程 - 流程层
//!
//! 核心职责：定义流水线的三个步骤
//!
//! 1. `scan`：找到第一个未处理文档并读入
//! 2. `classify`：对读入的文档做风险分类（没有文档时给出终止标记）
//! 3. `accumulate`：把结果追加到审查日志，并标记文档已处理
//!
//! 每一步只读 `ProcessingState`，返回 `StateUpdate`，由编排层负责合并。

use tracing::{error, info, warn};

use crate::error::{AppResult, PipelineError, StoreError};
use crate::models::{Alert, Finding, RiskTag};
use crate::services::{AlertWriter, DocumentStore, RiskClassifier};
use crate::utils::logging::truncate_text;
use crate::workflow::state::{CurrentDocument, ProcessingState, StateUpdate};

/// 分类服务失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// 停止运行并返回错误，文档保持未处理，下次运行会重试
    #[default]
    Strict,
    /// 记录一条 `unclassified` 结果并继续
    Lenient,
}

/// 分类步骤的产出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// 一个文档的结果
    Finding(Finding),
    /// 没有文档可处理
    Terminal,
}

/// 扫描步骤的产出
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub update: StateUpdate,
    /// 列出后读取失败、被跳过的文档
    pub skipped: Vec<String>,
}

/// 文档审查流程
///
/// - 编排单个文档的扫描、分类、累积
/// - 不决定何时停止（由编排层的停止策略决定）
pub struct AuditFlow {
    store: DocumentStore,
    classifier: RiskClassifier,
    failure_policy: FailurePolicy,
    alert_writer: Option<AlertWriter>,
}

impl AuditFlow {
    pub fn new(store: DocumentStore, classifier: RiskClassifier) -> Self {
        Self {
            store,
            classifier,
            failure_policy: FailurePolicy::default(),
            alert_writer: None,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_alert_writer(mut self, writer: AlertWriter) -> Self {
        self.alert_writer = Some(writer);
        self
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// 扫描：读入第一个（按文件名排序）可读的未处理文档
    ///
    /// 文档在列出后消失或无法读取时跳过并继续，目录不可用时返回错误。
    pub async fn scan(&self, state: &ProcessingState) -> AppResult<ScanOutcome> {
        let candidates = self.store.list_unprocessed(state.processed_ids()).await?;
        let mut skipped = Vec::new();

        for id in candidates {
            match self.store.read_document(&id).await {
                Ok(text) => {
                    info!("📄 读入文档: {} ({} 字符)", id, text.len());
                    return Ok(ScanOutcome {
                        update: StateUpdate::current(CurrentDocument::Loaded { id, text }),
                        skipped,
                    });
                }
                Err(e @ StoreError::NotFound { .. }) | Err(e @ StoreError::ReadFailed { .. }) => {
                    warn!("⚠️ 跳过文档 {}: {}", id, e);
                    skipped.push(id);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("✓ 没有未处理的文档了");
        Ok(ScanOutcome {
            update: StateUpdate::current(CurrentDocument::NoDocument),
            skipped,
        })
    }

    /// 分类：对当前文档做风险分类
    pub async fn classify(&self, state: &ProcessingState) -> AppResult<Classified> {
        let (id, text) = match state.current_document() {
            CurrentDocument::Loaded { id, text } => (id, text),
            CurrentDocument::NoDocument | CurrentDocument::Pending => {
                return Ok(Classified::Terminal)
            }
        };

        info!("🤖 正在分类: {}", id);
        match self.classifier.classify(id, text).await {
            Ok(finding) => {
                info!(
                    "✓ {} -> {} | {}",
                    id,
                    finding.tag.badge(),
                    truncate_text(&finding.rationale, 80)
                );
                Ok(Classified::Finding(finding))
            }
            Err(e) => match self.failure_policy {
                FailurePolicy::Strict => {
                    error!("❌ 文档 {} 分类失败，停止运行: {}", id, e);
                    Err(PipelineError::ClassificationUnavailable {
                        document: id.clone(),
                        source: e,
                    }
                    .into())
                }
                FailurePolicy::Lenient => {
                    warn!("⚠️ 文档 {} 分类失败，记为 unclassified: {}", id, e);
                    Ok(Classified::Finding(Finding::new(
                        id.as_str(),
                        RiskTag::Unclassified,
                        e.to_string(),
                    )))
                }
            },
        }
    }

    /// 累积：追加结果、标记已处理，并通知（日志 + 审查日志文件）
    pub fn accumulate(&self, classified: Classified) -> AppResult<StateUpdate> {
        let update = match classified {
            Classified::Finding(finding) => StateUpdate {
                processed_ids: vec![finding.document.clone()],
                alerts: vec![Alert::Finding(finding)],
                current_document: None,
            },
            Classified::Terminal => StateUpdate {
                alerts: vec![Alert::Terminal],
                ..StateUpdate::default()
            },
        };

        for alert in &update.alerts {
            info!("🚀 [AGENT ALERT]: {}", alert);
            if let Some(writer) = &self.alert_writer {
                writer.write(alert)?;
            }
        }

        Ok(update)
    }
}
