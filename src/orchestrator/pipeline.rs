//! 审查流水线 - 编排层
//!
//! 扫描 → 分类 → 累积 三步循环，直到没有未处理文档后停止。

use tracing::{debug, info};

use crate::error::AppResult;
use crate::workflow::{AuditFlow, Classified, ProcessingState};

/// 停止条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HaltPolicy {
    /// 处理完所有文档后追加终止标记再停止
    #[default]
    UntilExhausted,
    /// 处理一个文档后立即停止（没有文档时同样以终止标记结束）
    SingleDocument,
}

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// 已追加终止标记
    Exhausted,
    /// 单文档模式下处理完一个文档
    SingleDocument,
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub halted_by: HaltReason,
    pub findings_added: usize,
    /// 本次运行中被跳过的文档（已去重）
    pub skipped: Vec<String>,
}

#[derive(Debug)]
enum Phase {
    Scanning,
    Classifying,
    Accumulating(Classified),
    Halted(HaltReason),
}

/// 审查流水线
pub struct AuditPipeline {
    flow: AuditFlow,
    halt_policy: HaltPolicy,
}

impl AuditPipeline {
    pub fn new(flow: AuditFlow) -> Self {
        Self {
            flow,
            halt_policy: HaltPolicy::default(),
        }
    }

    pub fn with_halt_policy(mut self, policy: HaltPolicy) -> Self {
        self.halt_policy = policy;
        self
    }

    pub fn flow(&self) -> &AuditFlow {
        &self.flow
    }

    /// 运行到停止
    ///
    /// 状态就地更新：出错返回时，之前已完成的文档仍保留在 `state` 中，
    /// 调用方可以保存后重跑。
    pub async fn run(&self, state: &mut ProcessingState) -> AppResult<RunReport> {
        self.flow.store().ensure_folder().await?;

        let mut findings_added = 0;
        let mut skipped: Vec<String> = Vec::new();
        let mut phase = Phase::Scanning;

        loop {
            debug!("流水线阶段: {:?}", phase);
            phase = match phase {
                Phase::Scanning => {
                    let outcome = self.flow.scan(state).await?;
                    for id in outcome.skipped {
                        if !skipped.contains(&id) {
                            skipped.push(id);
                        }
                    }
                    state.apply(outcome.update);
                    Phase::Classifying
                }
                Phase::Classifying => Phase::Accumulating(self.flow.classify(state).await?),
                Phase::Accumulating(classified) => {
                    let terminal = matches!(classified, Classified::Terminal);
                    let update = self.flow.accumulate(classified)?;
                    if !terminal {
                        findings_added += 1;
                    }
                    state.apply(update);

                    if terminal {
                        Phase::Halted(HaltReason::Exhausted)
                    } else if self.halt_policy == HaltPolicy::SingleDocument {
                        Phase::Halted(HaltReason::SingleDocument)
                    } else {
                        Phase::Scanning
                    }
                }
                Phase::Halted(reason) => {
                    info!(
                        "🏁 流水线停止 ({:?}): 新增 {} 条结果, 共处理 {} 个文档",
                        reason,
                        findings_added,
                        state.processed_ids().len()
                    );
                    return Ok(RunReport {
                        halted_by: reason,
                        findings_added,
                        skipped,
                    });
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ReasoningService;
    use crate::error::LlmError;
    use crate::services::{DocumentStore, RiskClassifier};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct ClearReasoner;

    #[async_trait]
    impl ReasoningService for ClearReasoner {
        async fn invoke(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok("[GREEN] standard terms".to_string())
        }
    }

    fn pipeline(root: &std::path::Path) -> AuditPipeline {
        AuditPipeline::new(AuditFlow::new(
            DocumentStore::new(root, &["txt".to_string()]),
            RiskClassifier::new(Arc::new(ClearReasoner)),
        ))
    }

    #[tokio::test]
    async fn test_single_document_policy_stops_after_one() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();

        let pipeline = pipeline(dir.path()).with_halt_policy(HaltPolicy::SingleDocument);
        let mut state = ProcessingState::new("deal");
        let report = pipeline.run(&mut state).await.unwrap();

        assert_eq!(report.halted_by, HaltReason::SingleDocument);
        assert_eq!(report.findings_added, 1);
        assert_eq!(state.processed_ids(), ["a.txt"]);
        assert!(!state.alerts().has_terminal());
    }

    #[tokio::test]
    async fn test_single_document_policy_on_empty_folder_ends_with_terminal() {
        let dir = TempDir::new().unwrap();

        let pipeline = pipeline(dir.path()).with_halt_policy(HaltPolicy::SingleDocument);
        let mut state = ProcessingState::new("deal");
        let report = pipeline.run(&mut state).await.unwrap();

        assert_eq!(report.halted_by, HaltReason::Exhausted);
        assert_eq!(state.alerts().len(), 1);
        assert!(state.alerts().has_terminal());
    }
}
