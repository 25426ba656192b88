//! 应用入口 - 编排层
//!
//! 持有配置，按命令组装 clients / services / workflow 并执行。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::{LlmClient, ReasoningService};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Alert, CaseMetadata, Finding};
use crate::orchestrator::pipeline::{AuditPipeline, HaltPolicy, RunReport};
use crate::services::{
    pdf_import, AlertWriter, CredentialStore, DocumentStore, LetterDrafter, LetterExporter,
    RiskClassifier, StateStore,
};
use crate::utils::logging::{log_run_stats, log_startup};
use crate::workflow::{AuditFlow, FailurePolicy, ProcessingState};

/// 默认导出文件名
pub const DEFAULT_LETTER_FILE: &str = "Objection_Notice.pdf";

/// `audit` 命令的选项
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditOptions {
    /// 接着上次保存的进度继续
    pub resume: bool,
    pub halt_policy: HaltPolicy,
    pub failure_policy: FailurePolicy,
}

/// `audit` 命令的结果
#[derive(Debug)]
pub struct AuditOutcome {
    pub state: ProcessingState,
    pub report: RunReport,
}

/// `draft` 命令的选项
#[derive(Debug, Clone)]
pub struct DraftOptions {
    pub case: CaseMetadata,
    /// 审查结果 JSON 文件，未指定时读取保存的进度
    pub findings_file: Option<PathBuf>,
    pub out: PathBuf,
}

/// `draft` 命令的结果
#[derive(Debug)]
pub struct DraftOutcome {
    pub letter: String,
    pub pdf_path: PathBuf,
}

/// 应用主结构
pub struct App {
    config: Config,
    service: Option<Arc<dyn ReasoningService>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            service: None,
        }
    }

    /// 指定推理服务（不指定时按配置创建 LlmClient）
    pub fn with_reasoning_service(mut self, service: Arc<dyn ReasoningService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 登录校验
    ///
    /// 未配置凭据文件时直接放行。
    pub async fn authorize(&self, username: Option<&str>, password: Option<&str>) -> AppResult<()> {
        let Some(path) = &self.config.credentials_file else {
            return Ok(());
        };

        let store = CredentialStore::load(Path::new(path)).await?;
        let username = username.unwrap_or_default();
        if store.check(username, password.unwrap_or_default()) {
            info!("🔑 登录成功: {}", username);
            Ok(())
        } else {
            Err(AppError::Unauthorized {
                username: username.to_string(),
            })
        }
    }

    /// 审查交易目录
    ///
    /// 无论是否中途停止，进度都会保存，供 `draft` 和下一次 `--resume` 使用。
    pub async fn audit(&self, options: AuditOptions) -> AppResult<AuditOutcome> {
        let service = self.reasoning_service()?;
        log_startup(&self.config.deal_folder, service.model_name());

        let store = DocumentStore::from_config(&self.config);
        let state_store = StateStore::in_folder(store.root(), &self.config.state_file);
        let store = store.with_excluded([
            Path::new(&self.config.alert_log_file),
            state_store.path(),
        ]);

        let mut state = if options.resume {
            state_store.load(&self.config.deal_folder).await?
        } else {
            ProcessingState::new(self.config.deal_folder.as_str())
        };

        let alert_writer = AlertWriter::with_path(self.config.alert_log_file.as_str());
        alert_writer.write_run_header(&self.config.deal_folder)?;

        let flow = AuditFlow::new(store, RiskClassifier::new(service))
            .with_failure_policy(options.failure_policy)
            .with_alert_writer(alert_writer);
        let pipeline = AuditPipeline::new(flow).with_halt_policy(options.halt_policy);

        let result = pipeline.run(&mut state).await;

        // 目录不可用时没有地方写进度文件
        if pipeline.flow().store().root().is_dir() {
            if let Err(e) = state_store.save(&state).await {
                warn!("⚠️ 进度保存失败: {}", e);
            }
        }

        match result {
            Ok(report) => {
                log_run_stats(
                    state.processed_ids().len(),
                    report.findings_added,
                    report.skipped.len(),
                    &self.config.alert_log_file,
                );
                Ok(AuditOutcome { state, report })
            }
            Err(e) => {
                error!(
                    "❌ 审查中止: {} (已处理 {} 个文档，可使用 --resume 继续)",
                    e,
                    state.processed_ids().len()
                );
                Err(e)
            }
        }
    }

    /// 起草异议函并导出 PDF
    pub async fn draft(&self, options: DraftOptions) -> AppResult<DraftOutcome> {
        options.case.validate()?;

        let findings = match &options.findings_file {
            Some(path) => load_findings_file(path).await?,
            None => self.load_saved_findings().await?,
        };
        info!("📝 起草异议函: {} 条审查结果", findings.len());

        let drafter = LetterDrafter::new(self.reasoning_service()?);
        let letter = drafter.draft(&findings, &options.case).await?;

        let pdf_path = LetterExporter::new().export(&letter, &options.out).await?;
        Ok(DraftOutcome { letter, pdf_path })
    }

    /// 把 PDF 转成文本放入交易目录
    ///
    /// # 返回
    /// 新文档的标识
    pub async fn convert(&self, pdf_path: &Path) -> AppResult<String> {
        let id = pdf_import::stage_pdf(pdf_path, Path::new(&self.config.deal_folder)).await?;
        Ok(id)
    }

    async fn load_saved_findings(&self) -> AppResult<Vec<Finding>> {
        let store = DocumentStore::from_config(&self.config);
        let state_store = StateStore::in_folder(store.root(), &self.config.state_file);
        let state = state_store.load(&self.config.deal_folder).await?;

        Ok(state
            .alerts()
            .entries()
            .iter()
            .filter_map(Alert::as_finding)
            .cloned()
            .collect())
    }

    fn reasoning_service(&self) -> AppResult<Arc<dyn ReasoningService>> {
        if let Some(service) = &self.service {
            return Ok(Arc::clone(service));
        }
        self.config.require_api_key()?;
        Ok(Arc::new(LlmClient::new(&self.config)))
    }
}

/// 读取 JSON 格式的审查结果列表
async fn load_findings_file(path: &Path) -> AppResult<Vec<Finding>> {
    let shown = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&shown, e))?;
    serde_json::from_str(&content).map_err(|e| AppError::json_parse_failed(&shown, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_authorize_without_credentials_file() {
        let app = App::new(Config::default());
        assert!(app.authorize(None, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_checks_password() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[passwords]\nanalyst = \"hunter2\"\n").unwrap();

        let app = App::new(Config {
            credentials_file: Some(path.display().to_string()),
            ..Config::default()
        });

        assert!(app.authorize(Some("analyst"), Some("hunter2")).await.is_ok());
        let err = app
            .authorize(Some("analyst"), Some("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert!(app.authorize(None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_audit_without_api_key_is_config_error() {
        let app = App::new(Config::default());
        let err = app.audit(AuditOptions::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
