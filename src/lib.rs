//! # CRE Closing Agent
//!
//! 商业地产交割前的尽职调查助手：逐个审查交易目录里的文档，
//! 给出风险分级，并根据审查结果起草正式异议函。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 对外部推理服务的封装，只暴露能力
//! - `ReasoningService` - `invoke(prompt) -> text` 抽象
//! - `LlmClient` - 基于 OpenAI 兼容接口的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，一次只处理一个文档或一个请求
//! - `DocumentStore` - 列出/读取交易目录中的文档
//! - `RiskClassifier` - 风险分级（CRITICAL / NEGOTIABLE / CLEAR）
//! - `LetterDrafter` / `LetterExporter` - 起草异议函并导出 PDF
//! - `StateStore` / `AlertWriter` / `CredentialStore` - 进度、日志、登录
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义流水线的单个步骤及状态合并规则
//! - `ProcessingState` - 运行状态（已处理文档 + 审查结果）
//! - `AuditFlow` - 扫描 / 分类 / 累积
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 审查状态机，循环直到没有未处理文档
//! - `orchestrator/app` - 组装配置和服务，执行命令

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Alert, CaseMetadata, Finding, RiskTag};
pub use orchestrator::{App, AuditPipeline, HaltPolicy};
pub use workflow::{AuditFlow, ProcessingState};
