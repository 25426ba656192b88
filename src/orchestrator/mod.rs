//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责流程调度和应用组装，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `pipeline` - 审查流水线
//! - 显式状态机：扫描 → 分类 → 累积 → 扫描 ... → 停止
//! - 停止条件由 `HaltPolicy` 决定（处理完全部 / 只处理一个）
//! - 输出本次运行的统计（`RunReport`）
//!
//! ### `app` - 应用入口
//! - 持有配置，创建 LLM 客户端和各项服务
//! - 实现命令：审查、起草异议函、PDF 转换
//! - 登录校验、保存进度
//!
//! ## 层次关系
//!
//! ```text
//! app (命令)
//!     ↓
//! pipeline (整个交易目录)
//!     ↓
//! workflow::AuditFlow (单个步骤)
//!     ↓
//! services (能力层：store / classifier / drafter / exporter)
//!     ↓
//! clients (基础设施：ReasoningService)
//! ```

pub mod app;
pub mod pipeline;

pub use app::{App, AuditOptions, AuditOutcome, DraftOptions, DraftOutcome, DEFAULT_LETTER_FILE};
pub use pipeline::{AuditPipeline, HaltPolicy, HaltReason, RunReport};
