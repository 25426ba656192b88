//! 外部服务客户端 - 基础设施层
//!
//! 持有稀缺的外部资源（LLM 连接），只暴露"发送提示词、拿回文本"的能力

pub mod llm_client;

pub use llm_client::LlmClient;

use async_trait::async_trait;

use crate::error::LlmError;

/// 推理服务
///
/// 单次请求/响应：输入提示词，返回文本。不关心背后是哪家模型。
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// 发送提示词并返回响应文本
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;

    /// 模型名称（仅用于日志）
    fn model_name(&self) -> &str {
        "unknown"
    }
}
