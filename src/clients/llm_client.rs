//! LLM API 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Azure、网关代理等）
//! - 每次调用都有超时上限，超时不会无限挂起

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::clients::ReasoningService;
use crate::config::Config;
use crate::error::LlmError;

const SYSTEM_MESSAGE: &str = "You are a senior commercial real estate due-diligence analyst \
                              assisting a buyer's closing team. Be precise and concise.";

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.llm_timeout_secs.max(1)),
        }
    }

    /// 发送聊天请求
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn chat(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::RequestBuild {
                    source: Box::new(e),
                })?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::RequestBuild {
                source: Box::new(e),
            })?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::RequestBuild {
                source: Box::new(e),
            })?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!(
                    "LLM API 调用超时 ({} 秒)，模型: {}",
                    self.timeout.as_secs(),
                    self.model_name
                );
                LlmError::Timeout {
                    model: self.model_name.clone(),
                    secs: self.timeout.as_secs(),
                }
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                LlmError::api_failed(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ReasoningService for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat(prompt, Some(SYSTEM_MESSAGE)).await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> LlmClient {
        let config = Config {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            ..Config::default()
        };
        LlmClient::new(&config)
    }

    #[test]
    fn test_timeout_has_floor() {
        let config = Config {
            llm_timeout_secs: 0,
            ..Config::default()
        };
        let client = LlmClient::new(&config);
        assert_eq!(client.timeout, Duration::from_secs(1));
        assert_eq!(client.model_name(), "gpt-4o");
    }

    /// 测试真实 API 连通性
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_invoke_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_invoke_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = create_test_client();
        let response = client
            .invoke("Reply with the single tag [GREEN] and nothing else.")
            .await;

        match response {
            Ok(text) => {
                println!("LLM 响应: {}", text);
                assert!(!text.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
