use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 交易文档目录（VDR）
    pub deal_folder: String,
    /// 识别为文档的扩展名（不区分大小写）
    pub document_extensions: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 审查结果日志文件
    pub alert_log_file: String,
    /// 运行状态文件（用于断点续跑），相对路径时位于交易目录内
    pub state_file: String,
    /// 登录凭据文件（TOML，包含 [passwords] 表），未设置时不做登录校验
    pub credentials_file: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_timeout_secs: u64,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deal_folder: "./my_deal_folder".to_string(),
            document_extensions: vec!["txt".to_string()],
            verbose_logging: false,
            alert_log_file: "audit_alerts.txt".to_string(),
            state_file: ".audit_state.json".to_string(),
            credentials_file: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            llm_timeout_secs: 60,
            llm_temperature: 0.3,
            llm_max_tokens: 1024,
        }
    }
}

impl Config {
    /// 从环境变量加载配置（会先读取 `.env`）
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let default = Self::default();
        Ok(Self {
            deal_folder: std::env::var("DEAL_FOLDER").unwrap_or(default.deal_folder),
            document_extensions: std::env::var("DOCUMENT_EXTENSIONS")
                .map(|v| parse_extensions(&v))
                .unwrap_or(default.document_extensions),
            verbose_logging: parse_var("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            alert_log_file: std::env::var("ALERT_LOG_FILE").unwrap_or(default.alert_log_file),
            state_file: std::env::var("STATE_FILE").unwrap_or(default.state_file),
            credentials_file: std::env::var("CREDENTIALS_FILE").ok().or(default.credentials_file),
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_timeout_secs: parse_var("LLM_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.llm_timeout_secs),
            llm_temperature: parse_var("LLM_TEMPERATURE", "f32")?
                .unwrap_or(default.llm_temperature),
            llm_max_tokens: parse_var("LLM_MAX_TOKENS", "u32")?.unwrap_or(default.llm_max_tokens),
        })
    }

    /// 校验调用 LLM 所需的配置
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            });
        }
        Ok(&self.llm_api_key)
    }
}

/// 解析可选的环境变量，存在但格式错误时报错
fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// "txt, md" -> ["txt", "md"]
fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("txt, .MD,,"), vec!["txt", "md"]);
        assert!(parse_extensions(" , ").is_empty());
    }

    #[test]
    fn test_require_api_key() {
        let config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::EnvVarNotFound { .. })
        ));

        let config = Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }
}
