use std::fmt;

use crate::services::letter_export::ExportError;
use crate::services::pdf_import::ImportError;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文档目录相关错误
    Store(StoreError),
    /// LLM 服务错误
    Llm(LlmError),
    /// 流水线运行错误
    Pipeline(PipelineError),
    /// 文件操作错误（状态文件、日志文件、凭据文件）
    File(FileError),
    /// PDF 导出错误
    Export(ExportError),
    /// PDF 导入错误
    Import(ImportError),
    /// 业务逻辑错误
    Business(BusinessError),
    /// 配置错误
    Config(ConfigError),
    /// 登录校验失败
    Unauthorized { username: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "文档目录错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Pipeline(e) => write!(f, "流水线错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Export(e) => write!(f, "导出错误: {}", e),
            AppError::Import(e) => write!(f, "导入错误: {}", e),
            AppError::Business(e) => write!(f, "业务错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Unauthorized { username } => {
                write!(f, "登录失败: 用户 '{}' 凭据无效", username)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Pipeline(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::Import(e) => Some(e),
            AppError::Business(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Unauthorized { .. } => None,
        }
    }
}

/// 文档目录错误
#[derive(Debug)]
pub enum StoreError {
    /// 目录不可用（创建后仍无法访问），整次运行中止
    FolderUnavailable {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 列出后、读取前文档被外部删除
    NotFound {
        id: String,
    },
    /// 读取文档失败
    ReadFailed {
        id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::FolderUnavailable { path, source } => {
                write!(f, "文档目录不可用 ({}): {}", path, source)
            }
            StoreError::NotFound { id } => write!(f, "文档不存在: {}", id),
            StoreError::ReadFailed { id, source } => {
                write!(f, "读取文档失败 ({}): {}", id, source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::FolderUnavailable { source, .. } | StoreError::ReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            StoreError::NotFound { .. } => None,
        }
    }
}

/// LLM 服务错误
#[derive(Debug)]
pub enum LlmError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求超时
    Timeout {
        model: String,
        secs: u64,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
    /// 构建请求失败
    RequestBuild {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            LlmError::Timeout { model, secs } => {
                write!(f, "LLM API调用超时 (模型: {}, {} 秒)", model, secs)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
            LlmError::RequestBuild { source } => {
                write!(f, "构建LLM请求失败: {}", source)
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::ApiCallFailed { source, .. } | LlmError::RequestBuild { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 流水线运行错误
#[derive(Debug)]
pub enum PipelineError {
    /// 分类服务不可用，当前文档未标记为已处理
    ClassificationUnavailable {
        document: String,
        source: LlmError,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ClassificationUnavailable { document, source } => {
                write!(f, "文档 {} 分类失败，运行已停止: {}", document, source)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::ClassificationUnavailable { source, .. } => Some(source),
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    JsonParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::JsonParseFailed { path, source } => {
                write!(f, "JSON解析失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::JsonParseFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 业务逻辑错误
#[derive(Debug)]
pub enum BusinessError {
    /// 没有可用于起草信函的审查结果
    NoFindings,
    /// 案件信息缺失
    MissingCaseField {
        field: &'static str,
    },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::NoFindings => write!(f, "没有审查结果，无法起草异议函"),
            BusinessError::MissingCaseField { field } => {
                write!(f, "案件信息缺失: {}", field)
            }
        }
    }
}

impl std::error::Error for BusinessError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    EnvVarNotFound {
        var_name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::EnvVarNotFound { var_name } => {
                write!(f, "环境变量 {} 不存在", var_name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Llm(err)
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<BusinessError> for AppError {
    fn from(err: BusinessError) -> Self {
        AppError::Business(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        AppError::Import(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonParseFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 JSON 解析错误
    pub fn json_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::JsonParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 是否为分类服务不可用（运行停在某个文档上）
    pub fn is_classification_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::Pipeline(PipelineError::ClassificationUnavailable { .. })
        )
    }
}

impl StoreError {
    /// 创建目录不可用错误
    pub fn folder_unavailable(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::FolderUnavailable {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_classification_unavailable_keeps_source_chain() {
        let err: AppError = PipelineError::ClassificationUnavailable {
            document: "doc2.txt".to_string(),
            source: LlmError::Timeout {
                model: "gpt-4o".to_string(),
                secs: 60,
            },
        }
        .into();

        assert!(err.is_classification_unavailable());
        assert!(err.to_string().contains("doc2.txt"));

        let pipeline = err.source().expect("缺少 PipelineError");
        let llm = pipeline.source().expect("缺少 LlmError");
        assert!(llm.to_string().contains("60"));
    }

    #[test]
    fn test_io_error_maps_to_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::File(FileError::ReadFailed { .. })));
        assert!(!err.is_classification_unavailable());
    }
}
