//! 风险分类服务 - 业务能力层
//!
//! 只负责"判断一个文档的风险等级"能力，不关心流程
//!
//! 分类分两步：
//! 1. 用固定模板请求推理服务，要求输出 `[RED]` / `[YELLOW]` / `[GREEN]` 标记和简短理由
//! 2. 用 `TagParser` 从自由文本中解析标记（可替换，比如换成结构化输出）

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::clients::ReasoningService;
use crate::error::LlmError;
use crate::models::{Finding, RiskTag};

/// 标记解析策略
pub trait TagParser: Send + Sync {
    /// 从响应中解析风险等级
    fn parse_tag(&self, response: &str) -> RiskTag;

    /// 从响应中提取理由
    fn rationale(&self, response: &str) -> String;
}

/// 基于标记子串的解析（按优先级首个命中）
///
/// 响应里常常顺带提到较低等级的词，所以先查致命标记，再查可谈判标记，
/// 都没有则视为无问题。
#[derive(Debug, Clone)]
pub struct MarkerTagParser {
    critical_markers: Vec<String>,
    negotiable_markers: Vec<String>,
}

impl MarkerTagParser {
    pub fn new() -> Self {
        Self {
            critical_markers: vec!["[RED]".to_string(), "CRITICAL".to_string()],
            negotiable_markers: vec!["[YELLOW]".to_string(), "NEGOTIABLE".to_string()],
        }
    }
}

impl Default for MarkerTagParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TagParser for MarkerTagParser {
    fn parse_tag(&self, response: &str) -> RiskTag {
        if self.critical_markers.iter().any(|m| response.contains(m.as_str())) {
            RiskTag::Critical
        } else if self.negotiable_markers.iter().any(|m| response.contains(m.as_str())) {
            RiskTag::Negotiable
        } else {
            RiskTag::Clear
        }
    }

    fn rationale(&self, response: &str) -> String {
        let response = response.trim();
        if let Ok(re) =
            Regex::new(r"^\s*(\*\*)?\[(RED|YELLOW|GREEN|CRITICAL|NEGOTIABLE|CLEAR)\](\*\*)?\s*[:\-]?\s*")
        {
            let stripped = re.replace(response, "");
            if !stripped.trim().is_empty() {
                return stripped.trim().to_string();
            }
        }
        response.to_string()
    }
}

/// 风险分类服务
///
/// 职责：
/// - 构建固定的审查提示词
/// - 同步调用推理服务（失败直接返回，不重试）
/// - 解析标记，生成 `Finding`
pub struct RiskClassifier {
    service: Arc<dyn ReasoningService>,
    parser: Box<dyn TagParser>,
}

impl RiskClassifier {
    /// 使用默认的标记解析策略
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self::with_parser(service, Box::new(MarkerTagParser::new()))
    }

    /// 使用自定义解析策略
    pub fn with_parser(service: Arc<dyn ReasoningService>, parser: Box<dyn TagParser>) -> Self {
        Self { service, parser }
    }

    /// 对单个文档进行风险分类
    ///
    /// # 参数
    /// - `document`: 文档标识
    /// - `text`: 文档全文
    ///
    /// # 返回
    /// 分类结果；推理服务失败或超时时返回 `LlmError`
    pub async fn classify(&self, document: &str, text: &str) -> Result<Finding, LlmError> {
        debug!(
            "开始风险分类: {} ({} 字符), 模型: {}",
            document,
            text.len(),
            self.service.model_name()
        );

        let prompt = build_audit_prompt(text);
        let response = self.service.invoke(&prompt).await?;

        let tag = self.parser.parse_tag(&response);
        let rationale = self.parser.rationale(&response);

        debug!("分类结果: {} -> {}", document, tag);
        Ok(Finding::new(document, tag, rationale))
    }
}

/// 构建审查提示词
pub fn build_audit_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following commercial real estate (CRE) transaction document for closing risk.

Tag the document with exactly ONE of these markers at the start of your answer:
- [RED] critical, potential deal-killer (title defects, unresolved liens, recognized environmental conditions (RECs), zoning violations, undisclosed encumbrances)
- [YELLOW] negotiable, should be raised with the seller (repairs, estoppel gaps, rent roll discrepancies, minor survey issues)
- [GREEN] clear, no material issue found

After the marker, give a short rationale (at most three sentences).
Do not write the words CRITICAL or NEGOTIABLE in upper case anywhere in the rationale.

Document:
"""
{}
""""#,
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedReasoner(&'static str);

    #[async_trait]
    impl ReasoningService for FixedReasoner {
        async fn invoke(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_parse_tag_priority() {
        let parser = MarkerTagParser::new();

        assert_eq!(
            parser.parse_tag("[YELLOW] estoppel missing, but also [RED] lien"),
            RiskTag::Critical
        );
        assert_eq!(
            parser.parse_tag("[RED] lien; the [YELLOW] items are secondary"),
            RiskTag::Critical
        );
        assert_eq!(
            parser.parse_tag("NEGOTIABLE overall, though one CRITICAL item remains"),
            RiskTag::Critical
        );
        assert_eq!(parser.parse_tag("[NEGOTIABLE] roof repairs"), RiskTag::Negotiable);
        assert_eq!(parser.parse_tag("no critical issues"), RiskTag::Clear);
        // 大写的等级词按标记处理，即使前面是 [GREEN]
        assert_eq!(parser.parse_tag("[GREEN] No CRITICAL issues"), RiskTag::Critical);
        assert_eq!(parser.parse_tag("[GREEN] nothing to report"), RiskTag::Clear);
        assert_eq!(parser.parse_tag("no marker at all"), RiskTag::Clear);
    }

    #[test]
    fn test_rationale_strips_leading_marker() {
        let parser = MarkerTagParser::new();

        assert_eq!(
            parser.rationale("[RED] Unresolved lien is a deal-killer"),
            "Unresolved lien is a deal-killer"
        );
        assert_eq!(parser.rationale("**[YELLOW]**: HVAC age"), "HVAC age");
        assert_eq!(parser.rationale("[GREEN]"), "[GREEN]");
        assert_eq!(parser.rationale("  plain text  "), "plain text");
    }

    #[tokio::test]
    async fn test_classify_builds_finding() {
        let classifier = RiskClassifier::new(Arc::new(FixedReasoner(
            "[RED] Unresolved lien is a deal-killer",
        )));

        let finding = classifier
            .classify("doc1.txt", "Lease has unresolved title lien")
            .await
            .unwrap();

        assert_eq!(finding.document, "doc1.txt");
        assert_eq!(finding.tag, RiskTag::Critical);
        assert!(finding.rationale.contains("deal-killer"));
    }

    #[test]
    fn test_audit_prompt_embeds_document() {
        let prompt = build_audit_prompt("Phase I ESA notes a REC");
        assert!(prompt.contains("Phase I ESA notes a REC"));
        assert!(prompt.contains("[RED]"));
        assert!(prompt.contains("[YELLOW]"));
        assert!(prompt.contains("[GREEN]"));
        assert!(prompt.contains("Do not write the words CRITICAL or NEGOTIABLE"));
    }
}
