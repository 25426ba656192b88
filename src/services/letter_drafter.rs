//! 异议函起草服务 - 业务能力层
//!
//! 根据审查结果和案件信息请求推理服务起草正式异议函。
//! 生成内容不保证每次一致，只保证：引用了物业和买方、保留了未知字段的占位符。

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::ReasoningService;
use crate::error::{AppResult, BusinessError};
use crate::models::{CaseMetadata, Finding};

/// 日期占位符
pub const DATE_PLACEHOLDER: &str = "[DATE]";
/// 卖方法定名称占位符
pub const SELLER_PLACEHOLDER: &str = "[SELLER NAME]";

/// 异议函起草服务
pub struct LetterDrafter {
    service: Arc<dyn ReasoningService>,
}

impl LetterDrafter {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }

    /// 起草异议函
    ///
    /// # 参数
    /// - `findings`: 已累积的审查结果（至少一条）
    /// - `case`: 案件信息
    ///
    /// # 返回
    /// 规范化后的信函正文
    pub async fn draft(&self, findings: &[Finding], case: &CaseMetadata) -> AppResult<String> {
        if findings.is_empty() {
            return Err(BusinessError::NoFindings.into());
        }
        case.validate()?;

        info!(
            "📝 正在起草异议函: {} (买方: {}, 审查结果 {} 条)",
            case.property,
            case.counterparty,
            findings.len()
        );

        let prompt = build_letter_prompt(findings, case);
        let draft = self.service.invoke(&prompt).await?;

        debug!("异议函草稿长度: {} 字符", draft.len());
        Ok(normalize_letter(&draft, case))
    }
}

/// 构建起草提示词
pub fn build_letter_prompt(findings: &[Finding], case: &CaseMetadata) -> String {
    let findings_list: Vec<String> = findings
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. [{}] {}: {}", i + 1, f.tag, f.document, f.rationale))
        .collect();

    format!(
        r#"Draft a formal commercial real estate (CRE) Objection Letter for the property at {property} on behalf of {buyer}.

Base the objections on these due-diligence findings:
{findings}

Requirements:
- Tone: sophisticated, legal and firm.
- Reference the property ({property}) and the buyer ({buyer}) by name.
- Object to every CRITICAL finding and request cure of every NEGOTIABLE finding.
- Use the literal placeholder {date} for the letter date and {seller} for the seller's legal name.
- Do not invent facts beyond the findings."#,
        property = case.property,
        buyer = case.counterparty,
        findings = findings_list.join("\n"),
        date = DATE_PLACEHOLDER,
        seller = SELLER_PLACEHOLDER,
    )
}

/// 规范化草稿：缺少的引用和占位符补在信函开头
pub fn normalize_letter(draft: &str, case: &CaseMetadata) -> String {
    let mut header = Vec::new();

    if !draft.contains(DATE_PLACEHOLDER) {
        header.push(format!("Date: {}", DATE_PLACEHOLDER));
    }
    if !draft.contains(SELLER_PLACEHOLDER) {
        header.push(format!("To: {}", SELLER_PLACEHOLDER));
    }
    if !draft.contains(&case.property) {
        header.push(format!("RE: {}", case.property));
    }
    if !draft.contains(&case.counterparty) {
        header.push(format!("On behalf of: {}", case.counterparty));
    }

    let body = draft.trim();
    if header.is_empty() {
        body.to_string()
    } else {
        format!("{}\n\n{}", header.join("\n"), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, LlmError};
    use crate::models::RiskTag;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录提示词并返回固定文本
    struct RecordingReasoner {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReasoningService for RecordingReasoner {
        async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn reasoner(reply: &str) -> Arc<RecordingReasoner> {
        Arc::new(RecordingReasoner {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn case() -> CaseMetadata {
        CaseMetadata::new("123 Industrial Way", "Acme Holdings LLC")
    }

    fn findings() -> Vec<Finding> {
        vec![Finding::new(
            "doc1.txt",
            RiskTag::Critical,
            "Unresolved lien is a deal-killer",
        )]
    }

    #[tokio::test]
    async fn test_draft_contains_metadata_and_placeholders() {
        let service = reasoner("Dear Seller,\nWe object to the lien.\nSincerely");
        let drafter = LetterDrafter::new(service.clone());

        let letter = drafter.draft(&findings(), &case()).await.unwrap();

        assert!(letter.contains("123 Industrial Way"));
        assert!(letter.contains("Acme Holdings LLC"));
        assert!(letter.contains(DATE_PLACEHOLDER));
        assert!(letter.contains(SELLER_PLACEHOLDER));
        assert!(letter.contains("We object to the lien."));

        let prompts = service.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Unresolved lien is a deal-killer"));
    }

    #[tokio::test]
    async fn test_well_formed_draft_is_untouched() {
        let reply = "[DATE]\n[SELLER NAME]\nRE: 123 Industrial Way\nAcme Holdings LLC objects.";
        let drafter = LetterDrafter::new(reasoner(reply));

        let letter = drafter.draft(&findings(), &case()).await.unwrap();
        assert_eq!(letter, reply);
    }

    #[tokio::test]
    async fn test_draft_requires_findings() {
        let drafter = LetterDrafter::new(reasoner("unused"));
        let err = drafter.draft(&[], &case()).await.unwrap_err();
        assert!(matches!(err, AppError::Business(BusinessError::NoFindings)));
    }

    #[tokio::test]
    async fn test_draft_requires_case_fields() {
        let drafter = LetterDrafter::new(reasoner("unused"));
        let err = drafter
            .draft(&findings(), &CaseMetadata::new(" ", "Acme"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Business(BusinessError::MissingCaseField { field: "property" })
        ));
    }
}
