//! 审查结果模型
//!
//! `Finding` 是单个文档的风险分类结果，`Alert` 是审查日志中的一项
//! （结果或终止标记）。

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 终止标记的显示文本
pub const TERMINAL_MARKER: &str = "--- All Documents Scanned ---";

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTag {
    /// 致命问题（deal-killer）
    #[serde(rename = "CRITICAL")]
    Critical,
    /// 可谈判问题
    #[serde(rename = "NEGOTIABLE")]
    Negotiable,
    /// 无问题
    #[serde(rename = "CLEAR")]
    Clear,
    /// 分类服务不可用时的宽松记录
    #[serde(rename = "unclassified")]
    Unclassified,
}

impl RiskTag {
    /// 标准名称
    pub fn as_str(self) -> &'static str {
        match self {
            RiskTag::Critical => "CRITICAL",
            RiskTag::Negotiable => "NEGOTIABLE",
            RiskTag::Clear => "CLEAR",
            RiskTag::Unclassified => "unclassified",
        }
    }

    /// 终端显示用的前缀
    pub fn badge(self) -> &'static str {
        match self {
            RiskTag::Critical => "🔴 CRITICAL",
            RiskTag::Negotiable => "🟡 NEGOTIABLE",
            RiskTag::Clear => "🟢 CLEAR",
            RiskTag::Unclassified => "⚪ UNCLASSIFIED",
        }
    }
}

impl Display for RiskTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个文档的审查结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 文档标识（文件名）
    pub document: String,
    pub tag: RiskTag,
    /// 分类理由（LLM 原文去掉标记后的内容）
    pub rationale: String,
}

impl Finding {
    pub fn new(document: impl Into<String>, tag: RiskTag, rationale: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            tag,
            rationale: rationale.into(),
        }
    }
}

impl Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FINDING: {} [{}] {}",
            self.tag.badge(),
            self.document,
            self.rationale
        )
    }
}

/// 审查日志中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    Finding(Finding),
    /// 所有文档都已扫描
    Terminal,
}

impl Alert {
    pub fn as_finding(&self) -> Option<&Finding> {
        match self {
            Alert::Finding(finding) => Some(finding),
            Alert::Terminal => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Alert::Terminal)
    }
}

impl Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::Finding(finding) => finding.fmt(f),
            Alert::Terminal => f.write_str(TERMINAL_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_display() {
        let finding = Finding::new("doc1.txt", RiskTag::Critical, "lien");
        assert_eq!(
            Alert::Finding(finding).to_string(),
            "FINDING: 🔴 CRITICAL [doc1.txt] lien"
        );
        assert_eq!(Alert::Terminal.to_string(), TERMINAL_MARKER);
    }

    #[test]
    fn test_alert_json_shape() {
        let alert = Alert::Finding(Finding::new("a.txt", RiskTag::Unclassified, "timeout"));
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["kind"], "finding");
        assert_eq!(json["tag"], "unclassified");

        let terminal = serde_json::to_value(Alert::Terminal).unwrap();
        assert_eq!(terminal, serde_json::json!({ "kind": "terminal" }));
    }
}
