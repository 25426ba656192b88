//! 审查日志写入服务 - 业务能力层
//!
//! 只负责"把审查结果追加到日志文件"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Alert;

/// 审查日志写入服务
///
/// 职责：
/// - 每次运行写一个带时间的分隔头
/// - 逐条追加审查结果，不覆盖已有内容
pub struct AlertWriter {
    log_file_path: String,
}

impl AlertWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    /// 写入本次运行的分隔头
    pub fn write_run_header(&self, deal_folder: &str) -> AppResult<()> {
        let header = format!(
            "{}\n审查运行 - {} | 目录: {}\n{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            deal_folder,
            "=".repeat(60)
        );
        self.append(&header)
    }

    /// 追加一条审查结果
    pub fn write(&self, alert: &Alert) -> AppResult<()> {
        debug!("写入审查日志: {}", self.log_file_path);
        // 理由可能跨多行，日志里保持一条一行
        let line = alert.to_string().replace('\n', " ");
        self.append(&format!("{}\n", line))
    }

    fn append(&self, text: &str) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        file.write_all(text.as_bytes())
            .map_err(|e| AppError::file_write_failed(&self.log_file_path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, RiskTag, TERMINAL_MARKER};
    use tempfile::TempDir;

    #[test]
    fn test_write_appends_one_line_per_alert() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alerts.txt");
        let writer = AlertWriter::with_path(path.to_string_lossy());

        writer.write_run_header("./deal").unwrap();
        writer
            .write(&Alert::Finding(Finding::new(
                "doc1.txt",
                RiskTag::Negotiable,
                "roof\nrepairs",
            )))
            .unwrap();
        writer.write(&Alert::Terminal).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[1].contains("./deal"));
        assert!(lines[3].contains("roof repairs"));
        assert_eq!(lines[4], TERMINAL_MARKER);
    }
}
