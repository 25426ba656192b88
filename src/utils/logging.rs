//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 每次命令结束后展示的免责声明
pub const DISCLAIMER: &str = "DISCLAIMER: This tool produces AI-generated analysis for informational \
purposes only. It is not legal advice. Have all findings and letters reviewed by a licensed \
attorney before relying on them.";

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info。
/// 重复初始化会被忽略（测试里常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(deal_folder: &str, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 交割文档审查");
    info!("📁 交易目录: {}", deal_folder);
    info!("🤖 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 打印本次运行统计
pub fn log_run_stats(processed: usize, findings: usize, skipped: usize, alert_log: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 审查完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已处理文档: {}", processed);
    info!("📌 审查结果: {}", findings);
    info!("⏭️ 跳过: {}", skipped);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", alert_log);
}

/// 打印免责声明
pub fn print_disclaimer() {
    println!("\n{}", DISCLAIMER);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("地役权冲突条款", 3), "地役权...");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
