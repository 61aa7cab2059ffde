//! 日志工具模块
//!
//! 初始化 tracing 输出，并提供运行开始/结束时的横幅日志

use std::path::Path;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志输出
///
/// 默认级别为 info，可通过 `RUST_LOG` 覆盖。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - 文本目录树生成 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", config.llm_model_name);
    info!(
        "🪟 窗口: {} 字符, 重叠 {} 字符",
        config.window_size, config.overlap
    );
    match config.max_input_tokens {
        Some(limit) => info!("📏 单次请求上限: {} token", limit),
        None => info!("📏 单次请求上限: 不限制"),
    }
    info!(
        "📊 最大并发请求: {}, 最大重试: {}",
        config.max_concurrent_requests, config.max_retries
    );
    info!("{}", "=".repeat(60));
}

/// 输出目录
pub fn log_toc(toc: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📑 目录结构:");
    for line in toc.lines() {
        info!("{}", line);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(doc_name: &str, node_count: usize, output_path: &Path, elapsed: Duration) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 文档: {}", doc_name);
    info!("🌳 节点数: {}", node_count);
    info!("⏱️ 耗时: {:.1}s", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
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
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
    }
}
