/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::extract::ExtractedResult;
use crate::models::task::{PipelineProgress, PipelineTask};

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 媒体流水线");
    info!("📡 视频 API: {}", config.video_api_base_url);
    info!("📡 提取 API: {}", config.chat_api_base_url);
    info!(
        "⏱️ 轮询: 每 {} 毫秒一次，最多 {} 次",
        config.poll_interval_ms, config.poll_max_attempts
    );
    info!("{}", "=".repeat(60));
}

/// 记录流水线进度变化
pub fn log_progress(progress: &PipelineProgress) {
    match progress.current {
        Some(stage) => info!("📊 进度 {}% - 当前阶段: {}", progress.percent, stage.label()),
        None => info!("📊 进度 {}%", progress.percent),
    }
}

/// 记录翻译任务的最终产物
pub fn log_artifacts(task: &PipelineTask) {
    info!("{}", "─".repeat(60));
    info!("📦 最终产物 ({} 个):", task.final_artifacts().len());
    for url in task.final_artifacts() {
        info!("  {}", url);
    }
    info!("{}", "─".repeat(60));
}

/// 记录提取结果摘要
pub fn log_extract_result(result: &ExtractedResult) {
    info!("{}", "─".repeat(60));
    info!("📋 提取结果");
    info!("  平台: {}", result.platform);
    info!("  作者: {}", result.author);
    info!("  标题: {}", result.title);
    info!(
        "  👍 {} | 💬 {} | ⭐ {} | 🔁 {}",
        result.stats.likes, result.stats.comments, result.stats.favorites, result.stats.shares
    );
    info!("  文案: {}", truncate_text(&result.copy_text, 120));
    info!("{}", "─".repeat(60));
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
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }
}
