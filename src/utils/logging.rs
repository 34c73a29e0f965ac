/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认级别为 info，可通过 `RUST_LOG` 覆盖。重复调用是安全的。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `base_url`: 目标站点
/// - `total`: 待导出的试卷数量
pub fn log_startup(base_url: &str, total: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - QCM 导出模式");
    info!("🌐 站点: {}", base_url);
    info!("📋 待导出试卷: {} 个", total);
    info!(
        "🕒 开始时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个试卷开始处理
pub fn log_quiz_start(position: usize, total: usize, identifier: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 [{}] 开始处理第 {}/{} 个试卷", identifier, position, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `quizzes`: 处理的试卷数量
/// - `questions`: 抓取的题目总数
/// - `pdfs`: 生成的 PDF 数量
/// - `failures`: 失败数量
pub fn print_final_stats(quizzes: usize, questions: usize, pdfs: usize, failures: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 试卷: {}", quizzes);
    info!("❓ 题目: {}", questions);
    info!("✅ PDF: {}", pdfs);
    info!("❌ 失败: {}", failures);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
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
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("énoncé long", 6), "énoncé...");
        assert_eq!(truncate_text("court", 10), "court");
    }
}
