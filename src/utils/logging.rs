use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志初始化和批次输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下为 `debug`。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件（覆盖旧内容，写入带时间的表头）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文档转换日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `exam_name`: 考试全称
/// - `input_folder`: 输入目录
pub fn log_startup(exam_name: &str, input_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 考试材料批量转换");
    info!("🎓 考试: {}", exam_name);
    info!("📁 输入目录: {}", input_folder);
    info!("{}", "=".repeat(60));
}

/// 记录上传文件加载与校验结果
///
/// # 参数
/// - `total`: 扫描到的文件数
/// - `accepted`: 通过校验的文件数
/// - `rejected`: 被拒绝的文件数
pub fn log_uploads_loaded(total: usize, accepted: usize, rejected: usize) {
    info!("✓ 找到 {} 个文件", total);
    info!("📋 通过校验 {} 个，拒绝 {} 个", accepted, rejected);
}

/// 记录批次开始信息
///
/// # 参数
/// - `exam_code`: 考试代码
/// - `total`: 本批次文件数
pub fn log_batch_start(exam_code: &str, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理批次: {} / 共 {} 个文件", exam_code.to_uppercase(), total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(completed: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 批次完成: 成功 {}/{}", completed, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `completed`: 成功数
/// - `failed`: 失败数
/// - `rejected`: 上传被拒数
/// - `archive_path`: 压缩包路径，没有生成时为 `None`
/// - `log_file_path`: 报告文件路径
pub fn print_final_stats(
    completed: usize,
    failed: usize,
    rejected: usize,
    archive_path: Option<&str>,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", completed);
    info!("❌ 失败: {}", failed);
    info!("🚫 上传被拒: {}", rejected);
    match archive_path {
        Some(path) => info!("📦 压缩包: {}", path),
        None => info!("📦 没有可打包的文件"),
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
