//! 进度通知
//!
//! 编排层在文件状态变化和批次进度推进时回调监听器。

use tracing::{debug, info};

use crate::models::{FileStatus, ProcessedFile};

/// 进度监听器，默认实现什么都不做
pub trait ProgressListener: Send + Sync {
    /// 单个文件状态或进度发生变化
    fn file_updated(&self, _file: &ProcessedFile) {}

    /// 批次整体进度 (0-100)
    fn batch_progress(&self, _percent: f32) {}
}

/// 不输出任何内容
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressListener for SilentProgress {}

/// 写日志的监听器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressListener for LogProgress {
    fn file_updated(&self, file: &ProcessedFile) {
        match file.status() {
            FileStatus::Completed => info!(
                "  ✓ {} → {}",
                file.original_name(),
                file.new_name().unwrap_or_default()
            ),
            FileStatus::Error => info!(
                "  ✗ {}: {}",
                file.original_name(),
                file.error().unwrap_or_default()
            ),
            status => debug!(
                "  {} [{}] {:.0}%",
                file.original_name(),
                status,
                file.progress()
            ),
        }
    }

    fn batch_progress(&self, percent: f32) {
        debug!("📈 批次进度: {:.0}%", percent);
    }
}
