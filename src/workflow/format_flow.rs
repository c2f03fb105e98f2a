//! 文件格式化流程 - 流程层
//!
//! 核心职责：定义"一个文件"从已分类到完成（或失败）的流程
//!
//! 流程顺序：
//! 1. 读取原始内容
//! 2. 在阻塞线程池中按考试规格格式化（带超时）
//! 3. 写回结果：completed 或 error
//!
//! 任何一步失败都只影响当前文件。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::error::{AppError, FormatError, TransitionError};
use crate::models::{ExamProfile, FileStatus, ProcessedFile};
use crate::services::{FormatRequest, Formatter};
use crate::workflow::file_ctx::FileCtx;

/// 单个文件的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowResult {
    /// 已完成
    Completed,
    /// 失败（错误信息记录在文件上）
    Failed,
    /// 跳过（文件不在 processing 状态）
    Skipped,
}

/// 文件格式化流程
///
/// - 不持有 worker 会话
/// - 只依赖格式化能力（services）
pub struct FormatFlow {
    formatter: Arc<dyn Formatter>,
    format_timeout: Duration,
}

impl FormatFlow {
    pub fn new(formatter: Arc<dyn Formatter>, format_timeout: Duration) -> Self {
        Self {
            formatter,
            format_timeout,
        }
    }

    pub async fn run(&self, file: &mut ProcessedFile, profile: &ExamProfile, ctx: &FileCtx) -> FlowResult {
        if file.status() != FileStatus::Processing {
            debug!("{} 状态为 {}，跳过格式化", ctx, file.status());
            return FlowResult::Skipped;
        }

        let Some(document_type) = file.detected_type() else {
            let e = TransitionError::Unclassified {
                id: file.id().to_string(),
            };
            self.mark_failed(file, ctx, e.into());
            return FlowResult::Failed;
        };

        info!("{} 🛠️ 正在格式化为 {}", ctx, document_type);

        let data = match file.upload().read_bytes().await {
            Ok(data) => data,
            Err(source) => {
                let e = FormatError::Read {
                    name: file.original_name().to_string(),
                    source,
                };
                self.mark_failed(file, ctx, e.into());
                return FlowResult::Failed;
            }
        };

        let request = FormatRequest {
            data,
            document_type,
            original_name: file.original_name().to_string(),
            format: profile.format_for(document_type).clone(),
        };

        match self.format(request).await {
            Ok(formatted) => {
                let size = formatted.len();
                match file.complete(formatted) {
                    Ok(()) => {
                        info!(
                            "{} ✓ 格式化完成 → {} ({} 字节)",
                            ctx,
                            file.new_name().unwrap_or_default(),
                            size
                        );
                        FlowResult::Completed
                    }
                    Err(e) => {
                        self.mark_failed(file, ctx, e.into());
                        FlowResult::Failed
                    }
                }
            }
            Err(e) => {
                self.mark_failed(file, ctx, e.into());
                FlowResult::Failed
            }
        }
    }

    /// 在阻塞线程池中执行格式化，超时视为失败
    async fn format(&self, request: FormatRequest) -> Result<Vec<u8>, FormatError> {
        let formatter = Arc::clone(&self.formatter);
        let task = tokio::task::spawn_blocking(move || formatter.format(&request));

        match timeout(self.format_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(FormatError::Aborted(join_error.to_string())),
            Err(_) => Err(FormatError::Timeout {
                secs: self.format_timeout.as_secs(),
            }),
        }
    }

    /// 记录错误并把文件标记为 error，日志带上错误类别代码
    fn mark_failed(&self, file: &mut ProcessedFile, ctx: &FileCtx, err: AppError) {
        error!("{} ❌ [{}] {}", ctx, err.code(), err);
        if let Err(e) = file.fail(err.to_string()) {
            let e = AppError::from(e);
            error!("{} ❌ [{}] {}", ctx, e.code(), e);
        }
    }
}
