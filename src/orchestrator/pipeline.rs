//! 批次处理流水线 - 编排层
//!
//! ## 职责
//!
//! 把一批已通过上传校验的文件依次送过：
//!
//! ```text
//! analyze (worker)  →  classify / name  →  FormatFlow (逐个)  →  archive
//! ```
//!
//! ## 进度
//!
//! - 分类完成：25
//! - 开始格式化前：50
//! - 格式化中：批次进度按已处理文件数在 50 到 90 之间推进，排队中的文件随之推进
//! - 文件完成：100
//!
//! ## 失败处理
//!
//! - 分析失败或超时：所有未终结的文件标记为 error，整个批次返回错误
//! - 单个文件格式化失败：只影响该文件，批次继续
//! - 打包失败：批次返回错误，不产生压缩包

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::{AnalyzedFile, AnalyzerSession};
use crate::models::{ExamProfile, FileStatus, ProcessedFile, UploadedFile};
use crate::orchestrator::progress::{ProgressListener, SilentProgress};
use crate::services::{archive_file_name, namer, requirements, ArchiveEntry, Archiver, Formatter};
use crate::workflow::{FileCtx, FormatFlow};

const PROGRESS_CLASSIFIED: f32 = 25.0;
const PROGRESS_READY_TO_FORMAT: f32 = 50.0;
const PROGRESS_FORMAT_SPAN: f32 = 40.0;

/// 打包结果
#[derive(Debug, Clone)]
pub struct BatchArchive {
    /// `{EXAM}_documents_{YYYY-MM-DD}.zip`
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// 压缩包内的文件数
    pub entries: usize,
}

/// 批次结果
#[derive(Debug)]
pub struct BatchOutcome {
    pub files: Vec<ProcessedFile>,
    /// 没有完成的文件时为 `None`
    pub archive: Option<BatchArchive>,
}

impl BatchOutcome {
    pub fn completed_count(&self) -> usize {
        count_status(&self.files, FileStatus::Completed)
    }

    pub fn failed_count(&self) -> usize {
        count_status(&self.files, FileStatus::Error)
    }
}

/// 批次级错误，同时带回各文件的最终状态
#[derive(Debug, Error)]
#[error("{source}")]
pub struct BatchError {
    pub files: Vec<ProcessedFile>,
    pub source: AppError,
}

impl BatchError {
    pub fn code(&self) -> &'static str {
        self.source.code()
    }
}

fn count_status(files: &[ProcessedFile], status: FileStatus) -> usize {
    files.iter().filter(|f| f.status() == status).count()
}

/// 批次流水线
///
/// 不持有 worker 会话，由调用方传入；同一个会话可处理多个批次。
pub struct BatchPipeline {
    profile: ExamProfile,
    flow: FormatFlow,
    archiver: Arc<dyn Archiver>,
    listener: Arc<dyn ProgressListener>,
}

impl BatchPipeline {
    pub fn new(
        profile: ExamProfile,
        formatter: Arc<dyn Formatter>,
        archiver: Arc<dyn Archiver>,
        format_timeout: Duration,
    ) -> Self {
        Self {
            profile,
            flow: FormatFlow::new(formatter, format_timeout),
            archiver,
            listener: Arc::new(SilentProgress),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn profile(&self) -> &ExamProfile {
        &self.profile
    }

    /// 处理一批文件
    ///
    /// `date` 用于压缩包文件名。
    pub async fn process(
        &self,
        session: &mut AnalyzerSession,
        uploads: Vec<UploadedFile>,
        date: NaiveDate,
    ) -> Result<BatchOutcome, BatchError> {
        let exam_code = self.profile.code;
        let mut files: Vec<ProcessedFile> = uploads.iter().cloned().map(ProcessedFile::new).collect();

        for file in files.iter_mut() {
            if let Err(e) = file.start() {
                let e = AppError::from(e);
                error!("❌ [{}] {}", e.code(), e);
            }
            self.listener.file_updated(file);
        }
        self.listener.batch_progress(0.0);

        // ========== 1. 分析（分类 + 命名） ==========
        info!("🔍 正在分析 {} 个文件...", files.len());
        let analyzed = match session.analyze(&uploads, exam_code).await {
            Ok(analyzed) => analyzed,
            Err(e) => {
                error!("❌ [{}] {}", e.code(), e);
                let message = e.to_string();
                for file in files.iter_mut().filter(|f| !f.status().is_terminal()) {
                    let _ = file.fail(message.as_str());
                    self.listener.file_updated(file);
                }
                return Err(BatchError {
                    files,
                    source: AppError::Worker(e),
                });
            }
        };

        self.apply_analysis(&mut files, &analyzed);
        self.listener.batch_progress(PROGRESS_READY_TO_FORMAT);

        // ========== 2. 逐个格式化 ==========
        let total = files.len();
        for idx in 0..total {
            let file = &mut files[idx];
            let ctx = FileCtx::new(idx + 1, total, exam_code, file.original_name());
            let result = self.flow.run(file, &self.profile, &ctx).await;
            debug!("{} 结果: {:?}", ctx, result);
            self.listener.file_updated(file);

            let done = (idx + 1) as f32 / total as f32;
            let percent = PROGRESS_READY_TO_FORMAT + done * PROGRESS_FORMAT_SPAN;

            // 还在排队的文件跟随批次进度推进
            for waiting in files[idx + 1..]
                .iter_mut()
                .filter(|f| f.status() == FileStatus::Processing)
            {
                waiting.set_progress(percent);
                self.listener.file_updated(waiting);
            }
            self.listener.batch_progress(percent);
        }

        // ========== 3. 打包 ==========
        let archive = match self.package(&files, date) {
            Ok(archive) => archive,
            Err(e) => {
                error!("❌ [{}] {}", e.code(), e);
                return Err(BatchError { files, source: e });
            }
        };

        self.listener.batch_progress(100.0);
        Ok(BatchOutcome { files, archive })
    }

    /// 写入分类结果与输出文件名（扩展名取决于该类型的输出格式）
    fn apply_analysis(&self, files: &mut [ProcessedFile], analyzed: &[AnalyzedFile]) {
        let by_id: HashMap<&str, &AnalyzedFile> =
            analyzed.iter().map(|a| (a.id.as_str(), a)).collect();

        for file in files.iter_mut() {
            if file.status().is_terminal() {
                continue;
            }

            let Some(result) = by_id.get(file.id()) else {
                error!("❌ [ANALYSIS_ERROR] 分析结果中缺少文件: {}", file.original_name());
                let _ = file.fail("分析结果中缺少该文件");
                self.listener.file_updated(file);
                continue;
            };

            let detected = result.detected_type;
            let format = self.profile.format_for(detected).format;
            let new_name = namer::with_extension(&result.new_name, format);

            if let Err(e) = file.classify(detected, new_name) {
                let e = AppError::from(e);
                error!("❌ [{}] {}", e.code(), e);
                let _ = file.fail(e.to_string());
                self.listener.file_updated(file);
                continue;
            }
            file.set_progress(PROGRESS_CLASSIFIED);
            self.listener.file_updated(file);

            let check = requirements::check(detected, &self.profile);
            if check.required {
                debug!("{}: {}", file.original_name(), check.message);
            } else {
                warn!("⚠️ {}: {}", file.original_name(), check.message);
            }

            file.set_progress(PROGRESS_READY_TO_FORMAT);
            self.listener.file_updated(file);
        }
    }

    /// 只打包已完成的文件；没有已完成文件时不生成压缩包
    fn package(&self, files: &[ProcessedFile], date: NaiveDate) -> AppResult<Option<BatchArchive>> {
        let entries: Vec<ArchiveEntry<'_>> = files
            .iter()
            .filter(|f| f.status() == FileStatus::Completed)
            .filter_map(|f| {
                Some(ArchiveEntry {
                    name: f.new_name()?,
                    data: f.formatted()?,
                })
            })
            .collect();

        if entries.is_empty() {
            warn!("⚠️ 没有成功处理的文件，不生成压缩包");
            return Ok(None);
        }

        let bytes = self.archiver.create(&entries)?;
        let file_name = archive_file_name(self.profile.code, date);
        info!("📦 已打包 {} 个文件 → {}", entries.len(), file_name);

        Ok(Some(BatchArchive {
            file_name,
            bytes,
            entries: entries.len(),
        }))
    }
}
