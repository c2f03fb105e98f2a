//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批次处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、考试配置、启动分析 worker
//! 2. **批量加载**：扫描输入目录并做上传校验
//! 3. **批次处理**：委托 `BatchPipeline` 完成分析、格式化、打包
//! 4. **结果输出**：压缩包写入输出目录，每个文件的结果写入报告
//! 5. **资源管理**：唯一持有 `AnalyzerSession`，`shutdown` 时结束 worker

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, ConfigError, FileError};
use crate::infrastructure::{AnalyzerSession, WorkerTimeouts};
use crate::models::{builtin_profiles, load_profiles_file, load_uploads, ExamCode, ExamProfiles, ProcessedFile};
use crate::orchestrator::pipeline::{BatchArchive, BatchPipeline};
use crate::orchestrator::progress::LogProgress;
use crate::services::{archive_date, validate_uploads, ImageFormatter, ReportWriter, ZipArchiver};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    session: AnalyzerSession,
    pipeline: BatchPipeline,
    report: ReportWriter,
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub completed: usize,
    pub failed: usize,
    pub rejected: usize,
    /// 写出的压缩包路径
    pub archive_path: Option<PathBuf>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        let profiles = load_profiles(&config).await?;
        let exam_code: ExamCode = config.exam_code.parse()?;
        let profile = profiles
            .get(exam_code)
            .cloned()
            .ok_or_else(|| ConfigError::MissingProfile {
                code: exam_code.to_string(),
            })?;

        logging::log_startup(&profile.name, &config.input_folder);

        // 启动分析 worker（握手失败即初始化失败）
        let timeouts = WorkerTimeouts {
            init: config.worker_init_timeout(),
            analyze: config.analyze_timeout(),
        };
        let session = AnalyzerSession::start(timeouts).await.map_err(|e| {
            error!("❌ [{}] {}", e.code(), e);
            e
        })?;

        let pipeline = BatchPipeline::new(
            profile,
            Arc::new(ImageFormatter::new()),
            Arc::new(ZipArchiver::new()),
            config.format_timeout(),
        )
        .with_listener(Arc::new(LogProgress));

        let report = ReportWriter::with_path(config.output_log_file.clone());

        Ok(Self {
            config,
            session,
            pipeline,
            report,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&mut self) -> Result<RunStats> {
        info!("\n📁 正在扫描待处理的文件...");
        let uploads = load_uploads(&self.config.input_folder).await?;

        if uploads.is_empty() {
            warn!("⚠️ 没有找到待处理的文件，程序结束");
            return Ok(RunStats::default());
        }

        let total = uploads.len();
        let validation = validate_uploads(self.pipeline.profile(), uploads);
        let rejected = validation.rejected_count();
        logging::log_uploads_loaded(total, validation.accepted.len(), rejected);

        if validation.accepted.is_empty() {
            warn!("⚠️ 所有文件都未通过上传校验，程序结束");
            return Ok(RunStats {
                rejected,
                ..Default::default()
            });
        }

        let batch_size = validation.accepted.len();
        logging::log_batch_start(self.pipeline.profile().code.as_str(), batch_size);

        let outcome = match self
            .pipeline
            .process(&mut self.session, validation.accepted, archive_date())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.write_report(&e.files);
                error!("❌ [{}] 批次处理失败: {}", e.code(), e);
                return Err(e.into());
            }
        };

        self.write_report(&outcome.files);

        let archive_path = match &outcome.archive {
            Some(archive) => {
                let folder = Path::new(&self.config.output_folder);
                Some(write_archive(folder, archive).await.map_err(|e| {
                    error!("❌ [{}] {}", e.code(), e);
                    e
                })?)
            }
            None => None,
        };

        let stats = RunStats {
            completed: outcome.completed_count(),
            failed: outcome.failed_count(),
            rejected,
            archive_path,
        };

        logging::log_batch_complete(stats.completed, batch_size);
        logging::print_final_stats(
            stats.completed,
            stats.failed,
            stats.rejected,
            stats
                .archive_path
                .as_deref()
                .and_then(Path::to_str),
            self.report.path(),
        );

        Ok(stats)
    }

    /// 结束 worker 会话
    pub fn shutdown(self) {
        self.session.terminate();
        info!("👋 分析 worker 已关闭");
    }

    fn write_report(&self, files: &[ProcessedFile]) {
        for file in files {
            if let Err(e) = self.report.write(file) {
                error!("❌ [FILE_ERROR] 写入报告失败: {}", e);
            }
        }
    }
}

/// 把压缩包写入输出目录
///
/// 先写 `.zip.part` 临时文件，成功后再改名；任何一步失败都会删除临时文件，
/// 输出目录里不会留下不完整的压缩包。
///
/// # 参数
/// - `folder`: 输出目录，不存在时创建
/// - `archive`: 打包结果
///
/// # 返回
/// 压缩包的最终路径
pub async fn write_archive(folder: &Path, archive: &BatchArchive) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(folder)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: folder.display().to_string(),
            source,
        })?;

    let path = folder.join(&archive.file_name);
    let part = path.with_extension("zip.part");

    let written = match tokio::fs::write(&part, &archive.bytes).await {
        Ok(()) => tokio::fs::rename(&part, &path).await,
        Err(e) => Err(e),
    };

    if let Err(source) = written {
        if let Err(e) = tokio::fs::remove_file(&part).await {
            debug!("清理临时文件失败 {}: {}", part.display(), e);
        }
        return Err(FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        }
        .into());
    }

    info!("💾 压缩包已保存: {} ({} 个文件)", path.display(), archive.entries);
    Ok(path)
}

async fn load_profiles(config: &Config) -> Result<ExamProfiles> {
    match &config.profiles_file {
        Some(path) => {
            info!("📄 使用考试配置文件: {}", path);
            load_profiles_file(Path::new(path)).await
        }
        None => Ok(builtin_profiles()?),
    }
}
