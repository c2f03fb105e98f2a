//! # Exam Doc Convert
//!
//! 把考生上传的照片、签名、证书等材料按考试要求批量重命名、转换并打包
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（分析 worker），只暴露能力
//! - `AnalyzerSession` - 唯一的 worker 通道，提供 analyze() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件
//! - `Classifier` - 根据文件名判断文档类型
//! - `namer` - 生成输出文件名
//! - `ImageFormatter` - 缩放、压缩、转换格式
//! - `ZipArchiver` - 打包
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的格式化流程
//! - `FileCtx` - 上下文封装（批次序号 + 考试代码）
//! - `FormatFlow` - 读取 → 格式化（带超时）→ 完成 / 失败
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用入口，管理资源和输出
//! - `orchestrator/pipeline` - 单批次流水线
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{AnalyzerSession, WorkerTimeouts};
pub use models::{DocumentType, ExamCode, ExamProfile, FileStatus, ProcessedFile, UploadedFile};
pub use orchestrator::{App, BatchOutcome, BatchPipeline};
pub use workflow::{FileCtx, FlowResult, FormatFlow};
