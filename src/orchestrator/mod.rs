//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 管理应用生命周期（初始化、运行、关闭）
//! - 加载并校验输入目录中的文件
//! - 唯一持有分析 worker 会话
//! - 写出压缩包、报告和统计信息
//!
//! ### `pipeline` - 单批次流水线
//! - 分析 → 命名 → 逐个格式化 → 打包
//! - 维护每个文件的状态和进度
//! - 单个文件失败不影响其他文件
//!
//! ### `progress` - 进度通知
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理输入目录)
//!     ↓
//! pipeline (处理 Vec<UploadedFile>)
//!     ↓
//! workflow::FormatFlow (处理单个文件)
//!     ↓
//! services (能力层：classify / name / format / archive)
//!     ↓
//! infrastructure (基础设施：AnalyzerSession)
//! ```

pub mod batch_processor;
pub mod pipeline;
pub mod progress;

// 重新导出主要类型
pub use batch_processor::{write_archive, App, RunStats};
pub use pipeline::{BatchArchive, BatchError, BatchOutcome, BatchPipeline};
pub use progress::{LogProgress, ProgressListener, SilentProgress};
