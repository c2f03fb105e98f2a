//! 错误类型
//!
//! 按错误类别划分：上传校验、分析 worker、格式化、打包、配置、文件、状态。
//! 每个类别都有一个简短的类别代码，日志里统一以 `[CODE] 消息` 的形式输出。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 上传校验错误
    #[error("上传校验失败: {0}")]
    Upload(#[from] UploadError),
    /// 分析 worker 错误
    #[error("分析服务错误: {0}")]
    Worker(#[from] WorkerError),
    /// 格式化错误
    #[error("格式化失败: {0}")]
    Format(#[from] FormatError),
    /// 打包错误
    #[error("打包失败: {0}")]
    Package(#[from] PackageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 状态流转错误
    #[error("状态错误: {0}")]
    State(#[from] TransitionError),
}

impl AppError {
    /// 错误类别代码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Upload(_) => "UPLOAD_REJECTED",
            AppError::Worker(e) => e.code(),
            AppError::Format(_) => "FORMAT_ERROR",
            AppError::Package(_) => "PACKAGE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::File(_) => "FILE_ERROR",
            AppError::State(_) => "STATE_ERROR",
        }
    }
}

/// 上传校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// 文件类型不在允许列表内
    #[error("不支持的文件类型 {mime_type} ({name})")]
    UnsupportedType { name: String, mime_type: String },
    /// 文件超过大小上限
    #[error("文件过大 ({name}): {size_kb}KB, 上限 {max_kb}KB")]
    TooLarge {
        name: String,
        size_kb: u64,
        max_kb: u64,
    },
}

/// 分析 worker 错误
#[derive(Debug, Error)]
pub enum WorkerError {
    /// 初始化超时
    #[error("worker 初始化超时 ({secs}秒)")]
    InitTimeout { secs: u64 },
    /// 初始化失败
    #[error("worker 初始化失败: {message}")]
    InitFailed { message: String },
    /// 分析超时
    #[error("文档分析超时 ({secs}秒)")]
    AnalyzeTimeout { secs: u64 },
    /// worker 返回错误
    #[error("文档分析失败: {message}")]
    AnalyzeFailed { message: String },
    /// worker 已退出
    #[error("worker 已断开")]
    Disconnected,
    /// 收到不符合协议的消息
    #[error("worker 返回了意外的消息: {kind}")]
    UnexpectedMessage { kind: String },
    /// 消息编解码失败
    #[error("消息编解码失败: {0}")]
    Codec(#[from] serde_json::Error),
}

impl WorkerError {
    /// 错误类别代码：初始化阶段与分析阶段分开
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::InitTimeout { .. } | WorkerError::InitFailed { .. } => {
                "WORKER_INIT_ERROR"
            }
            _ => "ANALYSIS_ERROR",
        }
    }
}

/// 格式化错误
#[derive(Debug, Error)]
pub enum FormatError {
    /// 图片解码失败
    #[error("无法加载图片: {0}")]
    Decode(String),
    /// 图片编码失败
    #[error("无法编码图片: {0}")]
    Encode(String),
    /// PDF 超过大小上限
    #[error("PDF 文件过大 ({size_kb}KB)，最大允许 {max_kb}KB，请手动压缩后重试")]
    PdfTooLarge { size_kb: u64, max_kb: u64 },
    /// PDF 生成失败
    #[error("PDF 生成失败: {0}")]
    Pdf(String),
    /// 读取原始文件失败
    #[error("读取文件失败 ({name}): {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// 格式化超时
    #[error("格式化超时 ({secs}秒)")]
    Timeout { secs: u64 },
    /// 格式化任务异常退出
    #[error("格式化任务异常退出: {0}")]
    Aborted(String),
}

/// 打包错误
#[derive(Debug, Error)]
pub enum PackageError {
    /// ZIP 写入失败
    #[error("无法写入 ZIP 条目 {entry}: {message}")]
    Entry { entry: String, message: String },
    /// ZIP 收尾失败
    #[error("无法完成 ZIP 归档: {0}")]
    Finish(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未知的考试代码
    #[error("未知的考试代码: {code}")]
    UnknownExam { code: String },
    /// 考试配置缺失
    #[error("缺少考试配置: {code}")]
    MissingProfile { code: String },
    /// 考试配置重复
    #[error("考试配置重复: {code}")]
    DuplicateProfile { code: String },
    /// 配置文件解析失败
    #[error("考试配置解析失败: {0}")]
    Parse(#[from] toml::de::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取失败
    #[error("读取失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文件状态流转错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// 不允许的状态流转
    #[error("文件 {id} 不能从 {from} 转到 {to}")]
    Invalid {
        id: String,
        from: &'static str,
        to: &'static str,
    },
    /// 完成前未设置输出文件名
    #[error("文件 {id} 尚未分配输出文件名")]
    MissingName { id: String },
    /// 格式化前缺少分类结果
    #[error("文件 {id} 缺少分类结果")]
    Unclassified { id: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: AppError = WorkerError::InitTimeout { secs: 30 }.into();
        assert_eq!(err.code(), "WORKER_INIT_ERROR");

        let err: AppError = WorkerError::AnalyzeTimeout { secs: 30 }.into();
        assert_eq!(err.code(), "ANALYSIS_ERROR");

        let err: AppError = PackageError::Finish("disk full".to_string()).into();
        assert_eq!(err.code(), "PACKAGE_ERROR");

        let err: AppError = UploadError::UnsupportedType {
            name: "a.gif".to_string(),
            mime_type: "image/gif".to_string(),
        }
        .into();
        assert_eq!(err.code(), "UPLOAD_REJECTED");

        let err: AppError = FormatError::Timeout { secs: 60 }.into();
        assert_eq!(err.code(), "FORMAT_ERROR");

        let err: AppError = TransitionError::Unclassified { id: "f1".to_string() }.into();
        assert_eq!(err.code(), "STATE_ERROR");

        let err: AppError = FileError::DirectoryNotFound { path: "in".to_string() }.into();
        assert_eq!(err.code(), "FILE_ERROR");
    }

    #[test]
    fn test_error_messages_are_not_empty() {
        let err = FormatError::PdfTooLarge {
            size_kb: 900,
            max_kb: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("900"));
        assert!(msg.contains("500"));
    }
}
