//! 文件处理上下文
//!
//! 封装"我正在处理这一批中的第几个文件"这一信息

use std::fmt::Display;

use crate::models::ExamCode;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct FileCtx {
    /// 文件在批次中的索引（从1开始）
    pub index: usize,

    /// 批次文件总数
    pub total: usize,

    /// 考试代码
    pub exam_code: ExamCode,

    /// 原始文件名（仅用于日志显示）
    pub original_name: String,
}

impl FileCtx {
    pub fn new(index: usize, total: usize, exam_code: ExamCode, original_name: impl Into<String>) -> Self {
        Self {
            index,
            total,
            exam_code,
            original_name: original_name.into(),
        }
    }
}

impl Display for FileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文件 {}/{} {} 考试#{}]",
            self.index, self.total, self.original_name, self.exam_code
        )
    }
}
