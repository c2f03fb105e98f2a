//! 处理报告写入服务 - 业务能力层
//!
//! 只负责"把单个文件的处理结果追加到报告文件"，不关心流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::ProcessedFile;

/// 报告写入服务
///
/// 职责：
/// - 每个文件一行：状态、原文件名、识别类型、输出文件名、错误信息
/// - 只处理单个文件
/// - 不关心流程顺序
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    /// 报告文件路径
    pub fn path(&self) -> &str {
        &self.report_file_path
    }

    /// 追加一条文件处理记录
    ///
    /// # 参数
    /// - `file`: 已到达终态（或批次失败时当前状态）的文件
    ///
    /// # 返回
    /// 返回是否写入成功
    pub fn write(&self, file: &ProcessedFile) -> Result<()> {
        let line = format_line(file);
        debug!("写入报告: {}", line.trim_end());

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)
            .with_context(|| format!("无法打开报告文件: {}", self.report_file_path))?;

        handle.write_all(line.as_bytes())?;

        Ok(())
    }
}

fn format_line(file: &ProcessedFile) -> String {
    let detected = file
        .detected_type()
        .map(|t| t.label())
        .unwrap_or("-");
    let new_name = file.new_name().unwrap_or("-");

    match file.error() {
        Some(error) => format!(
            "[{}] {} | 类型: {} | 输出: {} | 错误: {}\n",
            file.status(),
            file.original_name(),
            detected,
            new_name,
            error
        ),
        None => format!(
            "[{}] {} | 类型: {} | 输出: {}\n",
            file.status(),
            file.original_name(),
            detected,
            new_name
        ),
    }
}
