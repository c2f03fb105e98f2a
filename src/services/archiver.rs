//! 打包服务 - 业务能力层
//!
//! 只负责"把已完成的文件打成一个 ZIP"，不关心流程。

use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{NaiveDate, Utc};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::PackageError;
use crate::models::ExamCode;

/// 待打包条目
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

/// 打包能力
pub trait Archiver: Send + Sync {
    fn create(&self, entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>, PackageError>;
}

/// ZIP 打包实现
#[derive(Debug, Default, Clone)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

impl Archiver for ZipArchiver {
    fn create(&self, entries: &[ArchiveEntry<'_>]) -> Result<Vec<u8>, PackageError> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            for (idx, entry) in entries.iter().enumerate() {
                let safe_name = sanitize_entry_name(entry.name, &format!("file_{}", idx + 1));

                zip.start_file(safe_name.as_str(), options)
                    .map_err(|e| PackageError::Entry {
                        entry: safe_name.clone(),
                        message: e.to_string(),
                    })?;
                zip.write_all(entry.data).map_err(|e| PackageError::Entry {
                    entry: safe_name.clone(),
                    message: e.to_string(),
                })?;
            }

            zip.finish()
                .map_err(|e| PackageError::Finish(e.to_string()))?;
        }

        Ok(buffer)
    }
}

/// 只保留文件名部分，避免路径穿越
fn sanitize_entry_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// 归档文件名使用的日期，按 UTC 计算
pub fn archive_date() -> NaiveDate {
    Utc::now().date_naive()
}

/// 归档文件名：`{EXAM}_documents_{YYYY-MM-DD}.zip`
///
/// # 参数
/// - `exam`: 考试代码，转为大写
/// - `date`: 归档日期，通常来自 [`archive_date`]
///
/// # 返回
/// 例如 `UPSC_documents_2026-10-19.zip`
pub fn archive_file_name(exam: ExamCode, date: NaiveDate) -> String {
    format!(
        "{}_documents_{}.zip",
        exam.as_str().to_uppercase(),
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_archive_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            archive_file_name(ExamCode::Upsc, date),
            "UPSC_documents_2026-10-19.zip"
        );
        assert_eq!(
            archive_file_name(ExamCode::Gate, date),
            "GATE_documents_2026-10-19.zip"
        );
    }

    #[test]
    fn test_zip_contains_entries() {
        let archiver = ZipArchiver::new();
        let bytes = archiver
            .create(&[
                ArchiveEntry {
                    name: "upsc_photograph.jpg",
                    data: b"photo",
                },
                ArchiveEntry {
                    name: "../upsc_signature.jpg",
                    data: b"sign",
                },
            ])
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("upsc_photograph.jpg")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "photo");
        assert!(archive.by_name("upsc_signature.jpg").is_ok());
    }

    #[test]
    fn test_sanitize_entry_name() {
        assert_eq!(sanitize_entry_name("a/b/c.jpg", "x"), "c.jpg");
        assert_eq!(sanitize_entry_name("..", "x"), "x");
        assert_eq!(sanitize_entry_name("", "x"), "x");
    }
}
