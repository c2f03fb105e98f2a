//! 上传校验服务 - 业务能力层
//!
//! 按考试配置检查 MIME 类型与文件大小，不合格的文件不进入处理流程。

use tracing::warn;

use crate::error::{AppError, UploadError};
use crate::models::{ExamProfile, UploadedFile};

/// 校验结果
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 通过校验的文件（保持原有顺序）
    pub accepted: Vec<UploadedFile>,
    /// 被拒绝的文件及原因
    pub rejected: Vec<UploadError>,
}

impl ValidationReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// 检查单个文件
pub fn check_upload(profile: &ExamProfile, file: &UploadedFile) -> Result<(), UploadError> {
    if !profile.allows_mime(file.mime_type()) {
        return Err(UploadError::UnsupportedType {
            name: file.original_name().to_string(),
            mime_type: file.mime_type().to_string(),
        });
    }
    if file.size() > profile.max_upload_bytes() {
        return Err(UploadError::TooLarge {
            name: file.original_name().to_string(),
            size_kb: file.size().div_ceil(1024),
            max_kb: profile.max_file_size_kb,
        });
    }
    Ok(())
}

/// 把上传文件分为通过与拒绝两组
pub fn validate_uploads(profile: &ExamProfile, files: Vec<UploadedFile>) -> ValidationReport {
    let mut report = ValidationReport::default();

    for file in files {
        match check_upload(profile, &file) {
            Ok(()) => report.accepted.push(file),
            Err(e) => {
                warn!("[{}] {}", AppError::from(e.clone()).code(), e);
                report.rejected.push(e);
            }
        }
    }

    if !report.rejected.is_empty() {
        warn!(
            "⚠️ {} 个文件因格式或大小不符被拒绝，请检查 {} 的要求",
            report.rejected.len(),
            profile.name
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{builtin_profiles, ExamCode};

    #[test]
    fn test_validate_uploads() {
        let profiles = builtin_profiles().unwrap();
        let neet = profiles.get(ExamCode::Neet).unwrap();

        let files = vec![
            UploadedFile::from_bytes("photo.jpg", "image/jpeg", vec![0u8; 10]),
            UploadedFile::from_bytes("marks.pdf", "application/pdf", vec![0u8; 10]),
            UploadedFile::from_path("huge.png", "image/png", 2 * 1024 * 1024, "huge.png"),
            UploadedFile::from_bytes("sign.png", "image/png", vec![0u8; 10]),
        ];

        let report = validate_uploads(neet, files);
        let accepted: Vec<&str> = report.accepted.iter().map(|f| f.original_name()).collect();
        assert_eq!(accepted, vec!["photo.jpg", "sign.png"]);
        assert_eq!(report.rejected_count(), 2);
        assert!(matches!(report.rejected[0], UploadError::UnsupportedType { .. }));
        assert!(matches!(
            report.rejected[1],
            UploadError::TooLarge {
                size_kb: 2048,
                max_kb: 1024,
                ..
            }
        ));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let profiles = builtin_profiles().unwrap();
        let gate = profiles.get(ExamCode::Gate).unwrap();
        let exact = UploadedFile::from_path("a.jpg", "image/jpeg", 1024 * 1024, "a.jpg");
        assert!(check_upload(gate, &exact).is_ok());
        let over = UploadedFile::from_path("a.jpg", "image/jpeg", 1024 * 1024 + 1, "a.jpg");
        assert!(check_upload(gate, &over).is_err());
    }
}
