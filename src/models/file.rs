//! 上传文件与处理中文件
//!
//! `ProcessedFile` 的状态只能向前流转：
//!
//! ```text
//! pending → processing → completed
//!                      ↘ error
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::TransitionError;
use crate::models::document_type::DocumentType;

/// 文件内容来源
#[derive(Debug, Clone)]
enum UploadContent {
    /// 已在内存中
    Bytes(Arc<[u8]>),
    /// 磁盘文件，格式化时才读取
    Path(PathBuf),
}

/// 上传文件（创建后不可变）
#[derive(Debug, Clone)]
pub struct UploadedFile {
    id: String,
    original_name: String,
    size: u64,
    mime_type: String,
    content: UploadContent,
}

impl UploadedFile {
    /// 从内存数据创建，大小取数据长度
    pub fn from_bytes(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        let data: Arc<[u8]> = data.into();
        Self {
            id: new_file_id(),
            original_name: original_name.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            content: UploadContent::Bytes(data),
        }
    }

    /// 从磁盘路径创建，大小使用声明值
    pub fn from_path(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: new_file_id(),
            original_name: original_name.into(),
            size,
            mime_type: mime_type.into(),
            content: UploadContent::Path(path.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// 声明大小（字节）
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 声明的 MIME 类型
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// 读取原始字节
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            UploadContent::Bytes(data) => Ok(data.to_vec()),
            UploadContent::Path(path) => tokio::fs::read(path).await,
        }
    }
}

fn new_file_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub file_id: String,
    pub detected_type: DocumentType,
}

/// 文件处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Processing => "processing",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Error)
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 处理中的文件
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    upload: UploadedFile,
    classification: Option<ClassificationResult>,
    new_name: Option<String>,
    formatted: Option<Vec<u8>>,
    status: FileStatus,
    progress: f32,
    error: Option<String>,
}

impl ProcessedFile {
    pub fn new(upload: UploadedFile) -> Self {
        Self {
            upload,
            classification: None,
            new_name: None,
            formatted: None,
            status: FileStatus::Pending,
            progress: 0.0,
            error: None,
        }
    }

    pub fn id(&self) -> &str {
        self.upload.id()
    }

    pub fn upload(&self) -> &UploadedFile {
        &self.upload
    }

    pub fn original_name(&self) -> &str {
        self.upload.original_name()
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    pub fn detected_type(&self) -> Option<DocumentType> {
        self.classification.as_ref().map(|c| c.detected_type)
    }

    pub fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    pub fn formatted(&self) -> Option<&[u8]> {
        self.formatted.as_deref()
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    /// 进度百分比 (0-100)
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// pending → processing
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(FileStatus::Processing)
    }

    /// 记录分类结果与输出文件名（仅在 processing 状态）
    pub fn classify(
        &mut self,
        detected_type: DocumentType,
        new_name: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if self.status != FileStatus::Processing {
            return Err(self.invalid(FileStatus::Processing));
        }
        self.classification = Some(ClassificationResult {
            file_id: self.id().to_string(),
            detected_type,
        });
        self.new_name = Some(new_name.into());
        Ok(())
    }

    /// 更新进度，只增不减；终态后忽略
    pub fn set_progress(&mut self, progress: f32) {
        if self.status.is_terminal() {
            return;
        }
        self.progress = self.progress.max(progress.clamp(0.0, 100.0));
    }

    /// processing → completed
    pub fn complete(&mut self, formatted: Vec<u8>) -> Result<(), TransitionError> {
        if self.new_name.is_none() {
            return Err(TransitionError::MissingName {
                id: self.id().to_string(),
            });
        }
        self.transition(FileStatus::Completed)?;
        self.formatted = Some(formatted);
        self.progress = 100.0;
        Ok(())
    }

    /// pending / processing → error
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(FileStatus::Error)?;
        let message = message.into();
        self.error = Some(if message.trim().is_empty() {
            "未知错误".to_string()
        } else {
            message
        });
        Ok(())
    }

    fn transition(&mut self, to: FileStatus) -> Result<(), TransitionError> {
        let allowed = matches!(
            (self.status, to),
            (FileStatus::Pending, FileStatus::Processing)
                | (FileStatus::Pending, FileStatus::Error)
                | (FileStatus::Processing, FileStatus::Completed)
                | (FileStatus::Processing, FileStatus::Error)
        );
        if !allowed {
            return Err(self.invalid(to));
        }
        self.status = to;
        Ok(())
    }

    fn invalid(&self, to: FileStatus) -> TransitionError {
        TransitionError::Invalid {
            id: self.id().to_string(),
            from: self.status.as_str(),
            to: to.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProcessedFile {
        ProcessedFile::new(UploadedFile::from_bytes(
            "photo.jpg",
            "image/jpeg",
            vec![1u8, 2, 3],
        ))
    }

    #[test]
    fn test_forward_transitions() {
        let mut file = sample();
        assert_eq!(file.status(), FileStatus::Pending);

        file.start().unwrap();
        file.classify(DocumentType::Photo, "upsc_photograph.jpg")
            .unwrap();
        file.set_progress(25.0);
        file.complete(vec![9]).unwrap();

        assert_eq!(file.status(), FileStatus::Completed);
        assert_eq!(file.progress(), 100.0);
        assert_eq!(file.new_name(), Some("upsc_photograph.jpg"));
        assert!(file.error().is_none());
    }

    #[test]
    fn test_no_backward_transitions() {
        let mut file = sample();
        file.start().unwrap();
        file.fail("boom").unwrap();

        assert!(file.start().is_err());
        assert!(file.complete(vec![]).is_err());
        assert!(file.fail("again").is_err());
        assert_eq!(file.error(), Some("boom"));
    }

    #[test]
    fn test_complete_requires_name() {
        let mut file = sample();
        file.start().unwrap();
        let err = file.complete(vec![]).unwrap_err();
        assert!(matches!(err, TransitionError::MissingName { .. }));
        assert_eq!(file.status(), FileStatus::Processing);
    }

    #[test]
    fn test_error_message_never_empty() {
        let mut file = sample();
        file.start().unwrap();
        file.fail("  ").unwrap();
        assert_eq!(file.status(), FileStatus::Error);
        assert!(!file.error().unwrap().trim().is_empty());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut file = sample();
        file.start().unwrap();
        file.set_progress(50.0);
        file.set_progress(25.0);
        assert_eq!(file.progress(), 50.0);
        file.set_progress(250.0);
        assert_eq!(file.progress(), 100.0);
    }

    #[test]
    fn test_file_ids_are_unique() {
        let a = UploadedFile::from_bytes("a.jpg", "image/jpeg", vec![0u8]);
        let b = UploadedFile::from_bytes("a.jpg", "image/jpeg", vec![0u8]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.size(), 1);
    }
}
