use crate::error::FileError;
use crate::models::file::UploadedFile;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 扫描文件夹，为每个普通文件创建 UploadedFile（按文件名排序，不递归）
///
/// MIME 类型按扩展名推断，大小取文件元数据；内容在格式化时才读取。
///
/// # 参数
/// - `folder_path`: 输入文件夹路径
///
/// # 返回
/// 排好序的上传文件列表；目录不存在或无法读取时返回 `FileError`
pub async fn load_uploads(folder_path: &str) -> Result<Vec<UploadedFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut paths = Vec::new();
    let read_failed = |source: std::io::Error| FileError::ReadFailed {
        path: folder_path.to_string(),
        source,
    };
    let mut entries = fs::read_dir(&folder).await.map_err(read_failed)?;

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("无法读取文件信息 {}: {}", path.display(), e);
                continue;
            }
        };
        if metadata.is_file() {
            paths.push((path, metadata.len()));
        }
    }

    paths.sort_by(|a, b| a.0.cmp(&b.0));

    let uploads = paths
        .into_iter()
        .map(|(path, size)| upload_from_path(&path, size))
        .collect::<Vec<_>>();

    tracing::info!("在 {} 中找到 {} 个文件", folder_path, uploads.len());
    Ok(uploads)
}

fn upload_from_path(path: &Path, size: u64) -> UploadedFile {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    tracing::debug!("加载: {} ({}, {} 字节)", name, mime_type, size);
    UploadedFile::from_path(name, mime_type, size, path)
}
