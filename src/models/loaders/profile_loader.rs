use crate::error::ConfigError;
use crate::models::exam::{ExamProfile, ExamProfiles};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 内置考试配置
const BUILTIN_PROFILES: &str = include_str!("../../../config/exams.toml");

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    exam: Vec<ExamProfile>,
}

/// 解析考试配置 TOML
pub fn parse_profiles(content: &str) -> Result<ExamProfiles, ConfigError> {
    let file: ProfilesFile = toml::from_str(content)?;
    ExamProfiles::new(file.exam)
}

/// 加载内置考试配置
pub fn builtin_profiles() -> Result<ExamProfiles, ConfigError> {
    parse_profiles(BUILTIN_PROFILES)
}

/// 从 TOML 文件加载考试配置
pub async fn load_profiles_file(path: &Path) -> Result<ExamProfiles> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取考试配置文件: {}", path.display()))?;

    let profiles = parse_profiles(&content)
        .with_context(|| format!("无法解析考试配置文件: {}", path.display()))?;

    tracing::info!(
        "已加载 {} 个考试配置: {}",
        profiles.iter().count(),
        path.display()
    );

    Ok(profiles)
}
