use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::document_type::DocumentType;

/// 考试代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamCode {
    Upsc,
    Neet,
    Jee,
    Cat,
    Gate,
}

impl ExamCode {
    pub const ALL: [ExamCode; 5] = [
        ExamCode::Upsc,
        ExamCode::Neet,
        ExamCode::Jee,
        ExamCode::Cat,
        ExamCode::Gate,
    ];

    /// 小写代码，用作输出文件名前缀
    pub fn as_str(self) -> &'static str {
        match self {
            ExamCode::Upsc => "upsc",
            ExamCode::Neet => "neet",
            ExamCode::Jee => "jee",
            ExamCode::Cat => "cat",
            ExamCode::Gate => "gate",
        }
    }
}

impl std::str::FromStr for ExamCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ExamCode::ALL
            .into_iter()
            .find(|code| code.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownExam {
                code: s.to_string(),
            })
    }
}

impl std::fmt::Display for ExamCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Pdf,
}

static OUTPUT_FORMATS: phf::Map<&'static str, OutputFormat> = phf_map! {
    "JPEG" => OutputFormat::Jpeg,
    "JPG" => OutputFormat::Jpeg,
    "PNG" => OutputFormat::Png,
    "PDF" => OutputFormat::Pdf,
};

impl OutputFormat {
    /// 解析格式名，无法识别的格式按 JPEG 处理
    pub fn parse_lossy(name: &str) -> Self {
        OUTPUT_FORMATS
            .get(name.trim().to_uppercase().as_str())
            .copied()
            .unwrap_or(OutputFormat::Jpeg)
    }

    /// 文件扩展名
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl From<String> for OutputFormat {
    fn from(value: String) -> Self {
        OutputFormat::parse_lossy(&value)
    }
}

impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(OutputFormat::from)
    }
}

/// 单类文档的目标规格
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentFormat {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub format: OutputFormat,
    /// JPEG 质量 (1-100)
    pub quality: u8,
    /// 输出大小上限（KB）
    pub max_size_kb: u64,
}

impl DocumentFormat {
    pub fn max_size_bytes(&self) -> usize {
        (self.max_size_kb * 1024) as usize
    }
}

/// 照片 / 签名 / 其他文档三类规格
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExamFormats {
    pub photo: DocumentFormat,
    pub signature: DocumentFormat,
    pub documents: DocumentFormat,
}

/// 考试配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExamProfile {
    pub code: ExamCode,
    /// 显示名称
    pub name: String,
    pub formats: ExamFormats,
    /// 单个上传文件大小上限（KB）
    pub max_file_size_kb: u64,
    pub allowed_mime_types: Vec<String>,
    /// 该考试要求提交的文档类型
    pub document_types: Vec<String>,
}

impl ExamProfile {
    /// 根据文档类型选择规格：照片、签名以外的类型都使用文档规格
    pub fn format_for(&self, document_type: DocumentType) -> &DocumentFormat {
        match document_type {
            DocumentType::Photo => &self.formats.photo,
            DocumentType::Signature => &self.formats.signature,
            _ => &self.formats.documents,
        }
    }

    /// 输出扩展名
    pub fn output_extension(&self, document_type: DocumentType) -> &'static str {
        self.format_for(document_type).format.extension()
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_size_kb * 1024
    }

    pub fn allows_mime(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

/// 全部考试配置（运行期只读）
#[derive(Debug, Clone)]
pub struct ExamProfiles {
    profiles: Vec<ExamProfile>,
}

impl ExamProfiles {
    /// 校验每个考试代码恰好有一份配置
    pub fn new(profiles: Vec<ExamProfile>) -> Result<Self, ConfigError> {
        for code in ExamCode::ALL {
            match profiles.iter().filter(|p| p.code == code).count() {
                0 => {
                    return Err(ConfigError::MissingProfile {
                        code: code.to_string(),
                    })
                }
                1 => {}
                _ => {
                    return Err(ConfigError::DuplicateProfile {
                        code: code.to_string(),
                    })
                }
            }
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, code: ExamCode) -> Option<&ExamProfile> {
        self.profiles.iter().find(|p| p.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExamProfile> {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_code_parse() {
        assert_eq!("upsc".parse::<ExamCode>().unwrap(), ExamCode::Upsc);
        assert_eq!(" GATE ".parse::<ExamCode>().unwrap(), ExamCode::Gate);
        assert!("ssc".parse::<ExamCode>().is_err());
    }

    #[test]
    fn test_output_format_parse_lossy() {
        assert_eq!(OutputFormat::parse_lossy("JPEG"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::parse_lossy("png"), OutputFormat::Png);
        assert_eq!(OutputFormat::parse_lossy("Pdf"), OutputFormat::Pdf);
        assert_eq!(OutputFormat::parse_lossy("TIFF"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::parse_lossy("TIFF").extension(), "jpg");
    }
}
