use serde::{Deserialize, Serialize};

/// 文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// 照片
    Photo,
    /// 签名
    Signature,
    /// Aadhaar 身份卡
    Aadhaar,
    /// 成绩单
    Marksheet,
    /// 通用证书
    Certificate,
    /// 种姓证明
    CasteCertificate,
    /// 收入证明
    IncomeCertificate,
    /// 户籍证明
    Domicile,
    /// 迁移证明
    Migration,
    /// 其他文档（兜底类型）
    #[serde(other)]
    Document,
}

impl DocumentType {
    /// 全部类型
    pub const ALL: [DocumentType; 10] = [
        DocumentType::Photo,
        DocumentType::Signature,
        DocumentType::Aadhaar,
        DocumentType::Marksheet,
        DocumentType::Certificate,
        DocumentType::CasteCertificate,
        DocumentType::IncomeCertificate,
        DocumentType::Domicile,
        DocumentType::Migration,
        DocumentType::Document,
    ];

    /// 标签（与 worker 协议中的 detectedType 一致）
    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Photo => "photo",
            DocumentType::Signature => "signature",
            DocumentType::Aadhaar => "aadhaar",
            DocumentType::Marksheet => "marksheet",
            DocumentType::Certificate => "certificate",
            DocumentType::CasteCertificate => "caste_certificate",
            DocumentType::IncomeCertificate => "income_certificate",
            DocumentType::Domicile => "domicile",
            DocumentType::Migration => "migration",
            DocumentType::Document => "document",
        }
    }

    /// 输出文件名中的类型后缀
    pub fn name_suffix(self) -> &'static str {
        match self {
            DocumentType::Photo => "photograph",
            DocumentType::Signature => "signature",
            DocumentType::Aadhaar => "aadhaar_card",
            DocumentType::Marksheet => "marksheet",
            DocumentType::Certificate => "certificate",
            DocumentType::CasteCertificate => "caste_certificate",
            DocumentType::IncomeCertificate => "income_certificate",
            DocumentType::Domicile => "domicile_certificate",
            DocumentType::Migration => "migration_certificate",
            DocumentType::Document => "document",
        }
    }

    /// 从标签解析（精确匹配）
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for t in DocumentType::ALL {
            assert_eq!(DocumentType::from_label(t.label()), Some(t));
        }
        assert_eq!(DocumentType::from_label("class10_marksheet"), None);
    }

    #[test]
    fn test_serde_unknown_label_falls_back() {
        let t: DocumentType = serde_json::from_str("\"caste_certificate\"").unwrap();
        assert_eq!(t, DocumentType::CasteCertificate);

        let t: DocumentType = serde_json::from_str("\"passport\"").unwrap();
        assert_eq!(t, DocumentType::Document);
    }
}
