//! 考试文档要求检查
//!
//! 判断识别出的文档类型是否在该考试要求的列表中，只用于提示，不影响处理结果。

use crate::models::{DocumentType, ExamProfile};

/// 检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementCheck {
    pub required: bool,
    pub message: String,
}

pub fn check(document_type: DocumentType, profile: &ExamProfile) -> RequirementCheck {
    let label = document_type.label();
    let exam = profile.code.as_str().to_uppercase();
    let required = profile
        .document_types
        .iter()
        .any(|t| DocumentType::from_label(t) == Some(document_type));

    let message = if required {
        format!("文档类型 '{}' 是 {} 要求的材料", label, exam)
    } else {
        format!("文档类型 '{}' 可能不是 {} 要求的材料", label, exam)
    };

    RequirementCheck { required, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{builtin_profiles, ExamCode};

    #[test]
    fn test_requirement_check() {
        let profiles = builtin_profiles().unwrap();
        let upsc = profiles.get(ExamCode::Upsc).unwrap();

        let check_caste = check(DocumentType::CasteCertificate, upsc);
        assert!(check_caste.required);
        assert!(check_caste.message.contains("UPSC"));

        let check_domicile = check(DocumentType::Domicile, upsc);
        assert!(!check_domicile.required);
        assert!(check_domicile.message.contains("domicile"));
    }
}
