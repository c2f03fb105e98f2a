//! 输出文件命名
//!
//! `{exam}_{suffix}`，同一批次中同类型的第 n 个文件（n > 0）追加 `_{n+1}`。

use std::collections::HashMap;

use crate::models::{DocumentType, ExamCode, OutputFormat};

/// 生成不带扩展名的基础文件名
///
/// # 参数
/// - `document_type`: 识别出的文档类型
/// - `exam`: 考试代码，作为前缀
/// - `index`: 同类型在批次中的序号（从 0 开始）
///
/// # 返回
/// 例如 `upsc_photograph`、`gate_marksheet_2`
pub fn base_name(document_type: DocumentType, exam: ExamCode, index: usize) -> String {
    let mut name = format!("{}_{}", exam.as_str(), document_type.name_suffix());
    if index > 0 {
        name.push_str(&format!("_{}", index + 1));
    }
    name
}

/// 追加输出格式对应的扩展名
pub fn with_extension(base_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", base_name, format.extension())
}

/// 批次内按文档类型计数，给出每个文件的重复序号（从 0 开始，按出现顺序）
#[derive(Debug, Default)]
pub struct DuplicateCounter {
    counts: HashMap<DocumentType, usize>,
}

impl DuplicateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回该类型当前序号并计数加一
    pub fn next_index(&mut self, document_type: DocumentType) -> usize {
        let count = self.counts.entry(document_type).or_insert(0);
        let index = *count;
        *count += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_examples() {
        assert_eq!(base_name(DocumentType::Photo, ExamCode::Upsc, 0), "upsc_photograph");
        assert_eq!(
            base_name(DocumentType::Aadhaar, ExamCode::Neet, 0),
            "neet_aadhaar_card"
        );
        assert_eq!(
            base_name(DocumentType::Domicile, ExamCode::Cat, 0),
            "cat_domicile_certificate"
        );
        assert_eq!(
            with_extension(&base_name(DocumentType::Photo, ExamCode::Upsc, 0), OutputFormat::Jpeg),
            "upsc_photograph.jpg"
        );
    }

    #[test]
    fn test_duplicate_index_suffix() {
        assert_eq!(
            base_name(DocumentType::Certificate, ExamCode::Gate, 0),
            "gate_certificate"
        );
        assert_eq!(
            base_name(DocumentType::Certificate, ExamCode::Gate, 1),
            "gate_certificate_2"
        );
        assert_eq!(
            base_name(DocumentType::Certificate, ExamCode::Gate, 9),
            "gate_certificate_10"
        );
    }

    #[test]
    fn test_all_names_start_with_exam_code() {
        for exam in ExamCode::ALL {
            for t in DocumentType::ALL {
                let name = base_name(t, exam, 0);
                assert!(name.starts_with(&format!("{}_", exam.as_str())), "{}", name);
                assert!(!name.contains("undefined"));
            }
        }
    }

    #[test]
    fn test_duplicate_counter_per_type() {
        let mut counter = DuplicateCounter::new();
        assert_eq!(counter.next_index(DocumentType::Photo), 0);
        assert_eq!(counter.next_index(DocumentType::Signature), 0);
        assert_eq!(counter.next_index(DocumentType::Photo), 1);
        assert_eq!(counter.next_index(DocumentType::Photo), 2);
        assert_eq!(counter.next_index(DocumentType::Signature), 1);
    }
}
