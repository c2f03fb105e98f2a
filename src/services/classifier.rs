//! 文件名分类服务 - 业务能力层
//!
//! 只负责"根据文件名判断文档类型"，不关心流程。
//!
//! 判断顺序：
//! 1. 去掉扩展名并转小写
//! 2. 按顺序匹配 `primary` 规则，命中任一模式即返回
//! 3. 按顺序匹配 `fallback` 关键字
//! 4. 都未命中时返回 `document`
//!
//! 规则顺序即优先级：更具体的规则必须排在更通用的规则之前
//! （`caste_certificate` 最先匹配；收入、户籍、迁移证明在 `certificate` 之前）。

use regex::Regex;

use crate::models::DocumentType;

/// 单个匹配模式
#[derive(Debug, Clone)]
pub enum Pattern {
    /// 子串匹配
    Contains(&'static str),
    /// 整词匹配（以非字母数字字符切分）
    Token(&'static str),
    /// 正则匹配
    Regex(Regex),
}

impl Pattern {
    fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Pattern::Regex(Regex::new(pattern)?))
    }

    /// `name` 已经是小写
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Contains(needle) => name.contains(needle),
            Pattern::Token(token) => name
                .split(|c: char| !c.is_alphanumeric())
                .any(|part| part == *token),
            Pattern::Regex(re) => re.is_match(name),
        }
    }
}

/// 一条分类规则：类型 + 模式集合
#[derive(Debug, Clone)]
pub struct Rule {
    pub label: DocumentType,
    pub patterns: Vec<Pattern>,
}

impl Rule {
    fn new(label: DocumentType, patterns: Vec<Pattern>) -> Self {
        Self { label, patterns }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }
}

/// 文件名分类器
///
/// 纯函数：同一文件名总是得到同一类型，内部没有可变状态。
#[derive(Debug, Clone)]
pub struct Classifier {
    primary: Vec<Rule>,
    fallback: Vec<Rule>,
}

impl Classifier {
    /// 使用内置规则创建分类器（编译正则）
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            primary: primary_rules()?,
            fallback: fallback_rules(),
        })
    }

    /// 使用自定义规则创建
    pub fn with_rules(primary: Vec<Rule>, fallback: Vec<Rule>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary_rules(&self) -> &[Rule] {
        &self.primary
    }

    pub fn fallback_rules(&self) -> &[Rule] {
        &self.fallback
    }

    /// 根据文件名判断文档类型
    pub fn classify(&self, filename: &str) -> DocumentType {
        let name = normalize(filename);

        self.primary
            .iter()
            .chain(self.fallback.iter())
            .find(|rule| rule.matches(&name))
            .map(|rule| rule.label)
            .unwrap_or(DocumentType::Document)
    }
}

/// 去掉最后一个扩展名并转小写
fn normalize(filename: &str) -> String {
    let lower = filename.to_lowercase();
    match lower.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => lower,
    }
}

fn primary_rules() -> Result<Vec<Rule>, regex::Error> {
    use Pattern::{Contains, Token};

    Ok(vec![
        Rule::new(
            DocumentType::CasteCertificate,
            vec![
                Contains("caste"),
                Contains("community"),
                Pattern::regex(r"(^|[^a-z0-9])(sc|st|obc)([^a-z0-9].*)?cert")?,
                Pattern::regex(r"backward.*class")?,
                Pattern::regex(r"reservation.*certificate")?,
            ],
        ),
        Rule::new(
            DocumentType::Aadhaar,
            vec![
                Pattern::regex(r"aadhaar|आधार")?,
                Pattern::regex(r"\d{4}\s*\d{4}\s*\d{4}")?,
                Contains("government of india"),
                Contains("unique identification authority"),
            ],
        ),
        Rule::new(
            DocumentType::Photo,
            vec![
                Pattern::regex(r"photograph|photo")?,
                Pattern::regex(r"passport.*size")?,
                Pattern::regex(r"recent.*photo")?,
                Pattern::regex(r"headshot|portrait")?,
            ],
        ),
        Rule::new(
            DocumentType::Signature,
            vec![
                Pattern::regex(r"signature|sign")?,
                Pattern::regex(r"specimen.*signature")?,
                Pattern::regex(r"thumb.*impression")?,
            ],
        ),
        Rule::new(
            DocumentType::Marksheet,
            vec![
                Pattern::regex(r"mark.*sheet|marksheet")?,
                Pattern::regex(r"grade.*sheet|gradesheet")?,
                Contains("transcript"),
                Pattern::regex(r"examination.*result")?,
                Pattern::regex(r"board.*examination")?,
                Pattern::regex(r"semester.*result")?,
                Pattern::regex(r"class.*10|class.*12")?,
                Pattern::regex(r"10th|12th")?,
            ],
        ),
        Rule::new(
            DocumentType::IncomeCertificate,
            vec![
                Pattern::regex(r"income.*certificate")?,
                Pattern::regex(r"annual.*income")?,
                Pattern::regex(r"salary.*certificate")?,
                Pattern::regex(r"earnings.*certificate")?,
            ],
        ),
        Rule::new(
            DocumentType::Domicile,
            vec![
                Contains("domicile"),
                Pattern::regex(r"residence.*certificate")?,
                Pattern::regex(r"permanent.*resident")?,
            ],
        ),
        Rule::new(
            DocumentType::Migration,
            vec![
                Pattern::regex(r"migration.*certificate")?,
                Pattern::regex(r"transfer.*certificate")?,
                Token("tc"),
                Pattern::regex(r"(^|[^a-z0-9])t\.c\.?")?,
                Pattern::regex(r"school.*leaving")?,
            ],
        ),
        Rule::new(
            DocumentType::Certificate,
            vec![
                Contains("certificate"),
                Contains("diploma"),
                Contains("degree"),
                Contains("graduation"),
                Pattern::regex(r"post.*graduation")?,
                Pattern::regex(r"bachelor|master|phd")?,
            ],
        ),
    ])
}

fn fallback_rules() -> Vec<Rule> {
    use Pattern::{Contains, Token};

    vec![
        Rule::new(
            DocumentType::Photo,
            vec![
                Contains("photo"),
                Contains("pic"),
                Contains("image"),
                Contains("passport"),
                Contains("headshot"),
            ],
        ),
        Rule::new(
            DocumentType::Signature,
            vec![Contains("sign"), Contains("signature"), Contains("autograph")],
        ),
        Rule::new(
            DocumentType::Marksheet,
            vec![
                Contains("mark"),
                Contains("grade"),
                Contains("result"),
                Contains("transcript"),
            ],
        ),
        Rule::new(
            DocumentType::Certificate,
            vec![
                Contains("cert"),
                Contains("certificate"),
                Contains("diploma"),
                Contains("degree"),
            ],
        ),
        Rule::new(
            DocumentType::Aadhaar,
            vec![Contains("aadhaar"), Contains("aadhar"), Contains("uid")],
        ),
        Rule::new(
            DocumentType::CasteCertificate,
            vec![
                Contains("caste"),
                Contains("community"),
                Token("sc"),
                Token("st"),
                Token("obc"),
            ],
        ),
        Rule::new(
            DocumentType::IncomeCertificate,
            vec![Contains("income"), Contains("salary"), Contains("earnings")],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new().unwrap()
    }

    #[test]
    fn test_basic_labels() {
        let c = classifier();
        let cases = [
            ("passport_photo_final.jpg", DocumentType::Photo),
            ("my_signature.png", DocumentType::Signature),
            ("Aadhaar_Card.pdf", DocumentType::Aadhaar),
            ("1234 5678 9012.jpg", DocumentType::Aadhaar),
            ("class12_marksheet.pdf", DocumentType::Marksheet),
            ("Semester_Result.pdf", DocumentType::Marksheet),
            ("degree_certificate.pdf", DocumentType::Certificate),
            ("income_certificate_2024.pdf", DocumentType::IncomeCertificate),
            ("domicile.pdf", DocumentType::Domicile),
            ("migration_certificate.pdf", DocumentType::Migration),
            ("school_leaving_certificate.pdf", DocumentType::Migration),
            ("TC.pdf", DocumentType::Migration),
            ("obc_ncl_certificate.pdf", DocumentType::CasteCertificate),
            ("scan001.jpg", DocumentType::Document),
        ];

        for (name, expected) in cases {
            assert_eq!(c.classify(name), expected, "文件名: {}", name);
        }
    }

    #[test]
    fn test_caste_beats_certificate() {
        let c = classifier();
        for name in [
            "caste_certificate.pdf",
            "Community-Certificate.JPG",
            "caste_photo.jpg",
            "community_signature.png",
            "certificate_of_caste.pdf",
        ] {
            assert_eq!(c.classify(name), DocumentType::CasteCertificate, "{}", name);
        }
    }

    #[test]
    fn test_short_tokens_need_word_boundaries() {
        let c = classifier();
        // "sc" 出现在 school 中不应判为种姓证明
        assert_ne!(
            c.classify("school_certificate.pdf"),
            DocumentType::CasteCertificate
        );
        // "st" 出现在 test 中不应判为种姓证明
        assert_eq!(c.classify("test.jpg"), DocumentType::Document);
        // "tc" 出现在 sketch 中不应判为迁移证明
        assert_eq!(c.classify("sketch.png"), DocumentType::Document);
    }

    #[test]
    fn test_fallback_keywords() {
        let c = classifier();
        assert_eq!(c.classify("profile_pic.png"), DocumentType::Photo);
        assert_eq!(c.classify("autograph.png"), DocumentType::Signature);
        assert_eq!(c.classify("final_grades.pdf"), DocumentType::Marksheet);
        assert_eq!(c.classify("uid_front.jpg"), DocumentType::Aadhaar);
        assert_eq!(c.classify("aadhar.jpg"), DocumentType::Aadhaar);
        assert_eq!(c.classify("salary_slip.pdf"), DocumentType::IncomeCertificate);
    }

    #[test]
    fn test_extension_is_ignored() {
        let c = classifier();
        // 扩展名里的关键字不参与匹配
        assert_eq!(c.classify("scan.photo"), DocumentType::Document);
        assert_eq!(c.classify("photo"), DocumentType::Photo);
    }

    #[test]
    fn test_idempotent() {
        let c = classifier();
        for name in ["caste.pdf", "x.jpg", "recent_photo.png", "10th.pdf"] {
            assert_eq!(c.classify(name), c.classify(name));
        }
    }

    #[test]
    fn test_rule_order() {
        let c = classifier();
        let labels: Vec<DocumentType> = c.primary_rules().iter().map(|r| r.label).collect();
        let pos = |t| labels.iter().position(|l| *l == t).unwrap();

        assert_eq!(
            labels,
            vec![
                DocumentType::CasteCertificate,
                DocumentType::Aadhaar,
                DocumentType::Photo,
                DocumentType::Signature,
                DocumentType::Marksheet,
                DocumentType::IncomeCertificate,
                DocumentType::Domicile,
                DocumentType::Migration,
                DocumentType::Certificate,
            ]
        );
        assert!(pos(DocumentType::IncomeCertificate) < pos(DocumentType::Certificate));
        assert!(pos(DocumentType::Migration) < pos(DocumentType::Certificate));
    }

    #[test]
    fn test_identity_rules_beat_certificate_subtypes() {
        let c = classifier();
        // 身份、照片、签名、成绩单规则先于收入 / 户籍 / 迁移规则
        let cases = [
            ("permanent_resident_aadhaar.pdf", DocumentType::Aadhaar),
            ("photo_tc.jpg", DocumentType::Photo),
            ("signature_annual_income.jpg", DocumentType::Signature),
            ("class10_transfer_certificate.pdf", DocumentType::Marksheet),
            ("domicile_certificate.pdf", DocumentType::Domicile),
            ("transfer_certificate.pdf", DocumentType::Migration),
        ];

        for (name, expected) in cases {
            assert_eq!(c.classify(name), expected, "文件名: {}", name);
        }
    }

    #[test]
    fn test_custom_rules() {
        let c = Classifier::with_rules(
            vec![Rule::new(DocumentType::Photo, vec![Pattern::Token("dp")])],
            vec![],
        );
        assert_eq!(c.classify("my_dp.jpg"), DocumentType::Photo);
        assert_eq!(c.classify("dpi.jpg"), DocumentType::Document);
    }
}
