//! worker 消息协议
//!
//! 所有消息都是带 `type` 标签的 JSON 对象：
//!
//! ```text
//! → {"type":"init"}
//! ← {"type":"ready"}
//! → {"type":"analyze","data":{"files":[{"id":..,"name":..}],"examCode":"upsc"}}
//! ← {"type":"result","data":[{"id":..,"originalName":..,"detectedType":..,"newName":..}]}
//! ← {"type":"error","error":"..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{DocumentType, ExamCode, UploadedFile};

/// worker 消息信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerMessage {
    Init,
    Analyze { data: AnalyzeRequest },
    Ready,
    Result { data: Vec<AnalyzedFile> },
    Error { error: String },
}

impl WorkerMessage {
    /// 消息类型标签
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Init => "init",
            WorkerMessage::Analyze { .. } => "analyze",
            WorkerMessage::Ready => "ready",
            WorkerMessage::Result { .. } => "result",
            WorkerMessage::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// 待分析文件（只传 id 和文件名，不传内容）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
}

impl From<&UploadedFile> for FileDescriptor {
    fn from(file: &UploadedFile) -> Self {
        Self {
            id: file.id().to_string(),
            name: file.original_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub files: Vec<FileDescriptor>,
    pub exam_code: ExamCode,
}

/// 单个文件的分析结果，`new_name` 不带扩展名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedFile {
    pub id: String,
    pub original_name: String,
    pub detected_type: DocumentType,
    pub new_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let init = WorkerMessage::Init.to_json().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&init).unwrap(),
            json!({"type": "init"})
        );

        let analyze = WorkerMessage::Analyze {
            data: AnalyzeRequest {
                files: vec![FileDescriptor {
                    id: "f1".to_string(),
                    name: "photo.jpg".to_string(),
                }],
                exam_code: ExamCode::Neet,
            },
        };
        let value = serde_json::to_value(&analyze).unwrap();
        assert_eq!(value["type"], "analyze");
        assert_eq!(value["data"]["examCode"], "neet");
        assert_eq!(value["data"]["files"][0]["name"], "photo.jpg");
    }

    #[test]
    fn test_decode_result() {
        let raw = r#"{"type":"result","data":[
            {"id":"a","originalName":"caste.pdf","detectedType":"caste_certificate","newName":"upsc_caste_certificate"}
        ]}"#;
        match WorkerMessage::from_json(raw).unwrap() {
            WorkerMessage::Result { data } => {
                assert_eq!(data.len(), 1);
                assert_eq!(data[0].detected_type, DocumentType::CasteCertificate);
                assert_eq!(data[0].new_name, "upsc_caste_certificate");
            }
            other => panic!("意外的消息: {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_and_unknown() {
        let msg = WorkerMessage::from_json(r#"{"type":"error","error":"boom"}"#).unwrap();
        assert_eq!(msg.kind(), "error");
        assert!(WorkerMessage::from_json(r#"{"type":"shutdown"}"#).is_err());
        assert!(WorkerMessage::from_json("not json").is_err());
    }
}
