//! 文档分析 worker - 基础设施层
//!
//! 分析在独立的 tokio 任务中执行，通过两条 mpsc 通道收发 JSON 消息。
//! `AnalyzerSession` 持有这条唯一的通道，只暴露"分析一批文件名"的能力。
//!
//! 会话生命周期：
//! - `start()` 发送 `init` 并等待 `ready`，成功后才返回会话
//! - `analyze()` 需要 `&mut self`，同一时间最多一个请求在途
//! - `terminate()` 或 drop 时结束 worker 任务

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::WorkerError;
use crate::infrastructure::protocol::{AnalyzeRequest, AnalyzedFile, FileDescriptor, WorkerMessage};
use crate::models::{ExamCode, UploadedFile};
use crate::services::{namer, Classifier, DuplicateCounter};

const CHANNEL_CAPACITY: usize = 8;

/// worker 等待时限
#[derive(Debug, Clone, Copy)]
pub struct WorkerTimeouts {
    pub init: Duration,
    pub analyze: Duration,
}

impl Default for WorkerTimeouts {
    fn default() -> Self {
        Self {
            init: Duration::from_secs(30),
            analyze: Duration::from_secs(30),
        }
    }
}

/// worker 主循环：逐条处理请求，每条请求恰好回复一条消息
///
/// 请求通道关闭或回复通道被丢弃时退出。
pub async fn run_worker(mut requests: mpsc::Receiver<String>, replies: mpsc::Sender<String>) {
    let mut classifier: Option<Classifier> = None;

    while let Some(raw) = requests.recv().await {
        let reply = handle_message(&mut classifier, &raw);
        let encoded = match reply.to_json() {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("❌ worker 回复编码失败: {}", e);
                continue;
            }
        };
        if replies.send(encoded).await.is_err() {
            break;
        }
    }

    debug!("分析 worker 退出");
}

fn handle_message(classifier: &mut Option<Classifier>, raw: &str) -> WorkerMessage {
    let message = match WorkerMessage::from_json(raw) {
        Ok(message) => message,
        Err(e) => {
            return WorkerMessage::Error {
                error: format!("无法解析消息: {}", e),
            }
        }
    };

    match message {
        WorkerMessage::Init => match ensure_classifier(classifier) {
            Ok(_) => WorkerMessage::Ready,
            Err(error) => WorkerMessage::Error { error },
        },
        // 未初始化时先初始化再分析
        WorkerMessage::Analyze { data } => match ensure_classifier(classifier) {
            Ok(classifier) => WorkerMessage::Result {
                data: analyze_files(classifier, &data),
            },
            Err(error) => WorkerMessage::Error { error },
        },
        other => WorkerMessage::Error {
            error: format!("worker 不接受 {} 消息", other.kind()),
        },
    }
}

fn ensure_classifier(slot: &mut Option<Classifier>) -> Result<&Classifier, String> {
    if slot.is_none() {
        let classifier = Classifier::new().map_err(|e| format!("分类规则编译失败: {}", e))?;
        *slot = Some(classifier);
    }
    slot.as_ref().ok_or_else(|| "分类器未初始化".to_string())
}

/// 按请求顺序分类并命名，同类型的重复文件依次追加序号
fn analyze_files(classifier: &Classifier, request: &AnalyzeRequest) -> Vec<AnalyzedFile> {
    let mut counter = DuplicateCounter::new();

    request
        .files
        .iter()
        .map(|file| {
            let detected_type = classifier.classify(&file.name);
            let index = counter.next_index(detected_type);
            AnalyzedFile {
                id: file.id.clone(),
                original_name: file.name.clone(),
                detected_type,
                new_name: namer::base_name(detected_type, request.exam_code, index),
            }
        })
        .collect()
}

/// 分析会话
///
/// 职责：
/// - 持有唯一的 worker 通道
/// - 暴露 analyze() 能力
/// - 不做格式化，不做打包
pub struct AnalyzerSession {
    requests: mpsc::Sender<String>,
    replies: mpsc::Receiver<String>,
    handle: JoinHandle<()>,
    timeouts: WorkerTimeouts,
    /// 已超时但尚未收到的回复数，后续收到时丢弃
    stale_replies: usize,
}

impl AnalyzerSession {
    /// 启动内置 worker 并完成初始化握手
    pub async fn start(timeouts: WorkerTimeouts) -> Result<Self, WorkerError> {
        Self::start_with(timeouts, run_worker).await
    }

    /// 使用指定的 worker 实现启动会话
    pub async fn start_with<F, Fut>(timeouts: WorkerTimeouts, worker: F) -> Result<Self, WorkerError>
    where
        F: FnOnce(mpsc::Receiver<String>, mpsc::Sender<String>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (reply_tx, reply_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(worker(request_rx, reply_tx));

        let mut session = Self {
            requests: request_tx,
            replies: reply_rx,
            handle,
            timeouts,
            stale_replies: 0,
        };
        // 握手失败时 session 被 drop，worker 任务随之结束
        session.initialize().await?;

        info!("✓ 分析 worker 已就绪");
        Ok(session)
    }

    async fn initialize(&mut self) -> Result<(), WorkerError> {
        let limit = self.timeouts.init;
        match self.round_trip(&WorkerMessage::Init, limit).await {
            Ok(Some(WorkerMessage::Ready)) => Ok(()),
            Ok(Some(WorkerMessage::Error { error })) => Err(WorkerError::InitFailed { message: error }),
            Ok(Some(other)) => Err(WorkerError::UnexpectedMessage {
                kind: other.kind().to_string(),
            }),
            Ok(None) => Err(WorkerError::InitTimeout {
                secs: limit.as_secs(),
            }),
            Err(e) => Err(WorkerError::InitFailed {
                message: e.to_string(),
            }),
        }
    }

    /// 分析一批文件，返回每个文件的类型和基础文件名（不含扩展名）
    pub async fn analyze(
        &mut self,
        files: &[UploadedFile],
        exam_code: ExamCode,
    ) -> Result<Vec<AnalyzedFile>, WorkerError> {
        let request = WorkerMessage::Analyze {
            data: AnalyzeRequest {
                files: files.iter().map(FileDescriptor::from).collect(),
                exam_code,
            },
        };

        let limit = self.timeouts.analyze;
        match self.round_trip(&request, limit).await? {
            Some(WorkerMessage::Result { data }) => Ok(data),
            Some(WorkerMessage::Error { error }) => Err(WorkerError::AnalyzeFailed { message: error }),
            Some(other) => Err(WorkerError::UnexpectedMessage {
                kind: other.kind().to_string(),
            }),
            None => {
                warn!("⚠️  文档分析超时 ({}秒)", limit.as_secs());
                Err(WorkerError::AnalyzeTimeout {
                    secs: limit.as_secs(),
                })
            }
        }
    }

    /// 发送一条消息并等待回复；超时返回 `Ok(None)`
    async fn round_trip(
        &mut self,
        message: &WorkerMessage,
        limit: Duration,
    ) -> Result<Option<WorkerMessage>, WorkerError> {
        let encoded = message.to_json()?;
        self.requests
            .send(encoded)
            .await
            .map_err(|_| WorkerError::Disconnected)?;

        let replies = &mut self.replies;
        let stale = &mut self.stale_replies;
        let received = timeout(limit, async {
            loop {
                let raw = replies.recv().await?;
                if *stale > 0 {
                    *stale -= 1;
                    debug!("丢弃过期的 worker 回复");
                    continue;
                }
                return Some(raw);
            }
        })
        .await;

        match received {
            Err(_) => {
                self.stale_replies += 1;
                Ok(None)
            }
            Ok(None) => Err(WorkerError::Disconnected),
            Ok(Some(raw)) => Ok(Some(WorkerMessage::from_json(&raw)?)),
        }
    }

    /// 结束会话
    pub fn terminate(self) {
        debug!("终止分析 worker");
        drop(self);
    }
}

impl Drop for AnalyzerSession {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
