pub mod analyzer_worker;
pub mod protocol;

pub use analyzer_worker::{run_worker, AnalyzerSession, WorkerTimeouts};
pub use protocol::{AnalyzeRequest, AnalyzedFile, FileDescriptor, WorkerMessage};
