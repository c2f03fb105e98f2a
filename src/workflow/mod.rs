pub mod file_ctx;
pub mod format_flow;

pub use file_ctx::FileCtx;
pub use format_flow::{FlowResult, FormatFlow};
