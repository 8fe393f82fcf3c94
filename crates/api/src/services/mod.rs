//! Business services for the API layer.

pub mod fortune;
pub mod llm;

pub use fortune::FortuneService;
pub use llm::{HttpLlmClient, LlmClient, LlmError};
