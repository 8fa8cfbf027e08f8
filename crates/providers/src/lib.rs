pub mod adapter;
pub mod directives;
pub mod openai_compat;
pub mod traits;
pub(crate) mod sse;
pub(crate) mod util;

// Re-exports for convenience.
pub use adapter::{CallOptions, GenerationDefaults, ProviderAdapter};
pub use openai_compat::OpenAiCompatProvider;
pub use traits::{ChatRequest, ChatResponse, LlmProvider};
