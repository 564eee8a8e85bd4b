pub mod adapter;
pub mod mock;
pub mod types;

pub use adapter::{OpenRouterProvider, OpenRouterProviderBuilder, Provider, ProviderFactory};
pub use mock::{MockProvider, MockResponse, RecordedRequest};
pub use types::{ChatRequest, ChatResponse, CompletionResult, extract_error_reason};

pub use parley_core::{Error, Result};
