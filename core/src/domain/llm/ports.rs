use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    llm::entities::{ChatRequest, ChatResponse, StructuredRequest},
};

/// LLM Client trait for calling AI models
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    /// Returns the raw JSON object produced by the model. Overload conditions
    /// must be reported as `CoreError::ProviderOverloaded`.
    fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send;

    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, CoreError>> + Send;
}
