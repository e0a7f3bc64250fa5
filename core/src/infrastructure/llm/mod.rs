use reqwest::StatusCode;
use tracing::error;

use crate::domain::{
    common::{
        LLMConfig, LLMProviderKind,
        entities::app_errors::{CoreError, is_overload_message},
    },
    llm::{
        entities::{ChatRequest, ChatResponse, StructuredRequest},
        ports::LLMClient,
    },
};

pub mod anthropic_client;
pub mod gemini_client;

pub use anthropic_client::AnthropicLLMClient;
pub use gemini_client::GeminiLLMClient;

/// Maps a non-success provider response to the error taxonomy. Capacity
/// problems become `ProviderOverloaded` so the chunk generator can back off.
pub(crate) fn classify_http_error(provider: &str, status: StatusCode, body: &str) -> CoreError {
    error!("{} API error: {} - {}", provider, status, body);

    let message = format!("{provider} API returned error: {status} - {body}");
    if status.as_u16() == 529
        || status == StatusCode::SERVICE_UNAVAILABLE
        || is_overload_message(body)
    {
        CoreError::ProviderOverloaded(message)
    } else {
        CoreError::ExternalServiceError(message)
    }
}

/// The configured LLM backend.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Anthropic(AnthropicLLMClient),
    Gemini(GeminiLLMClient),
}

impl LlmProvider {
    pub fn from_config(config: &LLMConfig) -> Result<Self, CoreError> {
        if config.api_key.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "LLM API key cannot be empty".to_string(),
            ));
        }

        Ok(match config.provider {
            LLMProviderKind::Anthropic => LlmProvider::Anthropic(AnthropicLLMClient::new(
                config.api_key.clone(),
                config.base_url.clone(),
                config.request_timeout,
            )?),
            LLMProviderKind::Gemini => LlmProvider::Gemini(GeminiLLMClient::new(
                config.api_key.clone(),
                config.base_url.clone(),
                config.request_timeout,
            )?),
        })
    }
}

impl LLMClient for LlmProvider {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<serde_json::Value, CoreError> {
        match self {
            LlmProvider::Anthropic(client) => client.generate_structured(request).await,
            LlmProvider::Gemini(client) => client.generate_structured(request).await,
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoreError> {
        match self {
            LlmProvider::Anthropic(client) => client.chat(request).await,
            LlmProvider::Gemini(client) => client.chat(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_529_is_overload() {
        let err = classify_http_error("Anthropic", StatusCode::from_u16(529).unwrap(), "{}");
        assert!(matches!(err, CoreError::ProviderOverloaded(_)));
    }

    #[test]
    fn test_overloaded_body_is_overload() {
        let err = classify_http_error(
            "Gemini",
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"The model is overloaded."}}"#,
        );
        assert!(err.is_overload());
    }

    #[test]
    fn test_client_errors_are_not_overload() {
        let err = classify_http_error("Anthropic", StatusCode::UNAUTHORIZED, "invalid x-api-key");
        assert!(matches!(err, CoreError::ExternalServiceError(_)));
        assert!(!err.is_overload());
    }
}
