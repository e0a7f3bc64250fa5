use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        llm::{
            entities::{
                ChatMessage, ChatRequest, ChatResponse, ContentBlock, Role, StopReason,
                StructuredRequest, TokenUsage, ToolDefinition,
            },
            ports::LLMClient,
        },
    },
    infrastructure::llm::classify_http_error,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicLLMClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    content: Vec<WireContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<WireContent>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl From<&ToolDefinition> for WireTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }
    }
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let content = message
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => WireContent::Text { text: text.clone() },
                ContentBlock::ToolUse { id, name, input } => WireContent::ToolUse {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                },
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => WireContent::ToolResult {
                    tool_use_id: tool_use_id.clone(),
                    content: content.clone(),
                },
            })
            .collect();

        Self {
            role: message.role,
            content,
        }
    }
}

fn into_blocks(content: Vec<WireContent>) -> Vec<ContentBlock> {
    content
        .into_iter()
        .filter_map(|block| match block {
            WireContent::Text { text } => Some(ContentBlock::Text { text }),
            WireContent::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse { id, name, input })
            }
            WireContent::ToolResult { .. } | WireContent::Unsupported => None,
        })
        .collect()
}

fn stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("end_turn") | Some("stop_sequence") => StopReason::EndTurn,
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        _ => StopReason::Other,
    }
}

impl AnthropicLLMClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            error!("Failed to build Anthropic HTTP client: {}", e);
            CoreError::InternalServerError
        })?;

        Ok(Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    async fn call_messages_api(
        &self,
        request: MessagesRequest,
    ) -> Result<MessagesResponse, CoreError> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Anthropic API request failed: {}", e);
                CoreError::ExternalServiceError(format!("LLM API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_http_error("Anthropic", status, &error_text));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse Anthropic response: {}", e);
            CoreError::ExternalServiceError(format!("Failed to parse LLM response: {}", e))
        })
    }
}

impl LLMClient for AnthropicLLMClient {
    /// Forces a single tool call whose input schema is the requested output
    /// schema, then returns that tool input.
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<serde_json::Value, CoreError> {
        let response = self
            .call_messages_api(MessagesRequest {
                model: request.model,
                max_tokens: request.max_output_tokens,
                system: request.system_prompt,
                messages: vec![WireMessage {
                    role: Role::User,
                    content: vec![WireContent::Text {
                        text: request.prompt,
                    }],
                }],
                tools: vec![WireTool {
                    name: request.schema_name.clone(),
                    description: "Return the result in this exact structure.".to_string(),
                    input_schema: request.schema,
                }],
                tool_choice: Some(ToolChoice {
                    kind: "tool",
                    name: request.schema_name,
                }),
                temperature: Some(request.temperature),
            })
            .await?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            warn!("structured output hit the max_tokens limit and may be truncated");
        }

        // A missing tool call surfaces as Null and fails validation upstream.
        Ok(response
            .content
            .into_iter()
            .find_map(|block| match block {
                WireContent::ToolUse { input, .. } => Some(input),
                _ => None,
            })
            .unwrap_or(serde_json::Value::Null))
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoreError> {
        let response = self
            .call_messages_api(MessagesRequest {
                model: request.model,
                max_tokens: request.max_output_tokens,
                system: request.system_prompt,
                messages: request.messages.iter().map(WireMessage::from).collect(),
                tools: request.tools.iter().map(WireTool::from).collect(),
                tool_choice: None,
                temperature: None,
            })
            .await?;

        Ok(ChatResponse {
            stop_reason: stop_reason(response.stop_reason.as_deref()),
            message: ChatMessage {
                role: Role::Assistant,
                content: into_blocks(response.content),
            },
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tool_result_drops_name_on_the_wire() {
        let message = ChatMessage {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: "toolu_1".to_string(),
                name: "fetch_today_status".to_string(),
                content: "ok".to_string(),
            }],
        };

        let wire = serde_json::to_value(WireMessage::from(&message)).unwrap();
        assert_eq!(
            wire,
            json!({
                "role": "user",
                "content": [{ "type": "tool_result", "tool_use_id": "toolu_1", "content": "ok" }]
            })
        );
    }

    #[test]
    fn test_response_parsing_skips_unknown_blocks() {
        let raw = json!({
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "Hi" },
                { "type": "tool_use", "id": "toolu_2", "name": "fetch_weekly_progress", "input": { "days": 7 } }
            ],
            "stop_reason": "tool_use",
            "usage": { "input_tokens": 12, "output_tokens": 3 }
        });

        let response: MessagesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(stop_reason(response.stop_reason.as_deref()), StopReason::ToolUse);

        let blocks = into_blocks(response.content);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[1], ContentBlock::ToolUse { name, .. } if name == "fetch_weekly_progress"));
    }
}
