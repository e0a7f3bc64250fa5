use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
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

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Schema keywords the Gemini OpenAPI subset understands. Everything else is
/// stripped before sending.
const SUPPORTED_SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "items",
    "properties",
    "required",
    "minItems",
    "maxItems",
    "minimum",
    "maximum",
];

#[derive(Debug, Clone)]
pub struct GeminiLLMClient {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "functionCall")]
    function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "functionResponse")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Default, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

fn text_part(text: String) -> Part {
    Part {
        text: Some(text),
        function_call: None,
        function_response: None,
    }
}

/// Recursively keeps only the keywords Gemini accepts.
fn sanitize_schema(schema: &Value) -> Value {
    let Some(object) = schema.as_object() else {
        return schema.clone();
    };

    let mut cleaned = Map::new();
    for (key, value) in object {
        if !SUPPORTED_SCHEMA_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            "items" => sanitize_schema(value),
            "properties" => match value.as_object() {
                Some(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, prop)| (name.clone(), sanitize_schema(prop)))
                        .collect(),
                ),
                None => value.clone(),
            },
            _ => value.clone(),
        };
        cleaned.insert(key.clone(), value);
    }
    Value::Object(cleaned)
}

/// Gemini rejects an object schema without properties, so parameterless
/// tools omit `parameters` entirely.
fn function_declaration(tool: &ToolDefinition) -> FunctionDeclaration {
    let has_properties = tool
        .input_schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|props| !props.is_empty());

    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: has_properties.then(|| sanitize_schema(&tool.input_schema)),
    }
}

fn to_content(message: &ChatMessage) -> Content {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
    };

    let parts = message
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text_part(text.clone()),
            ContentBlock::ToolUse { name, input, .. } => Part {
                text: None,
                function_call: Some(FunctionCall {
                    name: name.clone(),
                    args: input.clone(),
                }),
                function_response: None,
            },
            ContentBlock::ToolResult { name, content, .. } => Part {
                text: None,
                function_call: None,
                function_response: Some(FunctionResponse {
                    name: name.clone(),
                    response: json!({ "content": content }),
                }),
            },
        })
        .collect();

    Content {
        role: Some(role.to_string()),
        parts,
    }
}

/// Gemini does not issue call ids, so synthetic ones are assigned in order.
fn into_blocks(parts: Vec<Part>) -> Vec<ContentBlock> {
    let mut blocks = Vec::with_capacity(parts.len());
    let mut call_index = 0;
    for part in parts {
        if let Some(call) = part.function_call {
            blocks.push(ContentBlock::ToolUse {
                id: format!("call_{call_index}"),
                name: call.name,
                input: call.args,
            });
            call_index += 1;
        } else if let Some(text) = part.text {
            blocks.push(ContentBlock::Text { text });
        }
    }
    blocks
}

impl GeminiLLMClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            error!("Failed to build Gemini HTTP client: {}", e);
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

    async fn call_gemini_api(
        &self,
        model: &str,
        request: GeminiRequest,
    ) -> Result<GeminiResponse, CoreError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                CoreError::ExternalServiceError(format!("LLM API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_http_error("Gemini", status, &error_text));
        }

        response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            CoreError::ExternalServiceError(format!("Failed to parse LLM response: {}", e))
        })
    }
}

fn first_candidate(response: GeminiResponse) -> Result<(Candidate, TokenUsage), CoreError> {
    let usage = TokenUsage {
        input_tokens: response.usage_metadata.prompt_token_count,
        output_tokens: response.usage_metadata.candidates_token_count,
    };

    response
        .candidates
        .into_iter()
        .next()
        .map(|c| (c, usage))
        .ok_or_else(|| CoreError::ExternalServiceError("No response from LLM".to_string()))
}

impl LLMClient for GeminiLLMClient {
    async fn generate_structured(&self, request: StructuredRequest) -> Result<Value, CoreError> {
        let gemini_request = GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![text_part(request.prompt)],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![text_part(request.system_prompt)],
            }),
            tools: Vec::new(),
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(sanitize_schema(&request.schema)),
                max_output_tokens: request.max_output_tokens,
                temperature: Some(request.temperature),
            },
        };

        let response = self.call_gemini_api(&request.model, gemini_request).await?;
        let (candidate, _) = first_candidate(response)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        // Unparseable text surfaces as Null and fails validation upstream.
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Gemini structured output is not valid JSON: {}", e);
            Value::Null
        }))
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoreError> {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![Tool {
                function_declarations: request.tools.iter().map(function_declaration).collect(),
            }]
        };

        let gemini_request = GeminiRequest {
            contents: request.messages.iter().map(to_content).collect(),
            system_instruction: Some(Content {
                role: None,
                parts: vec![text_part(request.system_prompt)],
            }),
            tools,
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                ..Default::default()
            },
        };

        let response = self.call_gemini_api(&request.model, gemini_request).await?;
        let (candidate, usage) = first_candidate(response)?;

        let content = into_blocks(candidate.content.map(|c| c.parts).unwrap_or_default());
        let has_calls = content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }));

        let stop_reason = if has_calls {
            StopReason::ToolUse
        } else {
            match candidate.finish_reason.as_deref() {
                Some("STOP") => StopReason::EndTurn,
                Some("MAX_TOKENS") => StopReason::MaxTokens,
                _ => StopReason::Other,
            }
        };

        Ok(ChatResponse {
            message: ChatMessage {
                role: Role::Assistant,
                content,
            },
            stop_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_schema_drops_unsupported_keywords() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "quantity_g": { "type": "number", "exclusiveMinimum": 0 },
                "name": { "type": "string", "minLength": 1 },
                "foods": { "type": "array", "minItems": 1, "items": { "type": "object", "$id": "x" } }
            },
            "required": ["name"]
        });

        assert_eq!(
            sanitize_schema(&schema),
            json!({
                "type": "object",
                "properties": {
                    "quantity_g": { "type": "number" },
                    "name": { "type": "string" },
                    "foods": { "type": "array", "minItems": 1, "items": { "type": "object" } }
                },
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_parameterless_tool_omits_parameters() {
        let tool = ToolDefinition {
            name: "fetch_today_status".to_string(),
            description: "today".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        };

        let declaration = serde_json::to_value(function_declaration(&tool)).unwrap();
        assert!(declaration.get("parameters").is_none());
    }

    #[test]
    fn test_function_calls_get_synthetic_ids() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "functionCall": { "name": "fetch_today_status", "args": {} } },
                        { "functionCall": { "name": "fetch_weekly_progress", "args": { "days": 7 } } }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 30, "candidatesTokenCount": 4 }
        });

        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let (candidate, usage) = first_candidate(response).unwrap();
        let blocks = into_blocks(candidate.content.unwrap().parts);

        assert_eq!(usage.total_tokens(), 34);
        assert!(matches!(&blocks[0], ContentBlock::ToolUse { id, .. } if id == "call_0"));
        assert!(matches!(&blocks[1], ContentBlock::ToolUse { id, .. } if id == "call_1"));
    }

    #[test]
    fn test_tool_result_becomes_function_response() {
        let message = ChatMessage {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: "call_0".to_string(),
                name: "fetch_today_status".to_string(),
                content: "No data logged".to_string(),
            }],
        };

        let wire = serde_json::to_value(to_content(&message)).unwrap();
        assert_eq!(
            wire["parts"][0]["function_response"],
            json!({ "name": "fetch_today_status", "response": { "content": "No data logged" } })
        );
    }
}
