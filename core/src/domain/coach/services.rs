use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::domain::{
    coach::{
        entities::ToolSet,
        ports::CoachService,
        prompts::{COACH_SYSTEM_PROMPT, TOOL_LIMIT_REPLY},
        tools::{ToolContext, execute_tool},
        value_objects::{ChatInput, ChatOutput},
    },
    common::{entities::app_errors::CoreError, services::Service},
    llm::{
        entities::{ChatMessage, ChatRequest, ContentBlock, Role, StopReason, TokenUsage},
        ports::LLMClient,
    },
    meal_plan::ports::{DayChunkGenerator, MealPlanRepository},
    nutrition::ports::NutritionRepository,
};

pub const MAX_TOOL_ROUNDS: usize = 5;
pub const COACH_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Conversational agent over the registered nutrition tools.
#[derive(Debug, Clone)]
pub struct CoachAgent {
    pub tool_set: ToolSet,
    pub model: String,
    pub max_output_tokens: u32,
    pub max_tool_rounds: usize,
}

impl CoachAgent {
    pub fn new(tool_set: ToolSet, model: String) -> Self {
        Self {
            tool_set,
            model,
            max_output_tokens: COACH_MAX_OUTPUT_TOKENS,
            max_tool_rounds: MAX_TOOL_ROUNDS,
        }
    }

    /// Runs one user turn: model call, tool execution, repeat until the model
    /// answers in text or the round limit is hit.
    pub async fn run<LLM: LLMClient, NR: NutritionRepository>(
        &self,
        llm_client: &LLM,
        repository: &NR,
        ctx: ToolContext,
        history: Vec<serde_json::Value>,
        message: String,
    ) -> Result<ChatOutput, CoreError> {
        let mut messages = parse_history(history);
        messages.push(ChatMessage::user_text(message));

        let mut usage = TokenUsage::default();
        let tools = self.tool_set.definitions();

        for round in 0..=self.max_tool_rounds {
            let response = llm_client
                .chat(ChatRequest {
                    model: self.model.clone(),
                    system_prompt: COACH_SYSTEM_PROMPT.to_string(),
                    messages: messages.clone(),
                    tools: tools.clone(),
                    max_output_tokens: self.max_output_tokens,
                })
                .await?;
            usage.add(response.usage);

            let calls: Vec<(String, String, serde_json::Value)> = response
                .message
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();
            let reply = response.message.text();

            if calls.is_empty() {
                messages.push(response.message);
                return Ok(ChatOutput {
                    response: reply,
                    history: messages,
                    usage,
                });
            }

            // Tool calls that will not be answered are left out of the history,
            // a tool_use without its tool_result is rejected on the next turn.
            if response.stop_reason != StopReason::ToolUse {
                warn!(
                    "coach reply stopped ({:?}) with {} pending tool call(s)",
                    response.stop_reason,
                    calls.len()
                );
                let reply = if reply.trim().is_empty() {
                    TOOL_LIMIT_REPLY.to_string()
                } else {
                    reply
                };
                return Ok(close_turn(messages, reply, usage));
            }

            if round == self.max_tool_rounds {
                break;
            }

            messages.push(response.message);

            let mut results = Vec::with_capacity(calls.len());
            for (id, name, input) in calls {
                let content = match self.tool_set.find(&name) {
                    Some(tool) => {
                        info!("coach tool call: {}", name);
                        execute_tool(tool, repository, ctx, &input).await
                    }
                    None => {
                        warn!("model requested unregistered tool {}", name);
                        format!("Error: tool '{name}' is not available")
                    }
                };
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id,
                    name,
                    content,
                });
            }
            messages.push(ChatMessage {
                role: Role::User,
                content: results,
            });
        }

        warn!(
            "coach stopped after {} tool rounds without a final answer",
            self.max_tool_rounds
        );
        Ok(close_turn(messages, TOOL_LIMIT_REPLY.to_string(), usage))
    }
}

/// Ends the turn on a plain assistant text message.
fn close_turn(mut messages: Vec<ChatMessage>, reply: String, usage: TokenUsage) -> ChatOutput {
    messages.push(ChatMessage::assistant_text(reply.clone()));
    ChatOutput {
        response: reply,
        history: messages,
        usage,
    }
}

/// All-or-nothing: one malformed entry drops the whole history.
fn parse_history(history: Vec<serde_json::Value>) -> Vec<ChatMessage> {
    if history.is_empty() {
        return Vec::new();
    }

    match serde_json::from_value::<Vec<ChatMessage>>(serde_json::Value::Array(history)) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("Failed to parse conversation history: {}", e);
            Vec::new()
        }
    }
}

impl<MP, NR, G, LLM> CoachService for Service<MP, NR, G, LLM>
where
    MP: MealPlanRepository,
    NR: NutritionRepository,
    G: DayChunkGenerator,
    LLM: LLMClient,
{
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn chat(&self, input: ChatInput) -> Result<ChatOutput, CoreError> {
        if input.message.trim().is_empty() {
            return Err(CoreError::InvalidInput("message must not be empty".to_string()));
        }

        let ctx = ToolContext {
            user_id: input.user_id,
            today: Utc::now().date_naive(),
        };

        self.coach_agent
            .run(
                self.llm_client.as_ref(),
                self.nutrition_repository.as_ref(),
                ctx,
                input.history,
                input.message,
            )
            .await
    }
}
