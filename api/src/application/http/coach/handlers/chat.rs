use axum::extract::State;
use macrocoach_core::domain::{
    coach::{ports::CoachService, value_objects::ChatInput},
    llm::entities::ChatMessage,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{
    auth::RequiredIdentity,
    http::{
        coach::validators::ChatValidator,
        server::{
            api_entities::{
                api_error::{ApiError, ValidateJson},
                response::Response,
            },
            app_state::AppState,
        },
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UsageResponse {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    #[schema(value_type = Vec<Object>)]
    pub conversation_history: Vec<ChatMessage>,
    pub usage: UsageResponse,
}

#[utoipa::path(
    post,
    path = "",
    tag = "coach",
    summary = "Chat with the coach",
    description = "Runs one conversational turn. The coach may read today's status, recent progress and eating patterns before answering.",
    responses(
        (status = 200, body = ChatResponse),
        (status = 502, description = "The model provider failed"),
    ),
    request_body = ChatValidator
)]
pub async fn chat(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<ChatValidator>,
) -> Result<Response<ChatResponse>, ApiError> {
    let output = state
        .service
        .chat(ChatInput {
            user_id: identity.user_id,
            message: payload.message,
            history: payload.conversation_history,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(ChatResponse {
        response: output.response,
        conversation_history: output.history,
        usage: UsageResponse {
            input_tokens: output.usage.input_tokens,
            output_tokens: output.usage.output_tokens,
            total_tokens: output.usage.total_tokens(),
        },
    }))
}
