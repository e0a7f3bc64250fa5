use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChatValidator {
    #[validate(length(min = 1, max = 1000, message = "message must be 1 to 1000 characters"))]
    pub message: String,

    /// History returned by the previous turn, sent back unchanged.
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub conversation_history: Vec<serde_json::Value>,
}
