use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

pub mod entities;
pub mod services;

#[derive(Clone, Debug)]
pub struct CoachConfig {
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    pub generation: GenerationConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LLMProviderKind {
    Anthropic,
    Gemini,
}

impl TryFrom<&str> for LLMProviderKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "anthropic" => Ok(LLMProviderKind::Anthropic),
            "gemini" => Ok(LLMProviderKind::Gemini),
            other => Err(format!(
                "Unsupported LLM provider: {other}. Supported providers: 'anthropic', 'gemini'"
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    pub provider: LLMProviderKind,
    pub api_key: String,
    /// Model used by the coach agent for conversational turns.
    pub chat_model: String,
    /// Model used for structured meal-plan generation.
    pub meal_plan_model: String,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
}

/// Knobs for the chunked meal-plan pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Extra attempts granted when the model output fails schema validation.
    pub output_retries: u32,
    /// Total attempts (first call included) when the provider is overloaded.
    pub overload_max_attempts: u32,
    pub backoff_base: Duration,
    pub tolerance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 8000,
            temperature: 0.7,
            output_retries: 3,
            overload_max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            tolerance: 0.05,
        }
    }
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, 0);

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}
