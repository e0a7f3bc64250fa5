use std::time::Duration;

use clap::{Args as ClapArgs, Parser};
use macrocoach_core::domain::common::{
    CoachConfig, DatabaseConfig, GenerationConfig, LLMConfig, LLMProviderKind,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "macrocoach-api", version, about = "MacroCoach API server")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub db: DatabaseArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub auth: AuthArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ServerArgs {
    #[arg(long = "server-host", env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long = "server-port", env = "PORT", default_value_t = 3333)]
    pub port: u16,

    /// Prefix applied to every route, e.g. `/v1`.
    #[arg(long = "server-root-path", env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct DatabaseArgs {
    #[arg(long = "database-host", env = "DATABASE_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long = "database-port", env = "DATABASE_PORT", default_value_t = 5432)]
    pub port: u16,

    #[arg(long = "database-user", env = "DATABASE_USER", default_value = "postgres")]
    pub user: String,

    #[arg(
        long = "database-password",
        env = "DATABASE_PASSWORD",
        default_value = "postgres"
    )]
    pub password: String,

    #[arg(long = "database-name", env = "DATABASE_NAME", default_value = "macrocoach")]
    pub name: String,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LlmArgs {
    /// `anthropic` or `gemini`.
    #[arg(long = "llm-provider", env = "LLM_PROVIDER", default_value = "anthropic")]
    pub provider: String,

    #[arg(long = "llm-api-key", env = "LLM_API_KEY", default_value = "")]
    pub api_key: String,

    #[arg(
        long = "llm-chat-model",
        env = "LLM_CHOICE",
        default_value = "claude-haiku-4-5-20251001"
    )]
    pub chat_model: String,

    #[arg(
        long = "llm-meal-plan-model",
        env = "MEAL_PLAN_LLM_CHOICE",
        default_value = "claude-sonnet-4-5-20250929"
    )]
    pub meal_plan_model: String,

    #[arg(long = "llm-base-url", env = "LLM_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long = "llm-timeout-secs", env = "LLM_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    #[arg(long = "llm-max-output-tokens", env = "LLM_MAX_OUTPUT_TOKENS", default_value_t = 8000)]
    pub max_output_tokens: u32,

    #[arg(long = "llm-temperature", env = "LLM_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    #[arg(long = "llm-output-retries", env = "LLM_OUTPUT_RETRIES", default_value_t = 3)]
    pub output_retries: u32,

    #[arg(long = "llm-overload-attempts", env = "LLM_OVERLOAD_ATTEMPTS", default_value_t = 3)]
    pub overload_attempts: u32,

    #[arg(long = "llm-backoff-base-secs", env = "LLM_BACKOFF_BASE_SECS", default_value_t = 2)]
    pub backoff_base_secs: u64,

    #[arg(long = "macro-tolerance", env = "MACRO_TOLERANCE", default_value_t = 0.05)]
    pub tolerance: f64,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct AuthArgs {
    /// HS256 secret used to verify bearer tokens.
    #[arg(long = "jwt-secret", env = "JWT_SECRET", default_value = "")]
    pub jwt_secret: String,

    #[arg(long = "jwt-audience", env = "JWT_AUDIENCE")]
    pub jwt_audience: Option<String>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LogArgs {
    #[arg(long = "log-filter", env = "LOG_FILTER", default_value = "info")]
    pub filter: String,

    #[arg(long = "log-json", env = "LOG_JSON", default_value_t = false)]
    pub json: bool,
}

impl TryFrom<Args> for CoachConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let provider = LLMProviderKind::try_from(args.llm.provider.as_str())
            .map_err(anyhow::Error::msg)?;

        if args.llm.api_key.trim().is_empty() {
            anyhow::bail!("LLM_API_KEY must be set");
        }

        Ok(CoachConfig {
            database: DatabaseConfig {
                host: args.db.host,
                port: args.db.port,
                username: args.db.user,
                password: args.db.password,
                name: args.db.name,
            },
            llm: LLMConfig {
                provider,
                api_key: args.llm.api_key,
                chat_model: args.llm.chat_model,
                meal_plan_model: args.llm.meal_plan_model,
                base_url: args.llm.base_url,
                request_timeout: Duration::from_secs(args.llm.timeout_secs),
            },
            generation: GenerationConfig {
                max_output_tokens: args.llm.max_output_tokens,
                temperature: args.llm.temperature,
                output_retries: args.llm.output_retries,
                overload_max_attempts: args.llm.overload_attempts,
                backoff_base: Duration::from_secs(args.llm.backoff_base_secs),
                tolerance: args.llm.tolerance,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["macrocoach-api"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_build_generation_config() {
        let config = CoachConfig::try_from(parse(&["--llm-api-key", "sk-test"])).unwrap();

        assert_eq!(config.llm.provider, LLMProviderKind::Anthropic);
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = CoachConfig::try_from(parse(&[
            "--llm-api-key",
            "sk-test",
            "--llm-provider",
            "openai",
        ]));

        assert!(result.unwrap_err().to_string().contains("Unsupported LLM provider"));
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        assert!(CoachConfig::try_from(parse(&["--llm-api-key", " "])).is_err());
    }

    #[test]
    fn test_allowed_origins_split_on_comma() {
        let args = parse(&["--allowed-origins", "http://a.test,http://b.test"]);
        assert_eq!(args.server.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }
}
