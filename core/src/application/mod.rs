use std::sync::Arc;

use tracing::info;

use crate::{
    domain::{
        coach::{entities::{CoachTool, ToolSet}, services::CoachAgent},
        common::{CoachConfig, services::Service},
        meal_plan::services::LlmChunkGenerator,
    },
    infrastructure::{
        db::postgres::{Postgres, PostgresConfig},
        llm::LlmProvider,
        meal_plan::PostgresMealPlanRepository,
        nutrition::PostgresNutritionRepository,
    },
};

pub type MacroCoachService = Service<
    PostgresMealPlanRepository,
    PostgresNutritionRepository,
    LlmChunkGenerator<LlmProvider>,
    LlmProvider,
>;

pub async fn create_service(config: CoachConfig) -> Result<MacroCoachService, anyhow::Error> {
    let postgres = Postgres::new(PostgresConfig::from(&config.database)).await?;
    postgres.migrate().await?;

    let llm_client = Arc::new(LlmProvider::from_config(&config.llm)?);
    info!("using {:?} as LLM provider", config.llm.provider);

    let chunk_generator = LlmChunkGenerator::new(
        Arc::clone(&llm_client),
        config.llm.meal_plan_model.clone(),
        config.generation.clone(),
    );

    let coach_agent = CoachAgent::new(
        ToolSet::new(vec![
            CoachTool::TodayStatus,
            CoachTool::WeeklyProgress,
            CoachTool::PatternAnalysis,
        ]),
        config.llm.chat_model.clone(),
    );

    Ok(Service::new(
        PostgresMealPlanRepository::new(postgres.get_db()),
        PostgresNutritionRepository::new(postgres.get_db()),
        chunk_generator,
        llm_client,
        coach_agent,
        config.generation,
    ))
}
