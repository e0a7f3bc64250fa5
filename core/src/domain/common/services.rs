use std::sync::Arc;

use crate::domain::{
    coach::services::CoachAgent,
    common::GenerationConfig,
    llm::ports::LLMClient,
    meal_plan::ports::{DayChunkGenerator, MealPlanRepository},
    nutrition::ports::NutritionRepository,
};

/// Application service implementing the coach and meal-plan use cases over
/// its injected adapters.
pub struct Service<MP, NR, G, LLM>
where
    MP: MealPlanRepository,
    NR: NutritionRepository,
    G: DayChunkGenerator,
    LLM: LLMClient,
{
    pub(crate) meal_plan_repository: Arc<MP>,
    pub(crate) nutrition_repository: Arc<NR>,
    pub(crate) chunk_generator: Arc<G>,
    pub(crate) llm_client: Arc<LLM>,
    pub(crate) coach_agent: CoachAgent,
    pub(crate) generation: GenerationConfig,
}

impl<MP, NR, G, LLM> Service<MP, NR, G, LLM>
where
    MP: MealPlanRepository,
    NR: NutritionRepository,
    G: DayChunkGenerator,
    LLM: LLMClient,
{
    pub fn new(
        meal_plan_repository: MP,
        nutrition_repository: NR,
        chunk_generator: G,
        llm_client: Arc<LLM>,
        coach_agent: CoachAgent,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            meal_plan_repository: Arc::new(meal_plan_repository),
            nutrition_repository: Arc::new(nutrition_repository),
            chunk_generator: Arc::new(chunk_generator),
            llm_client,
            coach_agent,
            generation,
        }
    }
}

impl<MP, NR, G, LLM> Clone for Service<MP, NR, G, LLM>
where
    MP: MealPlanRepository,
    NR: NutritionRepository,
    G: DayChunkGenerator,
    LLM: LLMClient,
{
    fn clone(&self) -> Self {
        Self {
            meal_plan_repository: Arc::clone(&self.meal_plan_repository),
            nutrition_repository: Arc::clone(&self.nutrition_repository),
            chunk_generator: Arc::clone(&self.chunk_generator),
            llm_client: Arc::clone(&self.llm_client),
            coach_agent: self.coach_agent.clone(),
            generation: self.generation.clone(),
        }
    }
}
