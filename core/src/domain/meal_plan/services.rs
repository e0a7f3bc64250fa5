use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    common::{GenerationConfig, entities::app_errors::CoreError, services::Service},
    llm::{entities::StructuredRequest, ports::LLMClient},
    meal_plan::{
        backoff::BackoffPolicy,
        entities::{DAYS_PER_PLAN, DayChunk, MacroTotals, MealPlan, StoredMealPlan},
        ports::{DayChunkGenerator, MealPlanRepository, MealPlanService},
        prompts::{DAY_CHUNK_SYSTEM_PROMPT, build_chunk_prompt, build_correction_note},
        schema::get_day_chunk_schema,
        validation::{check_chunk, check_days, find_macro_violations, reconcile_totals},
        value_objects::{
            CHUNK_PARTITION, ChunkRequest, DaySlot, GenerateMealPlanInput,
            GenerateMealPlanOutput, GeneratedMealPlan, GetMealPlanInput, RegeneratePlanDayInput,
            UpdatePlanDayInput,
        },
    },
    nutrition::{entities::FoodProfile, ports::NutritionRepository, services::fetch_favorites},
};

const MAX_DAYS_PER_CHUNK: usize = 2;
const DAY_CHUNK_SCHEMA_NAME: &str = "day_chunk";

/// Chunk generator backed by a structured-output LLM call.
///
/// Each call goes through two retry layers: schema-invalid answers are
/// re-requested up to `output_retries` times with the rejection reason
/// appended, and overload errors restart the whole exchange under
/// [`BackoffPolicy`].
pub struct LlmChunkGenerator<LLM: LLMClient> {
    llm_client: Arc<LLM>,
    model: String,
    config: GenerationConfig,
}

impl<LLM: LLMClient> LlmChunkGenerator<LLM> {
    pub fn new(llm_client: Arc<LLM>, model: String, config: GenerationConfig) -> Self {
        Self {
            llm_client,
            model,
            config,
        }
    }

    async fn generate_validated(
        &self,
        request: &ChunkRequest,
        base_prompt: &str,
    ) -> Result<DayChunk, CoreError> {
        let attempts = self.config.output_retries + 1;
        let mut prompt = base_prompt.to_string();
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            let raw = self
                .llm_client
                .generate_structured(StructuredRequest {
                    model: self.model.clone(),
                    system_prompt: DAY_CHUNK_SYSTEM_PROMPT.to_string(),
                    prompt: prompt.clone(),
                    schema_name: DAY_CHUNK_SCHEMA_NAME.to_string(),
                    schema: get_day_chunk_schema(),
                    max_output_tokens: self.config.max_output_tokens,
                    temperature: self.config.temperature,
                })
                .await?;

            match parse_chunk(raw, &request.slots) {
                Ok(chunk) => return Ok(chunk),
                Err(reason) => {
                    warn!(attempt, attempts, %reason, "day chunk failed validation");
                    prompt = format!("{base_prompt}{}", build_correction_note(&reason));
                    last_reason = reason;
                }
            }
        }

        Err(CoreError::SchemaValidation {
            attempts,
            reason: last_reason,
        })
    }
}

fn parse_chunk(raw: serde_json::Value, slots: &[DaySlot]) -> Result<DayChunk, String> {
    let mut chunk: DayChunk = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    check_chunk(&chunk, slots)?;

    for day in &mut chunk.days {
        if reconcile_totals(day) {
            debug!(date = %day.date, "reported totals differed from food sums, re-derived");
        }
    }

    Ok(chunk)
}

impl<LLM: LLMClient> DayChunkGenerator for LlmChunkGenerator<LLM> {
    async fn generate_chunk(&self, request: ChunkRequest) -> Result<DayChunk, CoreError> {
        if request.slots.is_empty() || request.slots.len() > MAX_DAYS_PER_CHUNK {
            return Err(CoreError::InvalidInput(format!(
                "a chunk covers 1 to {MAX_DAYS_PER_CHUNK} days, got {}",
                request.slots.len()
            )));
        }

        let prompt = build_chunk_prompt(
            &request.targets,
            &request.slots,
            &request.preferences,
            &request.favorite_foods,
        );

        let day_names: Vec<&str> = request.slots.iter().map(|s| s.day_name.as_str()).collect();
        info!("Generating chunk for {:?}", day_names);

        let chunk = BackoffPolicy::from(&self.config)
            .retry(|| self.generate_validated(&request, &prompt))
            .await?;

        info!("Generated chunk with {} day(s)", chunk.days.len());
        Ok(chunk)
    }
}

pub fn ensure_week_start(week_start: NaiveDate) -> Result<(), CoreError> {
    if week_start.weekday() != Weekday::Mon {
        return Err(CoreError::InvalidInput(format!(
            "week_start must be a Monday, {week_start} is a {}",
            week_start.weekday()
        )));
    }
    Ok(())
}

fn slot(week_start: NaiveDate, index: usize) -> Result<DaySlot, CoreError> {
    DaySlot::for_index(week_start, index)
        .ok_or_else(|| CoreError::InvalidInput(format!("date out of range for day {index}")))
}

/// Builds a week by requesting the fixed partition one chunk at a time.
///
/// Chunks are awaited strictly in order; nothing runs concurrently. A day
/// count other than seven is fatal. Macro deviations are logged and reported
/// in the returned value but never block it.
#[instrument(skip(generator, favorite_foods, preferences))]
pub async fn generate_full_plan<G: DayChunkGenerator>(
    generator: &G,
    targets: MacroTotals,
    favorite_foods: &[FoodProfile],
    week_start: NaiveDate,
    preferences: &str,
    tolerance: f64,
) -> Result<GeneratedMealPlan, CoreError> {
    ensure_week_start(week_start)?;
    if !targets.is_non_negative() {
        return Err(CoreError::InvalidInput(
            "targets must be non-negative numbers".to_string(),
        ));
    }

    info!("Generating 7-day meal plan for week {}", week_start);

    let mut days = Vec::with_capacity(DAYS_PER_PLAN);
    for indices in CHUNK_PARTITION {
        let slots = indices
            .iter()
            .map(|i| slot(week_start, *i))
            .collect::<Result<Vec<_>, _>>()?;

        let chunk = generator
            .generate_chunk(ChunkRequest {
                targets,
                favorite_foods: favorite_foods.to_vec(),
                preferences: preferences.to_string(),
                slots,
            })
            .await
            .map_err(|e| {
                error!("Failed to generate chunk for days {:?}: {}", indices, e);
                e
            })?;

        days.extend(chunk.days);
        debug!("Total days generated so far: {}", days.len());
    }

    let plan = MealPlan::new(week_start, targets, days).map_err(|e| {
        error!("Failed to assemble meal plan for week {}: {}", week_start, e);
        e
    })?;

    let violations = find_macro_violations(&plan, tolerance);
    for v in &violations {
        warn!(
            day_index = v.day_index,
            date = %v.date,
            macro_kind = %v.macro_kind,
            target = v.target,
            actual = v.actual,
            kind = ?v.kind,
            "meal plan day outside macro tolerance"
        );
    }

    info!(
        "Generated meal plan for week {} with {} days",
        week_start,
        plan.days.len()
    );

    Ok(GeneratedMealPlan {
        within_tolerance: violations.is_empty(),
        plan,
        violations,
    })
}

/// Same as [`generate_full_plan`] for callers holding a `YYYY-MM-DD` string.
pub async fn generate_meal_plan_structured<G: DayChunkGenerator>(
    generator: &G,
    targets: MacroTotals,
    favorite_foods: &[FoodProfile],
    week_start: &str,
    preferences: &str,
    tolerance: f64,
) -> Result<GeneratedMealPlan, CoreError> {
    let week_start = NaiveDate::parse_from_str(week_start, "%Y-%m-%d").map_err(|e| {
        CoreError::InvalidInput(format!("week_start must be YYYY-MM-DD: {e}"))
    })?;

    generate_full_plan(
        generator,
        targets,
        favorite_foods,
        week_start,
        preferences,
        tolerance,
    )
    .await
}

impl<MP, NR, G, LLM> Service<MP, NR, G, LLM>
where
    MP: MealPlanRepository,
    NR: NutritionRepository,
    G: DayChunkGenerator,
    LLM: LLMClient,
{
    async fn load_plan(
        &self,
        user_id: uuid::Uuid,
        week_start: NaiveDate,
    ) -> Result<StoredMealPlan, CoreError> {
        ensure_week_start(week_start)?;
        self.meal_plan_repository
            .get_plan(user_id, week_start)
            .await?
            .ok_or(CoreError::NotFound)
    }
}

fn check_day_index(day_index: usize) -> Result<(), CoreError> {
    if day_index >= DAYS_PER_PLAN {
        return Err(CoreError::InvalidInput(format!(
            "day_index must be between 0 and {}, got {day_index}",
            DAYS_PER_PLAN - 1
        )));
    }
    Ok(())
}

impl<MP, NR, G, LLM> MealPlanService for Service<MP, NR, G, LLM>
where
    MP: MealPlanRepository,
    NR: NutritionRepository,
    G: DayChunkGenerator,
    LLM: LLMClient,
{
    #[instrument(skip(self, input), fields(user_id = %input.user_id, week_start = %input.week_start))]
    async fn generate_meal_plan(
        &self,
        input: GenerateMealPlanInput,
    ) -> Result<GenerateMealPlanOutput, CoreError> {
        ensure_week_start(input.week_start)?;

        let favorite_foods = match input.favorite_foods {
            Some(foods) => foods,
            None => fetch_favorites(self.nutrition_repository.as_ref(), input.user_id).await,
        };

        let generated = generate_full_plan(
            self.chunk_generator.as_ref(),
            input.targets,
            &favorite_foods,
            input.week_start,
            &input.preferences,
            self.generation.tolerance,
        )
        .await?;

        let stored = self
            .meal_plan_repository
            .save_plan(input.user_id, input.week_start, generated.plan)
            .await?;

        Ok(GenerateMealPlanOutput {
            stored,
            within_tolerance: generated.within_tolerance,
            violations: generated.violations,
        })
    }

    async fn get_meal_plan(&self, input: GetMealPlanInput) -> Result<StoredMealPlan, CoreError> {
        self.load_plan(input.user_id, input.week_start).await
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id, day_index = input.day_index))]
    async fn update_plan_day(&self, input: UpdatePlanDayInput) -> Result<StoredMealPlan, CoreError> {
        check_day_index(input.day_index)?;

        let mut day = input.day;
        check_days(std::slice::from_ref(&day)).map_err(CoreError::InvalidInput)?;
        if reconcile_totals(&mut day) {
            debug!(date = %day.date, "submitted totals differed from food sums, re-derived");
        }

        let stored = self.load_plan(input.user_id, input.week_start).await?;
        let plan = stored.plan.with_day_replaced(input.day_index, day)?;
        // meal ids stay unique across the whole week
        check_days(&plan.days).map_err(CoreError::InvalidInput)?;

        self.meal_plan_repository
            .save_plan(input.user_id, input.week_start, plan)
            .await
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id, day_index = input.day_index))]
    async fn regenerate_plan_day(
        &self,
        input: RegeneratePlanDayInput,
    ) -> Result<StoredMealPlan, CoreError> {
        check_day_index(input.day_index)?;

        let stored = self.load_plan(input.user_id, input.week_start).await?;
        let favorite_foods =
            fetch_favorites(self.nutrition_repository.as_ref(), input.user_id).await;

        let chunk = self
            .chunk_generator
            .generate_chunk(ChunkRequest {
                targets: stored.plan.daily_target,
                favorite_foods,
                preferences: input.preferences,
                slots: vec![slot(input.week_start, input.day_index)?],
            })
            .await?;

        let day = chunk
            .days
            .into_iter()
            .next()
            .ok_or(CoreError::DayCountMismatch {
                expected: 1,
                actual: 0,
            })?;

        let plan = stored.plan.with_day_replaced(input.day_index, day)?;
        self.meal_plan_repository
            .save_plan(input.user_id, input.week_start, plan)
            .await
    }
}
