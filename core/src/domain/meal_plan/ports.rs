use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal_plan::{
        entities::{DayChunk, MealPlan, StoredMealPlan},
        value_objects::{
            ChunkRequest, GenerateMealPlanInput, GenerateMealPlanOutput, GetMealPlanInput,
            RegeneratePlanDayInput, UpdatePlanDayInput,
        },
    },
};

/// Produces a validated chunk covering exactly the requested slots, in order.
#[cfg_attr(test, mockall::automock)]
pub trait DayChunkGenerator: Send + Sync {
    fn generate_chunk(
        &self,
        request: ChunkRequest,
    ) -> impl Future<Output = Result<DayChunk, CoreError>> + Send;
}

#[cfg_attr(test, mockall::automock)]
pub trait MealPlanRepository: Send + Sync {
    /// Inserts or replaces the plan stored for `(user_id, week_start)`.
    fn save_plan(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
        plan: MealPlan,
    ) -> impl Future<Output = Result<StoredMealPlan, CoreError>> + Send;

    fn get_plan(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> impl Future<Output = Result<Option<StoredMealPlan>, CoreError>> + Send;
}

pub trait MealPlanService: Send + Sync {
    fn generate_meal_plan(
        &self,
        input: GenerateMealPlanInput,
    ) -> impl Future<Output = Result<GenerateMealPlanOutput, CoreError>> + Send;

    fn get_meal_plan(
        &self,
        input: GetMealPlanInput,
    ) -> impl Future<Output = Result<StoredMealPlan, CoreError>> + Send;

    fn update_plan_day(
        &self,
        input: UpdatePlanDayInput,
    ) -> impl Future<Output = Result<StoredMealPlan, CoreError>> + Send;

    fn regenerate_plan_day(
        &self,
        input: RegeneratePlanDayInput,
    ) -> impl Future<Output = Result<StoredMealPlan, CoreError>> + Send;
}
