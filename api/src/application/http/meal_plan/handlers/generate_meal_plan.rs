use axum::extract::State;
use macrocoach_core::domain::meal_plan::{
    entities::StoredMealPlan,
    ports::MealPlanService,
    value_objects::{GenerateMealPlanInput, MacroViolation},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{
    auth::RequiredIdentity,
    http::{
        meal_plan::validators::GenerateMealPlanValidator,
        server::{
            api_entities::{
                api_error::{ApiError, ValidateJson},
                response::Response,
            },
            app_state::AppState,
        },
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GenerateMealPlanResponse {
    pub data: StoredMealPlan,
    pub within_tolerance: bool,
    pub violations: Vec<MacroViolation>,
}

#[utoipa::path(
    post,
    path = "",
    tag = "meal-plan",
    summary = "Generate meal plan",
    description = "Generates a seven-day meal plan in four sequential chunks and stores it for the given week. Days outside the macro tolerance are reported in `violations`.",
    responses(
        (status = 201, body = GenerateMealPlanResponse),
        (status = 400, description = "week_start is not a Monday"),
        (status = 502, description = "The model did not produce a valid plan"),
        (status = 503, description = "The model provider is overloaded"),
    ),
    request_body = GenerateMealPlanValidator
)]
pub async fn generate_meal_plan(
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<GenerateMealPlanValidator>,
) -> Result<Response<GenerateMealPlanResponse>, ApiError> {
    let output = state
        .service
        .generate_meal_plan(GenerateMealPlanInput {
            user_id: identity.user_id,
            week_start: payload.week_start,
            targets: payload.targets.into(),
            favorite_foods: payload.favorite_foods,
            preferences: payload.food_preferences.unwrap_or_default(),
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::Created(GenerateMealPlanResponse {
        data: output.stored,
        within_tolerance: output.within_tolerance,
        violations: output.violations,
    }))
}
