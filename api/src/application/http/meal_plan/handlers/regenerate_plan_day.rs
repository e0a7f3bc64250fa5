use axum::extract::{Path, State};
use chrono::NaiveDate;
use macrocoach_core::domain::meal_plan::{
    entities::StoredMealPlan, ports::MealPlanService, value_objects::RegeneratePlanDayInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{
    auth::RequiredIdentity,
    http::{
        meal_plan::validators::RegeneratePlanDayValidator,
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
pub struct RegeneratePlanDayResponse {
    pub data: StoredMealPlan,
}

#[utoipa::path(
    post,
    path = "/{week_start}/days/{day_index}/regenerate",
    tag = "meal-plan",
    summary = "Regenerate one day",
    description = "Asks the model for a fresh version of one day against the plan's stored targets and saves it in place.",
    params(
        ("week_start" = String, Path, description = "Monday of the week, YYYY-MM-DD"),
        ("day_index" = usize, Path, description = "0 for Monday through 6 for Sunday"),
    ),
    responses(
        (status = 200, body = RegeneratePlanDayResponse),
        (status = 404, description = "No plan stored for this week"),
        (status = 502, description = "The model did not produce a valid day"),
        (status = 503, description = "The model provider is overloaded"),
    ),
    request_body = RegeneratePlanDayValidator
)]
pub async fn regenerate_plan_day(
    Path((week_start, day_index)): Path<(NaiveDate, usize)>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<RegeneratePlanDayValidator>,
) -> Result<Response<RegeneratePlanDayResponse>, ApiError> {
    let stored = state
        .service
        .regenerate_plan_day(RegeneratePlanDayInput {
            user_id: identity.user_id,
            week_start,
            day_index,
            preferences: payload.food_preferences.unwrap_or_default(),
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(RegeneratePlanDayResponse { data: stored }))
}
