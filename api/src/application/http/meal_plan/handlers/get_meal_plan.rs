use axum::extract::{Path, State};
use chrono::NaiveDate;
use macrocoach_core::domain::meal_plan::{
    entities::StoredMealPlan, ports::MealPlanService, value_objects::GetMealPlanInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{
    auth::RequiredIdentity,
    http::server::{
        api_entities::{api_error::ApiError, response::Response},
        app_state::AppState,
    },
};

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GetMealPlanResponse {
    pub data: StoredMealPlan,
}

#[utoipa::path(
    get,
    path = "/{week_start}",
    tag = "meal-plan",
    summary = "Get meal plan",
    description = "Retrieves the stored meal plan for the week starting on the given Monday.",
    params(
        ("week_start" = String, Path, description = "Monday of the week, YYYY-MM-DD"),
    ),
    responses(
        (status = 200, body = GetMealPlanResponse),
        (status = 404, description = "No plan stored for this week"),
    ),
)]
pub async fn get_meal_plan(
    Path(week_start): Path<NaiveDate>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
) -> Result<Response<GetMealPlanResponse>, ApiError> {
    let stored = state
        .service
        .get_meal_plan(GetMealPlanInput {
            user_id: identity.user_id,
            week_start,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(GetMealPlanResponse { data: stored }))
}
