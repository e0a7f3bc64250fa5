use axum::extract::{Path, State};
use chrono::NaiveDate;
use macrocoach_core::domain::meal_plan::{
    entities::StoredMealPlan, ports::MealPlanService, value_objects::UpdatePlanDayInput,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{
    auth::RequiredIdentity,
    http::{
        meal_plan::validators::UpdatePlanDayValidator,
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
pub struct UpdatePlanDayResponse {
    pub data: StoredMealPlan,
}

#[utoipa::path(
    put,
    path = "/{week_start}/days/{day_index}",
    tag = "meal-plan",
    summary = "Replace one day",
    description = "Replaces a single day of a stored plan. The new day must keep the date and day name of the slot it replaces; totals are recomputed from its foods.",
    params(
        ("week_start" = String, Path, description = "Monday of the week, YYYY-MM-DD"),
        ("day_index" = usize, Path, description = "0 for Monday through 6 for Sunday"),
    ),
    responses(
        (status = 200, body = UpdatePlanDayResponse),
        (status = 400, description = "Bad day index or mismatched date"),
        (status = 404, description = "No plan stored for this week"),
    ),
    request_body = UpdatePlanDayValidator
)]
pub async fn update_plan_day(
    Path((week_start, day_index)): Path<(NaiveDate, usize)>,
    State(state): State<AppState>,
    RequiredIdentity(identity): RequiredIdentity,
    ValidateJson(payload): ValidateJson<UpdatePlanDayValidator>,
) -> Result<Response<UpdatePlanDayResponse>, ApiError> {
    let stored = state
        .service
        .update_plan_day(UpdatePlanDayInput {
            user_id: identity.user_id,
            week_start,
            day_index,
            day: payload.day,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(UpdatePlanDayResponse { data: stored }))
}
