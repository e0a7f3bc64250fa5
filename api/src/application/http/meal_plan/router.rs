use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use utoipa::OpenApi;

use super::handlers::{
    generate_meal_plan::{__path_generate_meal_plan, generate_meal_plan},
    get_meal_plan::{__path_get_meal_plan, get_meal_plan},
    regenerate_plan_day::{__path_regenerate_plan_day, regenerate_plan_day},
    update_plan_day::{__path_update_plan_day, update_plan_day},
};
use crate::application::{auth::auth, http::server::app_state::AppState};

#[derive(OpenApi)]
#[openapi(paths(generate_meal_plan, get_meal_plan, update_plan_day, regenerate_plan_day))]
pub struct MealPlanApiDoc;

pub fn meal_plan_routes(state: AppState) -> Router<AppState> {
    let root_path = &state.args.server.root_path;

    Router::new()
        .route(
            &format!("{root_path}/api/meal-plans"),
            post(generate_meal_plan),
        )
        .route(
            &format!("{root_path}/api/meal-plans/{{week_start}}"),
            get(get_meal_plan),
        )
        .route(
            &format!("{root_path}/api/meal-plans/{{week_start}}/days/{{day_index}}"),
            put(update_plan_day),
        )
        .route(
            &format!("{root_path}/api/meal-plans/{{week_start}}/days/{{day_index}}/regenerate"),
            post(regenerate_plan_day),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth))
}
