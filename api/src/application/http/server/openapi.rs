use utoipa::OpenApi;

use crate::application::http::{
    coach::router::CoachApiDoc,
    health::__path_health,
    meal_plan::router::MealPlanApiDoc,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MacroCoach API",
        description = "Nutrition coaching and weekly meal-plan generation"
    ),
    paths(health),
    nest(
        (path = "/api/meal-plans", api = MealPlanApiDoc),
        (path = "/api/chat", api = CoachApiDoc),
    ),
    components(schemas(
        crate::application::http::server::api_entities::api_error::ApiErrorResponse
    ))
)]
pub struct ApiDoc;
