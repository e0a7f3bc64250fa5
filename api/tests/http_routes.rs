use std::{sync::Arc, time::Duration};

use axum::{Router, http::StatusCode};
use axum_test::TestServer;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use jsonwebtoken::{EncodingKey, Header, encode};
use macrocoach_api::{
    application::{
        auth::JwtClaim,
        http::{
            coach::router::coach_routes,
            health::health_routes,
            meal_plan::router::meal_plan_routes,
            server::app_state::AppState,
        },
    },
    args::Args,
};
use macrocoach_core::{
    domain::{
        coach::{
            entities::{CoachTool, ToolSet},
            services::CoachAgent,
        },
        common::{GenerationConfig, LLMConfig, LLMProviderKind, services::Service},
        meal_plan::{
            entities::{Food, MacroTotals, Meal, MealPlan, MealPlanDay, MealType},
            services::LlmChunkGenerator,
            value_objects::DaySlot,
        },
    },
    entity::{meal_plans, users},
    infrastructure::{
        llm::LlmProvider, meal_plan::PostgresMealPlanRepository,
        nutrition::PostgresNutritionRepository, user::repository::PostgresUserRepository,
    },
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn args() -> Arc<Args> {
    Arc::new(Args::parse_from([
        "macrocoach-api",
        "--jwt-secret",
        SECRET,
        "--llm-api-key",
        "test-key",
    ]))
}

fn app(db: DatabaseConnection) -> TestServer {
    let llm = Arc::new(
        LlmProvider::from_config(&LLMConfig {
            provider: LLMProviderKind::Anthropic,
            api_key: "test-key".to_string(),
            chat_model: "chat-model".to_string(),
            meal_plan_model: "plan-model".to_string(),
            base_url: Some("http://127.0.0.1:9".to_string()),
            request_timeout: Duration::from_secs(1),
        })
        .unwrap(),
    );

    let service = Service::new(
        PostgresMealPlanRepository::new(db.clone()),
        PostgresNutritionRepository::new(db.clone()),
        LlmChunkGenerator::new(llm.clone(), "plan-model".to_string(), GenerationConfig::default()),
        llm,
        CoachAgent::new(ToolSet::new(CoachTool::ALL.to_vec()), "chat-model".to_string()),
        GenerationConfig::default(),
    );

    let state = AppState::new(args(), service, PostgresUserRepository::new(db));
    let router: Router = Router::new()
        .merge(meal_plan_routes(state.clone()))
        .merge(coach_routes(state.clone()))
        .merge(health_routes(""))
        .with_state(state);

    TestServer::new(router).unwrap()
}

fn token_for(auth_id: Uuid, secret: &str) -> String {
    encode(
        &Header::default(),
        &JwtClaim {
            sub: auth_id,
            exp: Utc::now().timestamp() + 3600,
            aud: None,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn user_row(auth_id: Uuid, user_id: Uuid) -> users::Model {
    users::Model {
        id: user_id,
        auth_id,
        created_at: Utc::now().fixed_offset(),
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
}

fn day(index: usize) -> MealPlanDay {
    let slot = DaySlot::for_index(monday(), index).unwrap();
    let totals = MacroTotals::new(1960.0, 146.0, 195.0, 65.0);
    MealPlanDay {
        date: slot.date,
        day_name: slot.day_name,
        meals: vec![Meal {
            id: format!("meal_{}_001", slot.day_name.as_str().to_lowercase()),
            name: "Salmon bowl".to_string(),
            meal_type: MealType::Lunch,
            foods: vec![Food {
                name: "Salmon".to_string(),
                quantity_g: 400.0,
                calories: totals.calories,
                protein: totals.protein,
                carbs: totals.carbs,
                fat: totals.fat,
            }],
            totals,
        }],
        daily_totals: totals,
    }
}

fn plan_row(user_id: Uuid) -> meal_plans::Model {
    let plan = MealPlan::new(
        monday(),
        MacroTotals::new(2000.0, 150.0, 200.0, 67.0),
        (0..7).map(day).collect(),
    )
    .unwrap();

    meal_plans::Model {
        id: Uuid::new_v4(),
        user_id,
        week_start_date: monday(),
        plan_data: serde_json::to_value(plan).unwrap(),
        created_at: Utc::now().fixed_offset(),
        updated_at: Utc::now().fixed_offset(),
    }
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn health_needs_no_auth() {
    let server = app(empty_db());

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "macrocoach-api");
}

#[tokio::test]
async fn chat_without_token_is_unauthorized() {
    let server = app(empty_db());

    let response = server
        .post("/api/chat")
        .json(&json!({ "message": "How am I doing?" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "E_UNAUTHORIZED");
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let server = app(empty_db());

    let response = server
        .post("/api/chat")
        .authorization_bearer(token_for(Uuid::new_v4(), "someone-else"))
        .json(&json!({ "message": "hi" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid signature");
}

#[tokio::test]
async fn unknown_user_profile_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let server = app(db);

    let response = server
        .post("/api/chat")
        .authorization_bearer(token_for(Uuid::new_v4(), SECRET))
        .json(&json!({ "message": "hi" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_chat_message_fails_validation() {
    let auth_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(auth_id, Uuid::new_v4())]])
        .into_connection();
    let server = app(db);

    let response = server
        .post("/api/chat")
        .authorization_bearer(token_for(auth_id, SECRET))
        .json(&json!({ "message": "", "conversation_history": [] }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "E_VALIDATION");
}

#[tokio::test]
async fn stored_plan_is_returned() {
    let auth_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(auth_id, user_id)]])
        .append_query_results([vec![plan_row(user_id)]])
        .into_connection();
    let server = app(db);

    let response = server
        .get("/api/meal-plans/2025-01-13")
        .authorization_bearer(token_for(auth_id, SECRET))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["week_start"], "2025-01-13");
    assert_eq!(body["data"]["plan"]["days"].as_array().unwrap().len(), 7);
    assert_eq!(body["data"]["plan"]["days"][6]["day_name"], "Sunday");
}

#[tokio::test]
async fn missing_plan_is_not_found() {
    let auth_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(auth_id, Uuid::new_v4())]])
        .append_query_results([Vec::<meal_plans::Model>::new()])
        .into_connection();
    let server = app(db);

    let response = server
        .get("/api/meal-plans/2025-01-13")
        .authorization_bearer(token_for(auth_id, SECRET))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "E_NOT_FOUND");
}

#[tokio::test]
async fn week_must_start_on_monday() {
    let auth_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(auth_id, Uuid::new_v4())]])
        .into_connection();
    let server = app(db);

    let response = server
        .get("/api/meal-plans/2025-01-14")
        .authorization_bearer(token_for(auth_id, SECRET))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("Monday"));
}

#[tokio::test]
async fn replacement_day_must_keep_its_slot() {
    let auth_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(auth_id, user_id)]])
        .append_query_results([vec![plan_row(user_id)]])
        .into_connection();
    let server = app(db);

    // Friday's day sent to Wednesday's slot
    let response = server
        .put("/api/meal-plans/2025-01-13/days/2")
        .authorization_bearer(token_for(auth_id, SECRET))
        .json(&json!({ "day": day(4) }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_targets_fail_validation() {
    let auth_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_row(auth_id, Uuid::new_v4())]])
        .into_connection();
    let server = app(db);

    let response = server
        .post("/api/meal-plans")
        .authorization_bearer(token_for(auth_id, SECRET))
        .json(&json!({
            "week_start": "2025-01-13",
            "targets": { "calories": -1.0, "protein": 150.0, "carbs": 200.0, "fat": 67.0 }
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
