use axum::{Router, middleware, routing::post};
use utoipa::OpenApi;

use super::handlers::chat::{__path_chat, chat};
use crate::application::{auth::auth, http::server::app_state::AppState};

#[derive(OpenApi)]
#[openapi(paths(chat))]
pub struct CoachApiDoc;

pub fn coach_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/api/chat", state.args.server.root_path),
            post(chat),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth))
}
