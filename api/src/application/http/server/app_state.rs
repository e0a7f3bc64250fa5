use std::sync::Arc;

use macrocoach_core::{
    application::MacroCoachService, infrastructure::user::repository::PostgresUserRepository,
};

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: MacroCoachService,
    pub user_repository: Arc<PostgresUserRepository>,
}

impl AppState {
    pub fn new(
        args: Arc<Args>,
        service: MacroCoachService,
        user_repository: PostgresUserRepository,
    ) -> Self {
        Self {
            args,
            service,
            user_repository: Arc::new(user_repository),
        }
    }
}
