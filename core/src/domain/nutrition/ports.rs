use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    nutrition::entities::{DailySummary, FoodProfile, MacroGoals},
};

/// Read-only access to logged intake, goals and favourites.
#[cfg_attr(test, mockall::automock)]
pub trait NutritionRepository: Send + Sync {
    fn get_daily_summary(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<DailySummary>, CoreError>> + Send;

    fn get_macro_goals(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<MacroGoals>, CoreError>> + Send;

    /// Rows dated on or after `since`, newest first.
    fn get_summaries_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> impl Future<Output = Result<Vec<DailySummary>, CoreError>> + Send;

    /// Most recently favourited first.
    fn get_favorite_foods(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<FoodProfile>, CoreError>> + Send;
}
