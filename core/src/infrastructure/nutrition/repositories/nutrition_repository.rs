use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        nutrition::{
            entities::{DailySummary, FoodProfile, MacroGoals},
            ports::NutritionRepository,
        },
    },
    entity::{
        daily_summary::{Column as SummaryColumn, Entity as SummaryEntity},
        food_items::Entity as FoodItemEntity,
        macro_goals::{Column as GoalsColumn, Entity as GoalsEntity},
        user_favorites::{Column as FavoriteColumn, Entity as FavoriteEntity},
    },
};

#[derive(Debug, Clone)]
pub struct PostgresNutritionRepository {
    pub db: DatabaseConnection,
}

impl PostgresNutritionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(context: &str, e: sea_orm::DbErr) -> CoreError {
    error!("{}: {}", context, e);
    CoreError::DatabaseError(e.to_string())
}

impl NutritionRepository for PostgresNutritionRepository {
    async fn get_daily_summary(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, CoreError> {
        let summary = SummaryEntity::find()
            .filter(SummaryColumn::UserId.eq(user_id))
            .filter(SummaryColumn::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(|e| db_error("Failed to get daily summary", e))?
            .map(DailySummary::from);

        Ok(summary)
    }

    async fn get_macro_goals(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<MacroGoals>, CoreError> {
        let goals = GoalsEntity::find()
            .filter(GoalsColumn::UserId.eq(user_id))
            .filter(GoalsColumn::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(|e| db_error("Failed to get macro goals", e))?
            .map(MacroGoals::from);

        Ok(goals)
    }

    async fn get_summaries_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<DailySummary>, CoreError> {
        let rows = SummaryEntity::find()
            .filter(SummaryColumn::UserId.eq(user_id))
            .filter(SummaryColumn::Date.gte(since))
            .order_by_desc(SummaryColumn::Date)
            .all(&self.db)
            .await
            .map_err(|e| db_error("Failed to get daily summaries", e))?;

        Ok(rows.into_iter().map(DailySummary::from).collect())
    }

    async fn get_favorite_foods(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<FoodProfile>, CoreError> {
        let rows = FavoriteEntity::find()
            .filter(FavoriteColumn::UserId.eq(user_id))
            .order_by_desc(FavoriteColumn::FavoritedAt)
            .limit(limit)
            .find_also_related(FoodItemEntity)
            .all(&self.db)
            .await
            .map_err(|e| db_error("Failed to get favorite foods", e))?;

        // Favourites whose food item is gone are skipped.
        Ok(rows
            .into_iter()
            .filter_map(|(favorite, food)| food.map(|food| FoodProfile::from((favorite, food))))
            .collect())
    }
}
