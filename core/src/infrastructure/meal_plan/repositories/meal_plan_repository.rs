use chrono::NaiveDate;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    domain::{
        common::{entities::app_errors::CoreError, generate_timestamp, generate_uuid_v7},
        meal_plan::{
            entities::{MealPlan, StoredMealPlan},
            ports::MealPlanRepository,
        },
    },
    entity::meal_plans::{ActiveModel, Column, Entity as MealPlanEntity},
};

#[derive(Debug, Clone)]
pub struct PostgresMealPlanRepository {
    pub db: DatabaseConnection,
}

impl PostgresMealPlanRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl MealPlanRepository for PostgresMealPlanRepository {
    async fn save_plan(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
        plan: MealPlan,
    ) -> Result<StoredMealPlan, CoreError> {
        let plan_data = serde_json::to_value(&plan).map_err(|e| {
            error!("Failed to serialize meal plan: {}", e);
            CoreError::InternalServerError
        })?;
        let (now, _) = generate_timestamp();

        let saved = MealPlanEntity::insert(ActiveModel {
            id: Set(generate_uuid_v7()),
            user_id: Set(user_id),
            week_start_date: Set(week_start),
            plan_data: Set(plan_data),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
        })
        .on_conflict(
            OnConflict::columns([Column::UserId, Column::WeekStartDate])
                .update_columns([Column::PlanData, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_with_returning(&self.db)
        .await
        .map_err(|e| {
            error!("Failed to save meal plan for week {}: {}", week_start, e);
            CoreError::DatabaseError(e.to_string())
        })?;

        StoredMealPlan::try_from(saved)
    }

    async fn get_plan(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> Result<Option<StoredMealPlan>, CoreError> {
        let model = MealPlanEntity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::WeekStartDate.eq(week_start))
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to get meal plan for week {}: {}", week_start, e);
                CoreError::DatabaseError(e.to_string())
            })?;

        model.map(StoredMealPlan::try_from).transpose()
    }
}
