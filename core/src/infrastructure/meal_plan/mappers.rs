use crate::{
    domain::{common::entities::app_errors::CoreError, meal_plan::entities::StoredMealPlan},
    entity::meal_plans,
};

impl TryFrom<meal_plans::Model> for StoredMealPlan {
    type Error = CoreError;

    fn try_from(model: meal_plans::Model) -> Result<Self, Self::Error> {
        let plan = serde_json::from_value(model.plan_data).map_err(|e| {
            CoreError::DatabaseError(format!("stored plan {} is malformed: {e}", model.id))
        })?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            week_start: model.week_start_date,
            plan,
            created_at: model.created_at.to_utc(),
            updated_at: model.updated_at.to_utc(),
        })
    }
}
