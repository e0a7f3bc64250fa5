use chrono::NaiveDate;
use macrocoach_core::domain::{
    meal_plan::entities::{MacroTotals, MealPlanDay},
    nutrition::entities::FoodProfile,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, ToSchema)]
pub struct MacroTargetsValidator {
    #[validate(range(min = 0.0, max = 10000.0, message = "calories must be between 0 and 10000"))]
    pub calories: f64,

    #[validate(range(min = 0.0, max = 1000.0, message = "protein must be between 0 and 1000"))]
    pub protein: f64,

    #[validate(range(min = 0.0, max = 1500.0, message = "carbs must be between 0 and 1500"))]
    pub carbs: f64,

    #[validate(range(min = 0.0, max = 500.0, message = "fat must be between 0 and 500"))]
    pub fat: f64,
}

impl From<MacroTargetsValidator> for MacroTotals {
    fn from(targets: MacroTargetsValidator) -> Self {
        MacroTotals::new(targets.calories, targets.protein, targets.carbs, targets.fat)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenerateMealPlanValidator {
    /// Monday the plan starts on.
    #[schema(value_type = String, format = Date, example = "2025-01-13")]
    pub week_start: NaiveDate,

    #[validate(nested)]
    pub targets: MacroTargetsValidator,

    /// Omit to use the foods the user has favourited.
    #[serde(default)]
    pub favorite_foods: Option<Vec<FoodProfile>>,

    #[serde(default)]
    #[validate(length(max = 2000, message = "food_preferences is too long"))]
    pub food_preferences: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePlanDayValidator {
    pub day: MealPlanDay,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegeneratePlanDayValidator {
    #[serde(default)]
    #[validate(length(max = 2000, message = "food_preferences is too long"))]
    pub food_preferences: Option<String>,
}
