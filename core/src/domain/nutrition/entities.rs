use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of the per-day intake rollup: what was eaten against what was planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub calories_target: f64,
    pub protein_target: f64,
    pub carbs_target: f64,
    pub fat_target: f64,
    pub has_logged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MacroGoals {
    pub date: NaiveDate,
    pub calories_target: f64,
    pub protein_target: f64,
    pub carbs_target: f64,
    pub fat_target: f64,
}

impl DailySummary {
    /// Summary for a day with goals but nothing logged yet.
    pub fn empty_for_goals(goals: &MacroGoals) -> Self {
        Self {
            date: goals.date,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            calories_target: goals.calories_target,
            protein_target: goals.protein_target,
            carbs_target: goals.carbs_target,
            fat_target: goals.fat_target,
            has_logged: false,
        }
    }
}

/// A user-preferred food with its per-100g macro profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoodProfile {
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_quantity_g: Option<f64>,
}
