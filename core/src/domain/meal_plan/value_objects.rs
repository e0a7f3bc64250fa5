use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    meal_plan::entities::{DayName, Macro, MacroTotals, MealPlan, MealPlanDay, StoredMealPlan},
    nutrition::entities::FoodProfile,
};

/// Day-index groups requested in order: Mon-Tue, Wed-Thu, Fri-Sat, Sun.
pub const CHUNK_PARTITION: [&[usize]; 4] = [&[0, 1], &[2, 3], &[4, 5], &[6]];

pub const MAX_FAVORITE_FOODS_IN_PROMPT: usize = 10;

/// A calendar slot a generated day must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub day_name: DayName,
}

impl DaySlot {
    pub fn for_index(week_start: NaiveDate, index: usize) -> Option<Self> {
        let date = week_start.checked_add_days(Days::new(index as u64))?;
        Some(Self {
            date,
            day_name: DayName::of(date),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRequest {
    pub targets: MacroTotals,
    pub favorite_foods: Vec<FoodProfile>,
    pub preferences: String,
    pub slots: Vec<DaySlot>,
}

#[derive(Debug, Clone)]
pub struct GenerateMealPlanInput {
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub targets: MacroTotals,
    /// `None` falls back to the user's stored favourites.
    pub favorite_foods: Option<Vec<FoodProfile>>,
    pub preferences: String,
}

#[derive(Debug, Clone)]
pub struct GetMealPlanInput {
    pub user_id: Uuid,
    pub week_start: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct UpdatePlanDayInput {
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub day_index: usize,
    pub day: MealPlanDay,
}

#[derive(Debug, Clone)]
pub struct RegeneratePlanDayInput {
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub day_index: usize,
    pub preferences: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ExceedsTarget,
    TooFarUnder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MacroViolation {
    pub day_index: usize,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[serde(rename = "macro")]
    pub macro_kind: Macro,
    pub target: f64,
    pub actual: f64,
    pub kind: ViolationKind,
}

/// A freshly assembled plan with its accuracy verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedMealPlan {
    pub plan: MealPlan,
    pub within_tolerance: bool,
    pub violations: Vec<MacroViolation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerateMealPlanOutput {
    pub stored: StoredMealPlan,
    pub within_tolerance: bool,
    pub violations: Vec<MacroViolation>,
}
