use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklySummary {
    pub days_requested: u32,
    pub days_analyzed: usize,
    pub avg_calories: f64,
    pub avg_protein: f64,
    pub avg_carbs: f64,
    pub avg_fat: f64,
    pub days_logged: usize,
    pub consistency_rate: f64,
    pub protein_target_hit_rate: f64,
    pub carbs_target_hit_rate: f64,
    pub calories_target_hit_rate: f64,
    pub best_protein_day: NaiveDate,
    pub worst_protein_day: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    WeekdayWeekend,
    MacroConsistency,
}

impl PatternType {
    pub const ALL: [PatternType; 2] = [PatternType::WeekdayWeekend, PatternType::MacroConsistency];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::WeekdayWeekend => "weekday_weekend",
            PatternType::MacroConsistency => "macro_consistency",
        }
    }
}

impl TryFrom<&str> for PatternType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        PatternType::ALL
            .into_iter()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| {
                let valid: Vec<&str> = PatternType::ALL.iter().map(|p| p.as_str()).collect();
                format!("pattern_type must be one of {valid:?}")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeekdayWeekendPattern {
    pub weekday_count: usize,
    pub weekend_count: usize,
    pub weekday_avg_calories: f64,
    pub weekend_avg_calories: f64,
    pub weekday_avg_protein: f64,
    pub weekend_avg_protein: f64,
    pub weekday_avg_carbs: f64,
    pub weekend_avg_carbs: f64,
    pub weekday_logged_rate: f64,
    pub weekend_logged_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MacroConsistencyPattern {
    pub protein_std: f64,
    pub carbs_std: f64,
    pub fat_std: f64,
    pub protein_avg: f64,
    pub carbs_avg: f64,
    pub fat_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "pattern_type", rename_all = "snake_case")]
pub enum PatternSummary {
    WeekdayWeekend(WeekdayWeekendPattern),
    MacroConsistency(MacroConsistencyPattern),
}
