use std::{fmt, iter::Sum, ops::Add};

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::common::entities::app_errors::CoreError;

pub const DAYS_PER_PLAN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Macro {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 4] = [Macro::Calories, Macro::Protein, Macro::Carbs, Macro::Fat];
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Macro::Calories => "calories",
            Macro::Protein => "protein",
            Macro::Carbs => "carbs",
            Macro::Fat => "fat",
        };
        f.write_str(name)
    }
}

/// Calories plus protein, carbs and fat in grams. Doubles as a target and as a sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    pub const ZERO: MacroTotals = MacroTotals {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };

    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    pub fn get(&self, macro_kind: Macro) -> f64 {
        match macro_kind {
            Macro::Calories => self.calories,
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    pub fn is_non_negative(&self) -> bool {
        Macro::ALL.iter().all(|m| {
            let v = self.get(*m);
            v.is_finite() && v >= 0.0
        })
    }

    /// Element-wise comparison with an absolute epsilon.
    pub fn approx_eq(&self, other: &MacroTotals, epsilon: f64) -> bool {
        Macro::ALL
            .iter()
            .all(|m| (self.get(*m) - other.get(*m)).abs() <= epsilon)
    }
}

impl Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, rhs: MacroTotals) -> MacroTotals {
        MacroTotals {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sum for MacroTotals {
    fn sum<I: Iterator<Item = MacroTotals>>(iter: I) -> Self {
        iter.fold(MacroTotals::ZERO, Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Food {
    pub name: String,
    pub quantity_g: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Food {
    pub fn macros(&self) -> MacroTotals {
        MacroTotals::new(self.calories, self.protein, self.carbs, self.fat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub meal_type: MealType,
    pub foods: Vec<Food>,
    pub totals: MacroTotals,
}

impl Meal {
    pub fn food_totals(&self) -> MacroTotals {
        self.foods.iter().map(Food::macros).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayName {
    pub const ALL: [DayName; DAYS_PER_PLAN] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
        DayName::Sunday,
    ];

    pub fn from_weekday(weekday: Weekday) -> Self {
        DayName::ALL[weekday.num_days_from_monday() as usize]
    }

    pub fn of(date: NaiveDate) -> Self {
        DayName::from_weekday(date.weekday())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayName::Monday => "Monday",
            DayName::Tuesday => "Tuesday",
            DayName::Wednesday => "Wednesday",
            DayName::Thursday => "Thursday",
            DayName::Friday => "Friday",
            DayName::Saturday => "Saturday",
            DayName::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MealPlanDay {
    #[schema(value_type = String, format = Date, example = "2025-01-13")]
    pub date: NaiveDate,
    pub day_name: DayName,
    pub meals: Vec<Meal>,
    pub daily_totals: MacroTotals,
}

impl MealPlanDay {
    pub fn meal_totals(&self) -> MacroTotals {
        self.meals.iter().map(|m| m.totals).sum()
    }
}

/// One to two generated days. Only ever merged into a [`MealPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayChunk {
    pub daily_target: MacroTotals,
    pub days: Vec<MealPlanDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MealPlan {
    #[schema(value_type = String, format = Date, example = "2025-01-13")]
    pub week_start: NaiveDate,
    pub daily_target: MacroTotals,
    pub days: Vec<MealPlanDay>,
}

impl MealPlan {
    pub fn new(
        week_start: NaiveDate,
        daily_target: MacroTotals,
        days: Vec<MealPlanDay>,
    ) -> Result<Self, CoreError> {
        if days.len() != DAYS_PER_PLAN {
            return Err(CoreError::DayCountMismatch {
                expected: DAYS_PER_PLAN,
                actual: days.len(),
            });
        }

        Ok(Self {
            week_start,
            daily_target,
            days,
        })
    }

    /// Returns the plan with `days[index]` swapped for `day`.
    pub fn with_day_replaced(mut self, index: usize, day: MealPlanDay) -> Result<Self, CoreError> {
        let slot = self.days.get_mut(index).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "day_index must be between 0 and {}, got {index}",
                DAYS_PER_PLAN - 1
            ))
        })?;

        if slot.date != day.date || slot.day_name != day.day_name {
            return Err(CoreError::InvalidInput(format!(
                "day {index} must keep {} ({}), got {} ({})",
                slot.day_name, slot.date, day.day_name, day.date
            )));
        }

        *slot = day;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredMealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-01-13")]
    pub week_start: NaiveDate,
    pub plan: MealPlan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: NaiveDate) -> MealPlanDay {
        MealPlanDay {
            date,
            day_name: DayName::of(date),
            meals: vec![],
            daily_totals: MacroTotals::ZERO,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
    }

    #[test]
    fn test_day_name_matches_weekday() {
        assert_eq!(DayName::of(monday()), DayName::Monday);
        assert_eq!(
            DayName::of(NaiveDate::from_ymd_opt(2025, 1, 19).unwrap()),
            DayName::Sunday
        );
    }

    #[test]
    fn test_day_name_serializes_capitalized() {
        let json = serde_json::to_string(&DayName::Wednesday).unwrap();
        assert_eq!(json, "\"Wednesday\"");
        let meal_type = serde_json::to_string(&MealType::Breakfast).unwrap();
        assert_eq!(meal_type, "\"breakfast\"");
    }

    #[test]
    fn test_macro_totals_sum() {
        let total: MacroTotals = [
            MacroTotals::new(100.0, 10.0, 5.0, 2.0),
            MacroTotals::new(50.5, 1.5, 0.5, 0.0),
        ]
        .into_iter()
        .sum();

        assert!(total.approx_eq(&MacroTotals::new(150.5, 11.5, 5.5, 2.0), 1e-9));
    }

    #[test]
    fn test_meal_plan_requires_seven_days() {
        let days: Vec<MealPlanDay> = (0..6)
            .map(|i| day(monday() + chrono::Days::new(i)))
            .collect();

        let err = MealPlan::new(monday(), MacroTotals::ZERO, days).unwrap_err();
        assert_eq!(
            err,
            CoreError::DayCountMismatch {
                expected: 7,
                actual: 6
            }
        );
    }

    #[test]
    fn test_with_day_replaced_keeps_slot_identity() {
        let days: Vec<MealPlanDay> = (0..7)
            .map(|i| day(monday() + chrono::Days::new(i)))
            .collect();
        let plan = MealPlan::new(monday(), MacroTotals::ZERO, days).unwrap();

        let mut replacement = day(monday() + chrono::Days::new(2));
        replacement.daily_totals = MacroTotals::new(1.0, 1.0, 1.0, 1.0);
        let updated = plan.clone().with_day_replaced(2, replacement).unwrap();
        assert_eq!(updated.days[2].daily_totals.calories, 1.0);

        let wrong_slot = day(monday());
        assert!(matches!(
            plan.clone().with_day_replaced(2, wrong_slot),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            plan.with_day_replaced(7, day(monday())),
            Err(CoreError::InvalidInput(_))
        ));
    }
}
