use std::collections::HashSet;

use crate::domain::meal_plan::{
    entities::{DayChunk, Macro, MacroTotals, MealPlan, MealPlanDay},
    value_objects::{DaySlot, MacroViolation, ViolationKind},
};

/// Absolute slack when comparing model-reported totals with re-derived ones.
pub const TOTALS_EPSILON: f64 = 0.5;

pub const DEFAULT_TOLERANCE: f64 = 0.05;

fn check_target(target: f64, actual: f64, tolerance: f64) -> Option<ViolationKind> {
    if actual > target {
        return Some(ViolationKind::ExceedsTarget);
    }
    if target > 0.0 && (target - actual) / target > tolerance {
        return Some(ViolationKind::TooFarUnder);
    }
    None
}

/// True when no day exceeds any target and none falls more than `tolerance`
/// below a non-zero target.
pub fn validate_macro_accuracy(plan: &MealPlan, tolerance: f64) -> bool {
    plan.days.iter().all(|day| {
        Macro::ALL.iter().all(|m| {
            check_target(
                plan.daily_target.get(*m),
                day.daily_totals.get(*m),
                tolerance,
            )
            .is_none()
        })
    })
}

/// Every failing day/macro pair, in day-then-macro order.
pub fn find_macro_violations(plan: &MealPlan, tolerance: f64) -> Vec<MacroViolation> {
    let mut violations = Vec::new();

    for (day_index, day) in plan.days.iter().enumerate() {
        for macro_kind in Macro::ALL {
            let target = plan.daily_target.get(macro_kind);
            let actual = day.daily_totals.get(macro_kind);

            if let Some(kind) = check_target(target, actual, tolerance) {
                violations.push(MacroViolation {
                    day_index,
                    date: day.date,
                    macro_kind,
                    target,
                    actual,
                    kind,
                });
            }
        }
    }

    violations
}

/// Structural checks on a generated chunk against the slots it was asked to fill.
/// The error string is fed back to the model on retry.
pub fn check_chunk(chunk: &DayChunk, slots: &[DaySlot]) -> Result<(), String> {
    if chunk.days.len() != slots.len() {
        return Err(format!(
            "expected {} day(s), got {}",
            slots.len(),
            chunk.days.len()
        ));
    }

    for (day, slot) in chunk.days.iter().zip(slots) {
        if day.date != slot.date || day.day_name != slot.day_name {
            return Err(format!(
                "expected {} ({}), got {} ({})",
                slot.day_name, slot.date, day.day_name, day.date
            ));
        }
    }

    check_days(&chunk.days)
}

/// Per-day invariants shared by generated chunks and stored plans. Meal ids
/// must be unique across all of `days`.
pub fn check_days(days: &[MealPlanDay]) -> Result<(), String> {
    let mut meal_ids = HashSet::new();
    for day in days {
        check_day(day, &mut meal_ids)?;
    }
    Ok(())
}

fn check_day<'a>(day: &'a MealPlanDay, meal_ids: &mut HashSet<&'a str>) -> Result<(), String> {
    if day.meals.is_empty() {
        return Err(format!("{} has no meals", day.day_name));
    }
    if !day.daily_totals.is_non_negative() {
        return Err(format!("{} has negative daily totals", day.day_name));
    }

    for meal in &day.meals {
        if meal.name.trim().is_empty() {
            return Err(format!("a meal on {} has an empty name", day.day_name));
        }
        if !meal_ids.insert(meal.id.as_str()) {
            return Err(format!("duplicate meal id '{}'", meal.id));
        }
        if meal.foods.is_empty() {
            return Err(format!("meal '{}' has no foods", meal.name));
        }
        if !meal.totals.is_non_negative() {
            return Err(format!("meal '{}' has negative totals", meal.name));
        }

        for food in &meal.foods {
            if food.name.trim().is_empty() {
                return Err(format!("a food in meal '{}' has an empty name", meal.name));
            }
            if !(food.quantity_g.is_finite() && food.quantity_g > 0.0) {
                return Err(format!("'{}' must have a positive quantity_g", food.name));
            }
            if !food.macros().is_non_negative() {
                return Err(format!("'{}' has negative macros", food.name));
            }
        }
    }

    Ok(())
}

/// Rewrites meal and daily totals from the leaf foods. Returns whether any
/// reported total was off by more than [`TOTALS_EPSILON`].
pub fn reconcile_totals(day: &mut MealPlanDay) -> bool {
    let mut corrected = false;

    for meal in &mut day.meals {
        let derived = meal.food_totals();
        corrected |= !meal.totals.approx_eq(&derived, TOTALS_EPSILON);
        meal.totals = derived;
    }

    let derived: MacroTotals = day.meal_totals();
    corrected |= !day.daily_totals.approx_eq(&derived, TOTALS_EPSILON);
    day.daily_totals = derived;

    corrected
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::domain::meal_plan::entities::{DayName, Food, Meal, MealType};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
    }

    fn day_with_totals(index: u64, totals: MacroTotals) -> MealPlanDay {
        let date = monday() + Days::new(index);
        MealPlanDay {
            date,
            day_name: DayName::of(date),
            meals: vec![Meal {
                id: format!("meal_{index}_001"),
                name: "Bowl".to_string(),
                meal_type: MealType::Lunch,
                foods: vec![Food {
                    name: "Rice".to_string(),
                    quantity_g: 100.0,
                    calories: totals.calories,
                    protein: totals.protein,
                    carbs: totals.carbs,
                    fat: totals.fat,
                }],
                totals,
            }],
            daily_totals: totals,
        }
    }

    fn plan(days: Vec<MealPlanDay>) -> MealPlan {
        MealPlan::new(monday(), MacroTotals::new(2000.0, 150.0, 200.0, 67.0), days).unwrap()
    }

    fn on_target_week() -> Vec<MealPlanDay> {
        (0..7)
            .map(|i| day_with_totals(i, MacroTotals::new(1980.0, 148.0, 196.0, 66.0)))
            .collect()
    }

    #[test]
    fn test_plan_within_band_is_valid() {
        let plan = plan(on_target_week());
        assert!(validate_macro_accuracy(&plan, DEFAULT_TOLERANCE));
        assert!(find_macro_violations(&plan, DEFAULT_TOLERANCE).is_empty());
    }

    #[test]
    fn test_exceeding_any_macro_is_invalid() {
        let mut days = on_target_week();
        days[3].daily_totals.calories = 2100.0;
        let plan = plan(days);

        assert!(!validate_macro_accuracy(&plan, DEFAULT_TOLERANCE));
        let violations = find_macro_violations(&plan, DEFAULT_TOLERANCE);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].day_index, 3);
        assert_eq!(violations[0].macro_kind, Macro::Calories);
        assert_eq!(violations[0].kind, ViolationKind::ExceedsTarget);
    }

    #[test]
    fn test_too_far_under_is_invalid() {
        let mut days = on_target_week();
        days[0].daily_totals.fat = 60.0;
        let plan = plan(days);

        assert!(!validate_macro_accuracy(&plan, DEFAULT_TOLERANCE));
        assert_eq!(
            find_macro_violations(&plan, DEFAULT_TOLERANCE)[0].kind,
            ViolationKind::TooFarUnder
        );
    }

    #[test]
    fn test_zero_target_skips_under_check() {
        let days = (0..7)
            .map(|i| day_with_totals(i, MacroTotals::new(1980.0, 148.0, 0.0, 66.0)))
            .collect();
        let plan = MealPlan::new(monday(), MacroTotals::new(2000.0, 150.0, 0.0, 67.0), days)
            .unwrap();
        assert!(validate_macro_accuracy(&plan, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_exact_target_is_valid() {
        let days = (0..7)
            .map(|i| day_with_totals(i, MacroTotals::new(2000.0, 150.0, 200.0, 67.0)))
            .collect();
        assert!(validate_macro_accuracy(&plan(days), DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_exactly_five_percent_under_is_valid() {
        let days = (0..7)
            .map(|i| day_with_totals(i, MacroTotals::new(1900.0, 150.0, 200.0, 67.0)))
            .collect();
        let plan = plan(days);

        assert!(validate_macro_accuracy(&plan, DEFAULT_TOLERANCE));
        assert!(find_macro_violations(&plan, DEFAULT_TOLERANCE).is_empty());
    }

    #[test]
    fn test_just_past_five_percent_under_is_invalid() {
        let mut days = on_target_week();
        days[6].daily_totals.calories = 1899.0;
        let plan = plan(days);

        assert!(!validate_macro_accuracy(&plan, DEFAULT_TOLERANCE));
        let violations = find_macro_violations(&plan, DEFAULT_TOLERANCE);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].day_index, 6);
        assert_eq!(violations[0].kind, ViolationKind::TooFarUnder);
    }

    #[test]
    fn test_check_chunk_rejects_wrong_slot_order() {
        let slots = vec![
            DaySlot::for_index(monday(), 0).unwrap(),
            DaySlot::for_index(monday(), 1).unwrap(),
        ];
        let chunk = DayChunk {
            daily_target: MacroTotals::ZERO,
            days: vec![
                day_with_totals(1, MacroTotals::ZERO),
                day_with_totals(0, MacroTotals::ZERO),
            ],
        };
        assert!(check_chunk(&chunk, &slots).is_err());

        let chunk = DayChunk {
            daily_target: MacroTotals::ZERO,
            days: vec![
                day_with_totals(0, MacroTotals::ZERO),
                day_with_totals(1, MacroTotals::ZERO),
            ],
        };
        assert!(check_chunk(&chunk, &slots).is_ok());
    }

    #[test]
    fn test_check_chunk_rejects_bad_food() {
        let slots = vec![DaySlot::for_index(monday(), 0).unwrap()];
        let mut day = day_with_totals(0, MacroTotals::ZERO);
        day.meals[0].foods[0].quantity_g = 0.0;
        let chunk = DayChunk {
            daily_target: MacroTotals::ZERO,
            days: vec![day],
        };

        let err = check_chunk(&chunk, &slots).unwrap_err();
        assert!(err.contains("quantity_g"));
    }

    #[test]
    fn test_check_days_rejects_day_without_meals() {
        let mut day = day_with_totals(2, MacroTotals::ZERO);
        day.meals.clear();

        let err = check_days(&[day]).unwrap_err();
        assert!(err.contains("no meals"));
    }

    #[test]
    fn test_check_days_rejects_meal_id_reused_across_days() {
        let monday = day_with_totals(0, MacroTotals::ZERO);
        let mut tuesday = day_with_totals(1, MacroTotals::ZERO);
        tuesday.meals[0].id = monday.meals[0].id.clone();

        let err = check_days(&[monday, tuesday]).unwrap_err();
        assert!(err.contains("duplicate meal id"));
    }

    #[test]
    fn test_reconcile_totals_rederives_from_foods() {
        let mut day = day_with_totals(0, MacroTotals::new(500.0, 30.0, 50.0, 10.0));
        day.meals[0].totals = MacroTotals::new(400.0, 30.0, 50.0, 10.0);
        day.daily_totals = MacroTotals::new(450.0, 30.0, 50.0, 10.0);

        assert!(reconcile_totals(&mut day));
        assert_eq!(day.meals[0].totals.calories, 500.0);
        assert_eq!(day.daily_totals.calories, 500.0);

        assert!(!reconcile_totals(&mut day));
    }
}
