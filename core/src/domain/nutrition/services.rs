use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    nutrition::{
        entities::{DailySummary, FoodProfile},
        ports::NutritionRepository,
        value_objects::{
            MacroConsistencyPattern, PatternSummary, PatternType, WeekdayWeekendPattern,
            WeeklySummary,
        },
    },
};

pub const MAX_FAVORITE_FOODS: u64 = 20;
pub const MIN_DAYS_FOR_PATTERNS: usize = 7;
const MIN_LOGGED_DAYS_FOR_CONSISTENCY: usize = 3;
const CARBS_RANGE_FACTOR: f64 = 1.1;
const CALORIES_ON_TARGET_WINDOW: f64 = 100.0;

/// Today's summary; falls back to an empty summary when goals exist but
/// nothing was logged. `None` means no goals are set for the day.
#[instrument(skip(repository))]
pub async fn fetch_today<R: NutritionRepository>(
    repository: &R,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<Option<DailySummary>, CoreError> {
    if let Some(summary) = repository.get_daily_summary(user_id, today).await? {
        return Ok(Some(summary));
    }

    let goals = repository.get_macro_goals(user_id, today).await?;
    Ok(goals.as_ref().map(DailySummary::empty_for_goals))
}

#[instrument(skip(repository))]
pub async fn fetch_range<R: NutritionRepository>(
    repository: &R,
    user_id: Uuid,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<DailySummary>, CoreError> {
    let since = today
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| CoreError::InvalidInput(format!("cannot look back {days} days")))?;

    repository.get_summaries_since(user_id, since).await
}

/// Favourites never fail the caller; a lookup error degrades to no favourites.
pub async fn fetch_favorites<R: NutritionRepository>(
    repository: &R,
    user_id: Uuid,
) -> Vec<FoodProfile> {
    match repository
        .get_favorite_foods(user_id, MAX_FAVORITE_FOODS)
        .await
    {
        Ok(foods) => foods,
        Err(e) => {
            error!("fetch_favorites failed for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

pub fn summarize_week(rows: &[DailySummary], days_requested: u32) -> Option<WeeklySummary> {
    let first = rows.first()?;
    let count = rows.len() as f64;

    let rate = |pred: &dyn Fn(&DailySummary) -> bool| {
        rows.iter().filter(|r| pred(r)).count() as f64 / count
    };

    let days_logged = rows.iter().filter(|r| r.has_logged).count();

    // Ties keep the earliest row in iteration order.
    let (best, worst) = rows.iter().fold((first, first), |(best, worst), row| {
        (
            if row.total_protein > best.total_protein { row } else { best },
            if row.total_protein < worst.total_protein { row } else { worst },
        )
    });

    Some(WeeklySummary {
        days_requested,
        days_analyzed: rows.len(),
        avg_calories: mean(rows.iter().map(|r| r.total_calories)),
        avg_protein: mean(rows.iter().map(|r| r.total_protein)),
        avg_carbs: mean(rows.iter().map(|r| r.total_carbs)),
        avg_fat: mean(rows.iter().map(|r| r.total_fat)),
        days_logged,
        consistency_rate: days_logged as f64 / count,
        protein_target_hit_rate: rate(&|r| r.total_protein >= r.protein_target),
        carbs_target_hit_rate: rate(&|r| r.total_carbs <= r.carbs_target * CARBS_RANGE_FACTOR),
        calories_target_hit_rate: rate(&|r| {
            (r.total_calories - r.calories_target).abs() <= CALORIES_ON_TARGET_WINDOW
        }),
        best_protein_day: best.date,
        worst_protein_day: worst.date,
    })
}

pub fn analyze_pattern(rows: &[DailySummary], pattern: PatternType) -> Option<PatternSummary> {
    if rows.len() < MIN_DAYS_FOR_PATTERNS {
        return None;
    }

    match pattern {
        PatternType::WeekdayWeekend => weekday_weekend(rows).map(PatternSummary::WeekdayWeekend),
        PatternType::MacroConsistency => {
            macro_consistency(rows).map(PatternSummary::MacroConsistency)
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn weekday_weekend(rows: &[DailySummary]) -> Option<WeekdayWeekendPattern> {
    let (weekends, weekdays): (Vec<&DailySummary>, Vec<&DailySummary>) =
        rows.iter().partition(|r| is_weekend(r.date));

    if weekdays.is_empty() || weekends.is_empty() {
        return None;
    }

    let logged_rate = |group: &[&DailySummary]| {
        group.iter().filter(|r| r.has_logged).count() as f64 / group.len() as f64
    };

    Some(WeekdayWeekendPattern {
        weekday_count: weekdays.len(),
        weekend_count: weekends.len(),
        weekday_avg_calories: mean(weekdays.iter().map(|r| r.total_calories)),
        weekend_avg_calories: mean(weekends.iter().map(|r| r.total_calories)),
        weekday_avg_protein: mean(weekdays.iter().map(|r| r.total_protein)),
        weekend_avg_protein: mean(weekends.iter().map(|r| r.total_protein)),
        weekday_avg_carbs: mean(weekdays.iter().map(|r| r.total_carbs)),
        weekend_avg_carbs: mean(weekends.iter().map(|r| r.total_carbs)),
        weekday_logged_rate: logged_rate(&weekdays),
        weekend_logged_rate: logged_rate(&weekends),
    })
}

fn macro_consistency(rows: &[DailySummary]) -> Option<MacroConsistencyPattern> {
    let logged: Vec<&DailySummary> = rows.iter().filter(|r| r.has_logged).collect();
    if logged.len() < MIN_LOGGED_DAYS_FOR_CONSISTENCY {
        return None;
    }

    let protein: Vec<f64> = logged.iter().map(|r| r.total_protein).collect();
    let carbs: Vec<f64> = logged.iter().map(|r| r.total_carbs).collect();
    let fat: Vec<f64> = logged.iter().map(|r| r.total_fat).collect();

    Some(MacroConsistencyPattern {
        protein_std: sample_std_dev(&protein),
        carbs_std: sample_std_dev(&carbs),
        fat_std: sample_std_dev(&fat),
        protein_avg: mean(protein.iter().copied()),
        carbs_avg: mean(carbs.iter().copied()),
        fat_avg: mean(fat.iter().copied()),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Bessel-corrected standard deviation; zero for fewer than two samples.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values.iter().copied());
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::nutrition::{entities::MacroGoals, ports::MockNutritionRepository};

    fn row(date: &str, calories: f64, protein: f64, carbs: f64, logged: bool) -> DailySummary {
        DailySummary {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_calories: calories,
            total_protein: protein,
            total_carbs: carbs,
            total_fat: 60.0,
            calories_target: 2000.0,
            protein_target: 150.0,
            carbs_target: 200.0,
            fat_target: 67.0,
            has_logged: logged,
        }
    }

    fn two_weeks() -> Vec<DailySummary> {
        // 2025-01-13 is a Monday.
        (0..14)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap() + Days::new(i);
                let weekend = is_weekend(date);
                DailySummary {
                    date,
                    total_calories: if weekend { 2500.0 } else { 2000.0 },
                    total_protein: 140.0 + i as f64,
                    total_carbs: if weekend { 260.0 } else { 200.0 },
                    total_fat: 65.0,
                    calories_target: 2000.0,
                    protein_target: 150.0,
                    carbs_target: 200.0,
                    fat_target: 67.0,
                    has_logged: true,
                }
            })
            .collect()
    }

    #[test]
    fn test_summarize_week_empty_is_none() {
        assert!(summarize_week(&[], 7).is_none());
    }

    #[test]
    fn test_summarize_week_rates_and_extremes() {
        let rows = vec![
            row("2025-01-15", 2050.0, 160.0, 210.0, true),
            row("2025-01-14", 1500.0, 100.0, 250.0, true),
            row("2025-01-13", 0.0, 0.0, 0.0, false),
            row("2025-01-12", 1950.0, 160.0, 190.0, true),
        ];

        let summary = summarize_week(&rows, 7).unwrap();

        assert_eq!(summary.days_analyzed, 4);
        assert_eq!(summary.days_logged, 3);
        assert!((summary.consistency_rate - 0.75).abs() < 1e-9);
        assert!((summary.avg_calories - 1375.0).abs() < 1e-9);
        assert!((summary.protein_target_hit_rate - 0.5).abs() < 1e-9);
        // 210 and 190 and 0 are within 110% of 200; 250 is not.
        assert!((summary.carbs_target_hit_rate - 0.75).abs() < 1e-9);
        assert!((summary.calories_target_hit_rate - 0.5).abs() < 1e-9);
        // First of the tied maxima wins.
        assert_eq!(summary.best_protein_day.to_string(), "2025-01-15");
        assert_eq!(summary.worst_protein_day.to_string(), "2025-01-13");
    }

    #[test]
    fn test_patterns_need_seven_rows() {
        let rows = two_weeks();
        assert!(analyze_pattern(&rows[..6], PatternType::WeekdayWeekend).is_none());
    }

    #[test]
    fn test_weekday_weekend_split() {
        let rows = two_weeks();
        let Some(PatternSummary::WeekdayWeekend(p)) =
            analyze_pattern(&rows, PatternType::WeekdayWeekend)
        else {
            panic!("expected weekday/weekend pattern");
        };

        assert_eq!(p.weekday_count, 10);
        assert_eq!(p.weekend_count, 4);
        assert!((p.weekday_avg_calories - 2000.0).abs() < 1e-9);
        assert!((p.weekend_avg_calories - 2500.0).abs() < 1e-9);
        assert!((p.weekend_avg_carbs - 260.0).abs() < 1e-9);
        assert!((p.weekday_logged_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekday_weekend_without_weekend_is_none() {
        let rows: Vec<DailySummary> = two_weeks()
            .into_iter()
            .filter(|r| !is_weekend(r.date))
            .collect();
        assert!(rows.len() >= MIN_DAYS_FOR_PATTERNS);
        assert!(analyze_pattern(&rows, PatternType::WeekdayWeekend).is_none());
    }

    #[test]
    fn test_macro_consistency_uses_sample_std_dev() {
        let mut rows = two_weeks();
        for (i, r) in rows.iter_mut().enumerate() {
            r.has_logged = i < 3;
            r.total_protein = [100.0, 120.0, 140.0][i.min(2)];
        }

        let Some(PatternSummary::MacroConsistency(p)) =
            analyze_pattern(&rows, PatternType::MacroConsistency)
        else {
            panic!("expected consistency pattern");
        };

        assert!((p.protein_avg - 120.0).abs() < 1e-9);
        assert!((p.protein_std - 20.0).abs() < 1e-9);
        assert_eq!(p.fat_std, 0.0);
    }

    #[test]
    fn test_macro_consistency_needs_three_logged_days() {
        let mut rows = two_weeks();
        for (i, r) in rows.iter_mut().enumerate() {
            r.has_logged = i < 2;
        }
        assert!(analyze_pattern(&rows, PatternType::MacroConsistency).is_none());
    }

    #[tokio::test]
    async fn test_fetch_today_falls_back_to_goals() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let mut repository = MockNutritionRepository::new();
        repository
            .expect_get_daily_summary()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(None) }));
        repository
            .expect_get_macro_goals()
            .times(1)
            .returning(move |_, date| {
                Box::pin(async move {
                    Ok(Some(MacroGoals {
                        date,
                        calories_target: 2000.0,
                        protein_target: 150.0,
                        carbs_target: 200.0,
                        fat_target: 67.0,
                    }))
                })
            });

        let summary = fetch_today(&repository, Uuid::new_v4(), today)
            .await
            .unwrap()
            .unwrap();

        assert!(!summary.has_logged);
        assert_eq!(summary.total_protein, 0.0);
        assert_eq!(summary.protein_target, 150.0);
    }

    #[tokio::test]
    async fn test_fetch_today_without_goals_is_none() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
        let mut repository = MockNutritionRepository::new();
        repository
            .expect_get_daily_summary()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        repository
            .expect_get_macro_goals()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let summary = fetch_today(&repository, Uuid::new_v4(), today).await.unwrap();
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_fetch_favorites_degrades_to_empty() {
        let mut repository = MockNutritionRepository::new();
        repository
            .expect_get_favorite_foods()
            .withf(|_, limit| *limit == MAX_FAVORITE_FOODS)
            .returning(|_, _| {
                Box::pin(async { Err(CoreError::DatabaseError("boom".to_string())) })
            });

        let favorites = fetch_favorites(&repository, Uuid::new_v4()).await;
        assert!(favorites.is_empty());
    }
}
