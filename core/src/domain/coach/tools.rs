use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::domain::{
    coach::entities::{
        CoachTool, PATTERN_DAYS_DEFAULT, PATTERN_DAYS_RANGE, WEEKLY_DAYS_DEFAULT,
        WEEKLY_DAYS_RANGE,
    },
    nutrition::{
        entities::DailySummary,
        ports::NutritionRepository,
        services::{analyze_pattern, fetch_range, fetch_today, summarize_week},
        value_objects::{
            MacroConsistencyPattern, PatternSummary, PatternType, WeekdayWeekendPattern,
            WeeklySummary,
        },
    },
};

pub const WEEKLY_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Who and when a tool call runs for.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext {
    pub user_id: Uuid,
    pub today: NaiveDate,
}

fn int_arg(input: &Value, key: &str, default: i64) -> Result<i64, String> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| format!("Error: {key} must be an integer")),
    }
}

fn in_range(value: i64, (min, max): (i64, i64)) -> Result<u32, String> {
    if value < min || value > max {
        return Err(format!("Error: days must be between {min} and {max}"));
    }
    Ok(value as u32)
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Runs one tool call. Failures come back as text for the model, never as errors.
pub async fn execute_tool<R: NutritionRepository>(
    tool: CoachTool,
    repository: &R,
    ctx: ToolContext,
    input: &Value,
) -> String {
    let result = match tool {
        CoachTool::TodayStatus => today_status(repository, ctx).await,
        CoachTool::WeeklyProgress => weekly_progress(repository, ctx, input).await,
        CoachTool::PatternAnalysis => pattern_analysis(repository, ctx, input).await,
    };

    result.unwrap_or_else(|message| message)
}

async fn today_status<R: NutritionRepository>(
    repository: &R,
    ctx: ToolContext,
) -> Result<String, String> {
    match fetch_today(repository, ctx.user_id, ctx.today).await {
        Ok(summary) => Ok(format_today_status(summary.as_ref())),
        Err(e) => {
            error!("fetch_today_status failed: {}", e);
            Err("Unable to fetch today's status due to a technical issue. Please try again."
                .to_string())
        }
    }
}

async fn weekly_progress<R: NutritionRepository>(
    repository: &R,
    ctx: ToolContext,
    input: &Value,
) -> Result<String, String> {
    let days = in_range(int_arg(input, "days", WEEKLY_DAYS_DEFAULT)?, WEEKLY_DAYS_RANGE)?;

    let fetch = fetch_range(repository, ctx.user_id, ctx.today, days);
    let rows = match tokio::time::timeout(WEEKLY_FETCH_TIMEOUT, fetch).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            error!("fetch_weekly_progress failed: {}", e);
            return Err("Unable to fetch weekly progress. Please try again later.".to_string());
        }
        Err(_) => return Err("Database query timed out. Please try again.".to_string()),
    };

    Ok(match summarize_week(&rows, days) {
        Some(summary) => format_weekly_summary(&summary),
        None => format!(
            "No nutrition data found for the last {days} days. User hasn't logged any meals yet."
        ),
    })
}

async fn pattern_analysis<R: NutritionRepository>(
    repository: &R,
    ctx: ToolContext,
    input: &Value,
) -> Result<String, String> {
    let days = in_range(int_arg(input, "days", PATTERN_DAYS_DEFAULT)?, PATTERN_DAYS_RANGE)?;

    let pattern = match input.get("pattern_type").and_then(Value::as_str) {
        None => PatternType::WeekdayWeekend,
        Some(raw) => PatternType::try_from(raw).map_err(|e| format!("Error: {e}"))?,
    };

    let rows: Vec<DailySummary> = fetch_range(repository, ctx.user_id, ctx.today, days)
        .await
        .map_err(|e| {
            error!("fetch_pattern_analysis failed: {}", e);
            "Unable to perform pattern analysis. Please try again later.".to_string()
        })?;

    Ok(match analyze_pattern(&rows, pattern) {
        Some(PatternSummary::WeekdayWeekend(p)) => format_weekday_weekend(&p, days),
        Some(PatternSummary::MacroConsistency(p)) => format_macro_consistency(&p, days),
        None => "Need at least 7 days of logged data for pattern analysis. \
                 User hasn't logged enough meals yet."
            .to_string(),
    })
}

pub fn format_today_status(summary: Option<&DailySummary>) -> String {
    let Some(s) = summary else {
        return "No nutrition goals set yet. User should set their daily macro targets first."
            .to_string();
    };

    if !s.has_logged {
        return format!(
            "No meals logged yet today. Goals: {} cal, {}g protein, {}g carbs, {}g fat.",
            s.calories_target, s.protein_target, s.carbs_target, s.fat_target
        );
    }

    format!(
        "Today's Status ({date}):\n\
         - Calories: {} of {} ({:.0}%)\n\
         - Protein: {}g of {}g ({:.0}%)\n\
         - Carbs: {}g of {}g ({:.0}%)\n\
         - Fat: {}g of {}g ({:.0}%)\n\
         - Has logged meals: Yes\n\n\
         Remaining to hit targets:\n\
         - Calories: {} cal\n\
         - Protein: {}g\n\
         - Carbs: {}g\n\
         - Fat: {}g",
        s.total_calories,
        s.calories_target,
        percent(s.total_calories, s.calories_target),
        s.total_protein,
        s.protein_target,
        percent(s.total_protein, s.protein_target),
        s.total_carbs,
        s.carbs_target,
        percent(s.total_carbs, s.carbs_target),
        s.total_fat,
        s.fat_target,
        percent(s.total_fat, s.fat_target),
        (s.calories_target - s.total_calories).max(0.0),
        (s.protein_target - s.total_protein).max(0.0),
        (s.carbs_target - s.total_carbs).max(0.0),
        (s.fat_target - s.total_fat).max(0.0),
        date = s.date,
    )
}

pub fn format_weekly_summary(s: &WeeklySummary) -> String {
    format!(
        "Weekly Summary (Last {} days):\n\
         - Days analyzed: {}\n\
         - Days logged: {} ({:.0}% consistency)\n\n\
         Average Daily Macros:\n\
         - Calories: {:.0}\n\
         - Protein: {:.1}g\n\
         - Carbs: {:.1}g\n\
         - Fat: {:.1}g\n\n\
         Target Hit Rates:\n\
         - Protein target hit: {:.0}% of days\n\
         - Carbs within range: {:.0}% of days\n\
         - Calories on target: {:.0}% of days\n\n\
         Best protein day: {}\n\
         Worst protein day: {}",
        s.days_requested,
        s.days_analyzed,
        s.days_logged,
        s.consistency_rate * 100.0,
        s.avg_calories,
        s.avg_protein,
        s.avg_carbs,
        s.avg_fat,
        s.protein_target_hit_rate * 100.0,
        s.carbs_target_hit_rate * 100.0,
        s.calories_target_hit_rate * 100.0,
        s.best_protein_day,
        s.worst_protein_day,
    )
}

pub fn format_weekday_weekend(p: &WeekdayWeekendPattern, days: u32) -> String {
    let cal_diff = p.weekend_avg_calories - p.weekday_avg_calories;
    let cal_pct = percent(cal_diff, p.weekday_avg_calories);
    let carbs_diff = p.weekend_avg_carbs - p.weekday_avg_carbs;
    let carbs_pct = percent(carbs_diff, p.weekday_avg_carbs);

    format!(
        "Pattern Analysis - Weekday vs Weekend (Last {days} days):\n\n\
         Weekdays (Mon-Fri):\n\
         - Average calories: {:.0}\n\
         - Average protein: {:.1}g\n\
         - Average carbs: {:.1}g\n\
         - Days logged: {} ({:.0}% consistency)\n\n\
         Weekends (Sat-Sun):\n\
         - Average calories: {:.0} ({:+.0} or {:+.0}%)\n\
         - Average protein: {:.1}g\n\
         - Average carbs: {:.1}g ({:+.0}g or {:+.0}%)\n\
         - Days logged: {} ({:.0}% consistency)\n\n\
         Key Pattern:\n\
         Weekend calories are {:.0}% {} than weekdays, with carbs showing a {:.0}% {}.",
        p.weekday_avg_calories,
        p.weekday_avg_protein,
        p.weekday_avg_carbs,
        p.weekday_count,
        p.weekday_logged_rate * 100.0,
        p.weekend_avg_calories,
        cal_diff,
        cal_pct,
        p.weekend_avg_protein,
        p.weekend_avg_carbs,
        carbs_diff,
        carbs_pct,
        p.weekend_count,
        p.weekend_logged_rate * 100.0,
        cal_pct.abs(),
        if cal_diff > 0.0 { "higher" } else { "lower" },
        carbs_pct.abs(),
        if carbs_diff > 0.0 { "increase" } else { "decrease" },
    )
}

pub fn format_macro_consistency(p: &MacroConsistencyPattern, days: u32) -> String {
    let spreads = [
        ("protein", p.protein_std),
        ("carbs", p.carbs_std),
        ("fat", p.fat_std),
    ];
    // First entry wins ties in both directions.
    let most = spreads
        .iter()
        .fold(spreads[0], |acc, s| if s.1 < acc.1 { *s } else { acc });
    let least = spreads
        .iter()
        .fold(spreads[0], |acc, s| if s.1 > acc.1 { *s } else { acc });

    format!(
        "Macro Consistency Analysis (Last {days} days):\n\n\
         Average Values:\n\
         - Protein: {:.1}g (+/- {:.1}g std dev)\n\
         - Carbs: {:.1}g (+/- {:.1}g std dev)\n\
         - Fat: {:.1}g (+/- {:.1}g std dev)\n\n\
         Consistency:\n\
         - Most consistent: {} (lowest variation day-to-day)\n\
         - Least consistent: {} (highest variation day-to-day)\n\n\
         Pattern:\n\
         Your {} intake is very consistent, while {} varies more from day to day.",
        p.protein_avg,
        p.protein_std,
        p.carbs_avg,
        p.carbs_std,
        p.fat_avg,
        p.fat_std,
        capitalize(most.0),
        capitalize(least.0),
        most.0,
        least.0,
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{
        common::entities::app_errors::CoreError, nutrition::ports::MockNutritionRepository,
    };

    fn ctx() -> ToolContext {
        ToolContext {
            user_id: Uuid::new_v4(),
            today: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        }
    }

    fn logged_summary() -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            total_calories: 1500.0,
            total_protein: 87.0,
            total_carbs: 210.0,
            total_fat: 40.0,
            calories_target: 2000.0,
            protein_target: 160.0,
            carbs_target: 200.0,
            fat_target: 67.0,
            has_logged: true,
        }
    }

    #[test]
    fn test_format_today_status_reports_remaining() {
        let text = format_today_status(Some(&logged_summary()));

        assert!(text.contains("Protein: 87g of 160g (54%)"));
        assert!(text.contains("- Protein: 73g"));
        // Over target clamps to zero remaining.
        assert!(text.contains("- Carbs: 0g"));
    }

    #[test]
    fn test_format_today_status_without_goals() {
        assert!(format_today_status(None).starts_with("No nutrition goals set yet"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("protein"), "Protein");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_weekly_progress_rejects_out_of_range_days() {
        let repository = MockNutritionRepository::new();

        let text = execute_tool(
            CoachTool::WeeklyProgress,
            &repository,
            ctx(),
            &json!({ "days": 31 }),
        )
        .await;

        assert_eq!(text, "Error: days must be between 1 and 30");
    }

    #[tokio::test]
    async fn test_pattern_analysis_rejects_unknown_pattern() {
        let repository = MockNutritionRepository::new();

        let text = execute_tool(
            CoachTool::PatternAnalysis,
            &repository,
            ctx(),
            &json!({ "pattern_type": "weekly_trend" }),
        )
        .await;

        assert!(text.starts_with("Error: pattern_type must be one of"));
    }

    #[tokio::test]
    async fn test_weekly_progress_with_no_rows() {
        let mut repository = MockNutritionRepository::new();
        repository
            .expect_get_summaries_since()
            .withf(|_, since| *since == NaiveDate::from_ymd_opt(2025, 1, 13).unwrap())
            .returning(|_, _| Box::pin(async { Ok(vec![]) }));

        let text = execute_tool(CoachTool::WeeklyProgress, &repository, ctx(), &json!({})).await;

        assert!(text.starts_with("No nutrition data found for the last 7 days"));
    }

    #[tokio::test]
    async fn test_today_status_failure_becomes_apology() {
        let mut repository = MockNutritionRepository::new();
        repository.expect_get_daily_summary().returning(|_, _| {
            Box::pin(async { Err(CoreError::DatabaseError("down".to_string())) })
        });

        let text = execute_tool(CoachTool::TodayStatus, &repository, ctx(), &json!({})).await;

        assert!(text.starts_with("Unable to fetch today's status"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_weekly_progress_times_out() {
        let mut repository = MockNutritionRepository::new();
        repository.expect_get_summaries_since().returning(|_, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(vec![])
            })
        });

        let text = execute_tool(
            CoachTool::WeeklyProgress,
            &repository,
            ctx(),
            &json!({ "days": 7 }),
        )
        .await;

        assert_eq!(text, "Database query timed out. Please try again.");
    }
}
