use std::fmt::Write;

use crate::domain::{
    meal_plan::{
        entities::MacroTotals,
        value_objects::{DaySlot, MAX_FAVORITE_FOODS_IN_PROMPT},
    },
    nutrition::entities::FoodProfile,
};

/// Lower edge of the band the model is asked to land in, as a share of each target.
pub const TARGET_BAND_FLOOR: f64 = 0.98;

pub const DAY_CHUNK_SYSTEM_PROMPT: &str = r#"You are an expert nutritionist creating personalized meal plans.

CRITICAL: Generate 1-2 days of meals with COMPLETE structure for each day.

REQUIRED STRUCTURE:
{
  "daily_target": {"calories": 2000, "protein": 150, "carbs": 200, "fat": 67},
  "days": [
    {
      "date": "2025-01-13",
      "day_name": "Monday",
      "meals": [
        {
          "id": "meal_monday_001_breakfast",
          "name": "Protein Breakfast Bowl",
          "meal_type": "breakfast",
          "foods": [
            {"name": "Greek Yogurt 0% Fat", "quantity_g": 200, "calories": 118, "protein": 20.4, "carbs": 7.2, "fat": 0.8}
          ],
          "totals": {"calories": 118, "protein": 20.4, "carbs": 7.2, "fat": 0.8}
        }
      ],
      "daily_totals": {"calories": 2000, "protein": 150, "carbs": 200, "fat": 67}
    }
  ]
}

ALLOWED VALUES (case-sensitive):
- meal_type: "breakfast", "lunch", "dinner", "snack" (lowercase)
- day_name: "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday" (exact capitalization)
- date format: "YYYY-MM-DD"

REQUIREMENTS:
1. Each day must have 3-4 meals
2. Each meal must have at least 1 food item
3. Daily totals MUST equal the sum of all meal totals for that day
4. Daily totals MUST NEVER EXCEED the user's macro targets
5. Daily totals should be as close as possible to the targets WITHOUT going over
6. Adjust portion sizes (quantity_g) to stay UNDER or AT the targets
7. All numbers >= 0 (quantity_g must be > 0)
8. Ensure variety, do not repeat the same meals

CALCULATION RULES:
- meal.totals = sum of all foods in that meal
- day.daily_totals = sum of all meal.totals for that day
- Aim to get within 1-2% UNDER each target, but NEVER go over

Generate complete, realistic meals with accurate macro calculations."#;

fn band_floor(value: f64) -> f64 {
    value * TARGET_BAND_FLOOR
}

/// Builds the user instruction for one chunk. Deterministic for equal inputs.
pub fn build_chunk_prompt(
    targets: &MacroTotals,
    slots: &[DaySlot],
    preferences: &str,
    favorite_foods: &[FoodProfile],
) -> String {
    let mut prompt = String::new();

    let _ = write!(
        prompt,
        "Create meals for the following day(s):\n\n\
         **Daily Macro Targets:**\n\
         - Calories: {}\n\
         - Protein: {}g\n\
         - Carbohydrates: {}g\n\
         - Fat: {}g\n\n\
         **Days to generate:**\n",
        targets.calories, targets.protein, targets.carbs, targets.fat
    );
    for slot in slots {
        let _ = writeln!(prompt, "- {} ({})", slot.day_name, slot.date.format("%Y-%m-%d"));
    }
    prompt.push('\n');

    let preferences = preferences.trim();
    if !preferences.is_empty() {
        let _ = write!(
            prompt,
            "**CRITICAL USER FOOD PREFERENCES (MUST FOLLOW):**\n{preferences}\n\n\
             **YOU MUST incorporate these preferences into the meal plan. This is a strict requirement!**\n\n"
        );
    }

    if favorite_foods.is_empty() {
        prompt.push_str("**Note:** No favorite foods provided. Use common healthy whole foods.\n\n");
    } else {
        prompt.push_str("**User's Favorite Foods (use these when possible):**\n");
        for food in favorite_foods.iter().take(MAX_FAVORITE_FOODS_IN_PROMPT) {
            let _ = writeln!(
                prompt,
                "- {}: {} cal/100g, P: {}g, C: {}g, F: {}g",
                food.name,
                food.calories_per_100g,
                food.protein_per_100g,
                food.carbs_per_100g,
                food.fat_per_100g
            );
        }
        prompt.push('\n');
    }

    let _ = write!(
        prompt,
        "**CRITICAL INSTRUCTIONS - STRICT UPPER LIMITS:**\n\n\
         YOUR PRIMARY GOAL: Generate meals where daily_totals are AS CLOSE AS POSSIBLE to targets WITHOUT EXCEEDING:\n\n\
         **ABSOLUTE MAXIMUM LIMITS (NEVER EXCEED):**\n\
         - Calories: <= {cal} cal (aim for {cal_floor}-{cal} cal)\n\
         - Protein: <= {p}g (aim for {p_floor:.1}-{p}g)\n\
         - Carbs: <= {c}g (aim for {c_floor:.1}-{c}g)\n\
         - Fat: <= {f}g (aim for {f_floor:.1}-{f}g)\n\n\
         **MANDATORY PROCESS:**\n\
         1. Plan the meals with initial portion sizes\n\
         2. Calculate the totals from all meals\n\
         3. Compare them to the targets above\n\
         4. IF ANY TOTAL EXCEEDS ITS TARGET: reduce portion sizes until all are under\n\
         5. IF TOTALS ARE UNDER: carefully increase portions to get closer (never exceed)\n\
         6. Fine-tune each macro by adjusting specific foods\n\
         7. FINAL VERIFICATION: every daily_totals value must be <= its target\n\n\
         **CALCULATION REQUIREMENTS:**\n\
         - daily_totals = sum of all meal.totals for that day\n\
         - meal.totals = sum of all foods in that meal\n\n\
         **OTHER REQUIREMENTS:**\n\
         - Include realistic portion sizes scaled to the target\n\
         - Prioritize the user's favorite foods when available\n\
         - Use a variety of foods\n\
         - Ensure all calculations are accurate\n\n\
         Please generate the meals now following the exact structure.\n",
        cal = targets.calories,
        cal_floor = band_floor(targets.calories).floor() as i64,
        p = targets.protein,
        p_floor = band_floor(targets.protein),
        c = targets.carbs,
        c_floor = band_floor(targets.carbs),
        f = targets.fat,
        f_floor = band_floor(targets.fat),
    );

    prompt
}

/// Appended to the prompt when the previous answer did not pass validation.
pub fn build_correction_note(reason: &str) -> String {
    format!(
        "\n\n**YOUR PREVIOUS ANSWER WAS REJECTED:** {reason}\n\
         Return the full corrected JSON object for exactly the requested day(s)."
    )
}
