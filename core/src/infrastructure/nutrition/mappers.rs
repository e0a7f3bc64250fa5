use crate::{
    domain::nutrition::entities::{DailySummary, FoodProfile, MacroGoals},
    entity::{daily_summary, food_items, macro_goals, user_favorites},
};

impl From<daily_summary::Model> for DailySummary {
    fn from(model: daily_summary::Model) -> Self {
        Self {
            date: model.date,
            total_calories: model.total_calories,
            total_protein: model.total_protein,
            total_carbs: model.total_carbs,
            total_fat: model.total_fat,
            calories_target: model.calories_target,
            protein_target: model.protein_target,
            carbs_target: model.carbs_target,
            fat_target: model.fat_target,
            has_logged: model.has_logged,
        }
    }
}

impl From<macro_goals::Model> for MacroGoals {
    fn from(model: macro_goals::Model) -> Self {
        Self {
            date: model.date,
            calories_target: model.calories_target,
            protein_target: model.protein_target,
            carbs_target: model.carbs_target,
            fat_target: model.fat_target,
        }
    }
}

impl From<(user_favorites::Model, food_items::Model)> for FoodProfile {
    fn from((favorite, food): (user_favorites::Model, food_items::Model)) -> Self {
        Self {
            name: food.name,
            calories_per_100g: food.calories_per_100g,
            protein_per_100g: food.protein_per_100g,
            carbs_per_100g: food.carbs_per_100g,
            fat_per_100g: food.fat_per_100g,
            last_quantity_g: favorite.last_quantity_g,
        }
    }
}
