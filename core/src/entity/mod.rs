pub mod daily_summary;
pub mod food_items;
pub mod macro_goals;
pub mod meal_plans;
pub mod user_favorites;
pub mod users;
