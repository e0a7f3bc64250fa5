pub mod generate_meal_plan;
pub mod get_meal_plan;
pub mod regenerate_plan_day;
pub mod update_plan_day;
