pub mod coach;
pub mod common;
pub mod llm;
pub mod meal_plan;
pub mod nutrition;
pub mod user;
