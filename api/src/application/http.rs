pub mod coach;
pub mod health;
pub mod meal_plan;
pub mod server;
