pub mod mappers;
pub mod repositories;

pub use repositories::nutrition_repository::PostgresNutritionRepository;
