pub mod nutrition_repository;
