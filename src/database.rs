pub mod device_interaction;
pub mod postgres_repository;
pub mod user;
