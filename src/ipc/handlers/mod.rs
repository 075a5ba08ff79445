pub mod analytics;
pub mod assistant;
pub mod backup_exchange;
pub mod chapters;
pub mod core;
pub mod planner;
pub mod records;
pub mod revision;
pub mod setup;
pub mod tools;
