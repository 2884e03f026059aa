pub mod api;
pub mod config;
pub mod detection;
pub mod entities;
pub mod favorites;
pub mod metrics;
pub mod migrator;
pub mod retention;
pub mod storage;
pub mod telemetry;

pub use sea_orm;
