pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use services::ConsumptionService;
