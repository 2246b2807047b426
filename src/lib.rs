pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod runner;
pub mod telemetry;

pub use error::{MigrationError, Result};
