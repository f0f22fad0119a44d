//! Migration transaction orchestrator for the exchange trading UI.

pub mod migration;
pub mod services;
pub mod utils;

pub use migration::{MigrationSession, MigrationState};
pub use services::errors::{MigrationError, MigrationResult};
