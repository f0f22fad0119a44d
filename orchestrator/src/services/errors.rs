use thiserror::Error;

use crate::migration::types::MigrationDirection;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Snapshot error: {reading} - {message}")]
    Snapshot { reading: String, message: String },

    #[error("Migration attempt already running for {direction}")]
    AlreadyRunning { direction: MigrationDirection },

    #[error("Cannot start a migration from the {status} state")]
    NotReady { status: String },

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl From<String> for MigrationError {
    fn from(message: String) -> Self {
        MigrationError::Unknown { message }
    }
}

impl From<&str> for MigrationError {
    fn from(message: &str) -> Self {
        MigrationError::Unknown {
            message: message.to_string(),
        }
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    /// Planning-time errors abort an attempt before any operation has been
    /// submitted; everything in flight is reported through `Fiasco` instead.
    pub fn is_planning(&self) -> bool {
        matches!(self, MigrationError::Snapshot { .. })
    }
}
