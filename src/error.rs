//! Error types for the chairside booking engine.

use thiserror::Error;

/// Main error type for chairside operations.
#[derive(Error, Debug)]
pub enum ChairsideError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Path expansion failed: {0}")]
    PathExpansion(String),
}

/// Scheduling-rule errors (slot expansion, availability, lookup).
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The requested duration does not fit from the given start slot
    /// without crossing the lunch gap.
    #[error("Invalid slot for duration: {0}")]
    InvalidSlot(String),

    /// The date or slot is legal but cannot be booked: weekend, leave,
    /// meeting, reserved morning, or already occupied.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Update or cancel matched no stored appointment.
    #[error("Appointment not found: {0}")]
    NotFound(String),

    /// A slot or duration label failed to parse.
    #[error("Unrecognized label: {0}")]
    ParseLabel(String),
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A multi-slot write landed in only some of its slots and the
    /// compensating removal failed too. The message names the slots
    /// still holding copies.
    #[error("Partial write: {written} of {expected} slot copies remain: {detail}")]
    PartialWrite {
        written: usize,
        expected: usize,
        detail: String,
    },

    /// Backend-specific persistence failure.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for chairside operations.
pub type Result<T> = std::result::Result<T, ChairsideError>;
