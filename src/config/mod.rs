//! Configuration loading and validation.

mod settings;

pub use settings::{Config, SchedulingConfig, StorageConfig};
