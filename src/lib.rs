//! Offer-Sweep: a parallel vehicle-listing harvester
//!
//! This crate drives a browser through a classifieds site's search form,
//! walks the paginated results for every (make, model) pair the site
//! advertises, extracts one fixed-schema record per listing, and merges the
//! per-worker outputs into a single de-duplicated dataset.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod outcome;
pub mod output;
pub mod record;

use thiserror::Error;

/// Main error type for Offer-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser driver error: {0}")]
    Driver(#[from] browser::DriverError),

    #[error("Enumeration failed, search form is not usable: {0}")]
    Enumeration(browser::DriverError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker {worker} failed: {message}")]
    Worker { worker: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Offer-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use outcome::{CombinationOutcome, ListingOutcome};
pub use record::{Combination, Field, Record};
