//! Pricewalk: a grocery catalog price crawler
//!
//! This crate walks every leaf category of a retail grocery catalog, pages
//! through each listing via a browser-automation session, and appends
//! structured price records to a local SQLite dataset.

pub mod browser;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Pricewalk operations
#[derive(Debug, Error)]
pub enum PricewalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The category tree could not be built or loaded. Fatal to the run.
    #[error("Discovery error: {message}")]
    Discovery { message: String },

    /// Pagination setup failed for one category after the one-shot banner
    /// retry. Fatal to that category only.
    #[error("Page control error in category '{category}': {message}")]
    PageControl { category: String, message: String },

    /// Schema mismatch or other storage failure. Fatal to the run, since
    /// silent coercion would corrupt historical data.
    #[error("Persistence error: {0}")]
    Persistence(#[from] storage::StorageError),

    #[error("Automation error: {0}")]
    Automation(#[from] browser::AutomationError),

    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Result type alias for Pricewalk operations
pub type Result<T> = std::result::Result<T, PricewalkError>;

// Re-export commonly used types
pub use browser::{AutomationError, Browser};
pub use catalog::CategoryNode;
pub use config::Config;
pub use crawler::{extract, ItemRecord, PageBatch};
pub use state::{CategoryState, VisitTracker};
