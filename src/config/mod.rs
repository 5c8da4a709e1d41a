//! Configuration module for Pricewalk
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. The configuration is passed explicitly into the tree loader and
//! the dataset store at construction time; its lifecycle is one crawl run.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
