//! Catalog-Crawler: an authenticated category tree crawler
//!
//! This crate walks a retailer's category tree (home → category →
//! sub-category → product links) depth-first, and flattens what it finds into
//! one tabular record per sub-category.

pub mod config;
pub mod crawler;
pub mod output;
pub mod session;
pub mod tree;

use thiserror::Error;

/// Main error type for Catalog-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),
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

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Navigation failures; every variant names the URL involved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Navigation timeout for {url}")]
    Timeout { url: String },

    #[error("Cannot navigate to '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to open browsing context: {0}")]
    Context(String),
}

/// Session state loading errors. None of these abort a crawl.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No session entries for origin {0}")]
    NoMatchingOrigin(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for navigations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlReport};
pub use session::AuthState;
pub use tree::{CategoryNode, CrawlRecord, ProductLeaf, SubCategoryNode};
