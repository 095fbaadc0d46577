//! Configuration module for Spider-Pool
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use spider_pool::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CancelPolicy, Config, CrawlerConfig, FetcherConfig, FilterConfig,
    DEFAULT_EXCLUDED_EXTENSIONS,
};

pub use parser::{load_config, parse_config};
pub use validation::validate;
