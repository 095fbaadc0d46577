//! URL handling module for Spider-Pool
//!
//! This module provides URL canonicalization, domain pattern matching and the
//! link filter that decides which discovered links are worth a crawl step.

mod filter;
mod matcher;
mod normalize;

pub use filter::LinkFilter;
pub use matcher::matches_domain_pattern;
pub use normalize::canonicalize;
