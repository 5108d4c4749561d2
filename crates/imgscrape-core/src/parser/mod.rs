//! Parsers for search API responses
//!
//! - `search`: decode a result page and pull image locators out of it

pub mod search;

// Re-export main parsing functions
pub use search::{extract_locators, parse_search_page, plan_batch};
