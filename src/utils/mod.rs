//! Utilities Module
//!
//! Common utilities used across the crate.

mod cache;
mod http;
pub mod logging;

pub use cache::*;
pub use http::*;
