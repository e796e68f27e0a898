//! Utilities module
//!
//! Contains error handling, logging helpers, and token estimation

pub mod error;
pub mod logging;
pub mod tokens;
