//! # DashStory Common Library
//!
//! Shared code for the DashStory services:
//! - Error types
//! - Bootstrap configuration loading (TOML file + environment)
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
