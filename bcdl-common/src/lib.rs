//! # bcdl common library
//!
//! Shared code for the bcdl workspace:
//! - Error type for I/O and configuration failures
//! - TOML configuration loading
//! - Human-readable time formatting

pub mod config;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};
