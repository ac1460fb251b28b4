//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the toolkit:
//! - Math types and approximate comparisons
//! - Time measurement
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod time;
