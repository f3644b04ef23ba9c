//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Logging targets and initialization

pub mod math;
pub mod logging;
