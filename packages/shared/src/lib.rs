//! Utilities shared across Parlor packages.

pub mod logger;
pub mod time;
