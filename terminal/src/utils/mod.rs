//! # Utility Functions
//!
//! Shared utility functions used across the terminal application.
//!
//! ## Modules
//!
//! - **[`runtime`]**: Background tokio runtime for timers outside an ambient runtime
//! - **[`validation`]**: Input validation (replica addresses, amounts, transfer sides)
//!
//! ## Related Modules
//!
//! - [`shared::utils`]: Amount and identifier formatting
//! - [`crate::core`]: Configuration and error types

pub mod runtime;
pub mod validation;
