//! # Tawsil Support
//!
//! Shared utilities for the Tawsil DI framework.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - Logging setup on top of `tracing-subscriber`

pub mod logging;
pub mod rendering;
