//! CLI utilities for infraplan tools
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Progress spinners
//! - Status messages

#![warn(missing_docs)]

pub mod output;
pub mod progress;
