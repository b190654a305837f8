//! ui
//!
//! Output utilities.

pub mod output;
