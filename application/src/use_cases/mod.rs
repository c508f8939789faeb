//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod ask;
pub mod run_panel;
pub mod run_tribunal;
pub mod synthesize;
