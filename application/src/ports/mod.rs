//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters and surrounding
//! services must implement.

pub mod collaborators;
pub mod progress;
pub mod provider;
