//! Application-level configuration.
//!
//! - [`EngineConfig`] - deadlines, sampling, retry and mode policy
//! - [`RetryPolicy`] - transient-error retry within one invocation

pub mod engine;

pub use engine::{EngineConfig, RetryPolicy, Sampling};
