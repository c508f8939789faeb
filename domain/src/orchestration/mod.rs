//! Orchestration domain
//!
//! Modes, requests and the resolver that turns a request into a concrete
//! panel, plus the per-model invocation records a panel run produces.

pub mod invocation;
pub mod mode;
pub mod request;
pub mod resolver;
pub mod stage;
