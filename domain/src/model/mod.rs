//! Model catalog domain
//!
//! - [`definition`] - identifiers, provider families, cost classes and
//!   capability scores
//! - [`weights`] - question-signal to capability weight policy
//! - [`registry`] - the immutable catalog with eligibility queries
//! - [`catalog`] - built-in default models

pub mod catalog;
pub mod definition;
pub mod registry;
pub mod weights;

pub use definition::{
    Capability, CapabilityScores, CostClass, CostUnits, ModelDefinition, ModelId, ProviderFamily,
};
pub use registry::{CapabilityFloor, ModelRegistry};
pub use weights::CapabilityWeights;
