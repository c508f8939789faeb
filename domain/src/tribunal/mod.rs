//! Tribunal domain: the research → critique → revise → synthesize pipeline.

pub mod critique;
pub mod session;

pub use critique::{CritiqueLabels, response_label, split_critique_by_label};
pub use session::{PhaseArtifact, PhaseFailure, TribunalFlag, TribunalSession, TribunalState};
