//! Domain layer for synod
//!
//! This crate contains the core rules, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A question is answered by a *panel* of models chosen from the
//! [`ModelRegistry`]. The [`Mode`] picks panel size, rounds and the
//! [`SynthesisStrategy`]; the [`ModeResolver`] turns mode, question signal
//! and budget into a [`PanelPlan`], dropping expensive models when the
//! budget is too small (a *downgrade*, always reported).
//!
//! ## Synthesis
//!
//! Panel outputs are combined into a [`SynthesisResult`]. Agreement and
//! disagreement are reported explicitly; conflicting figures are surfaced,
//! never averaged.
//!
//! ## Tribunal
//!
//! Research, cross-critique, revision and consensus/dissent synthesis,
//! tracked by a [`TribunalSession`] state machine.

pub mod budget;
pub mod config;
pub mod core;
pub mod model;
pub mod orchestration;
pub mod prompt;
pub mod synthesis;
pub mod tribunal;

// Re-export commonly used types
pub use budget::{BudgetCeiling, DenialReason};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    error::DomainError,
    question::{Question, QuestionSignal},
};
pub use model::{
    Capability, CapabilityFloor, CapabilityScores, CapabilityWeights, CostClass, CostUnits,
    ModelDefinition, ModelId, ModelRegistry, ProviderFamily,
};
pub use orchestration::{
    invocation::{InvocationOutcome, ModelInvocation},
    mode::{Mode, ModePolicy, ModePolicyTable, SynthesisStrategy},
    request::{PanelRequest, RequesterId},
    resolver::{ModeResolver, PanelPlan},
    stage::Stage,
};
pub use prompt::{Prompt, PromptTemplate};
pub use synthesis::{
    AgreementSummary, ClaimPosition, ClaimVerdict, ClassifiedClaim, Confidence, ConfidenceLevel,
    Contribution, Disagreement, SynthesisResult,
};
pub use tribunal::{PhaseArtifact, PhaseFailure, TribunalFlag, TribunalSession, TribunalState};
