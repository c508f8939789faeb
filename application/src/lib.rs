//! Application layer for synod
//!
//! This crate contains use cases, port definitions, budget enforcement and
//! engine configuration. It depends only on the domain layer.

pub mod budget;
pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use budget::{Admission, BudgetGuard, CostLedger, NoLedger, Usage};
pub use config::{EngineConfig, RetryPolicy, Sampling};
pub use ports::{
    collaborators::{
        BillingPort, CrisisResponse, KnowledgeError, KnowledgeRetrieval, NoKnowledge,
        PassThroughSafety, SafetyFilter, SafetyVerdict, StaticBilling,
    },
    progress::{NoProgress, ProgressNotifier},
    provider::{ErrorKind, InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError},
};
pub use use_cases::ask::{AskOutcome, AskResponse, EngineError, PanelEngine};
pub use use_cases::run_panel::{PanelError, PanelOrchestrator, PanelOutcome, PanelTask, RunContext};
pub use use_cases::run_tribunal::TribunalRunner;
pub use use_cases::synthesize::{SynthesisEngine, SynthesisInput};
