//! Collaborator ports: knowledge retrieval, billing and safety.
//!
//! Each port has an in-process default so the engine runs without any of
//! the surrounding services.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use synod_domain::{CostUnits, Mode, RequesterId, SynthesisResult};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Knowledge retrieval failed: {0}")]
pub struct KnowledgeError(pub String);

/// Supplies retrieved context for a question.
#[async_trait]
pub trait KnowledgeRetrieval: Send + Sync {
    /// May return an empty string; context is optional augmentation.
    async fn fetch_context(&self, query: &str, scope: &RequesterId)
    -> Result<String, KnowledgeError>;
}

/// No knowledge base: always empty context.
pub struct NoKnowledge;

#[async_trait]
impl KnowledgeRetrieval for NoKnowledge {
    async fn fetch_context(
        &self,
        _query: &str,
        _scope: &RequesterId,
    ) -> Result<String, KnowledgeError> {
        Ok(String::new())
    }
}

/// Tier and budget information for a requester.
#[async_trait]
pub trait BillingPort: Send + Sync {
    async fn check_mode_permitted(&self, requester: &RequesterId, mode: Mode) -> bool;

    /// Cost units the requester may spend per rolling window.
    async fn get_budget_ceiling(&self, requester: &RequesterId) -> CostUnits;
}

/// Configuration-driven tier: the same permitted modes for everyone and a
/// default ceiling with optional per-requester overrides.
#[derive(Debug, Clone)]
pub struct StaticBilling {
    permitted: BTreeSet<Mode>,
    ceiling: CostUnits,
    overrides: HashMap<RequesterId, CostUnits>,
}

impl StaticBilling {
    pub fn new(ceiling: CostUnits) -> Self {
        Self {
            permitted: Mode::ALL.into_iter().collect(),
            ceiling,
            overrides: HashMap::new(),
        }
    }

    pub fn with_permitted_modes(mut self, modes: impl IntoIterator<Item = Mode>) -> Self {
        self.permitted = modes.into_iter().collect();
        self
    }

    pub fn with_requester_ceiling(mut self, requester: RequesterId, ceiling: CostUnits) -> Self {
        self.overrides.insert(requester, ceiling);
        self
    }
}

#[async_trait]
impl BillingPort for StaticBilling {
    async fn check_mode_permitted(&self, _requester: &RequesterId, mode: Mode) -> bool {
        self.permitted.contains(&mode)
    }

    async fn get_budget_ceiling(&self, requester: &RequesterId) -> CostUnits {
        self.overrides
            .get(requester)
            .copied()
            .unwrap_or(self.ceiling)
    }
}

/// Replacement response produced by the safety wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrisisResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SafetyVerdict {
    Pass(SynthesisResult),
    Crisis(CrisisResponse),
}

/// Wraps the final output before it reaches the caller.
///
/// A pure transform: implementations must not have side effects visible to
/// the engine.
pub trait SafetyFilter: Send + Sync {
    fn filter_output(&self, result: SynthesisResult) -> SafetyVerdict;
}

pub struct PassThroughSafety;

impl SafetyFilter for PassThroughSafety {
    fn filter_output(&self, result: SynthesisResult) -> SafetyVerdict {
        SafetyVerdict::Pass(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_billing_defaults_and_overrides() {
        let billing = StaticBilling::new(100)
            .with_permitted_modes([Mode::Quick, Mode::Thoughtful])
            .with_requester_ceiling(RequesterId::new("vip"), 1000);

        let anon = RequesterId::default();
        assert!(billing.check_mode_permitted(&anon, Mode::Quick).await);
        assert!(!billing.check_mode_permitted(&anon, Mode::Tribunal).await);
        assert_eq!(billing.get_budget_ceiling(&anon).await, 100);
        assert_eq!(
            billing.get_budget_ceiling(&RequesterId::new("vip")).await,
            1000
        );
    }

    #[tokio::test]
    async fn test_no_knowledge_is_empty() {
        let context = NoKnowledge
            .fetch_context("anything", &RequesterId::default())
            .await
            .unwrap();
        assert!(context.is_empty());
    }
}
