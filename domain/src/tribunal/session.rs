//! Tribunal session state machine.
//!
//! ```text
//! Researching ─► Critiquing ─► Revising ─► Synthesizing ─► Complete
//!      │                                        ▲
//!      └────────── (one survivor) ──────────────┘
//! any non-terminal state ─► Failed
//! ```
//!
//! Every phase's output is kept as a [`PhaseArtifact`]; a later failure
//! never discards earlier work.

use crate::core::error::DomainError;
use crate::core::question::Question;
use crate::model::ModelId;
use crate::orchestration::stage::Stage;
use crate::synthesis::SynthesisResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TribunalState {
    Researching,
    Critiquing,
    Revising,
    Synthesizing,
    Complete,
    Failed,
}

impl TribunalState {
    pub fn as_str(&self) -> &str {
        match self {
            TribunalState::Researching => "RESEARCHING",
            TribunalState::Critiquing => "CRITIQUING",
            TribunalState::Revising => "REVISING",
            TribunalState::Synthesizing => "SYNTHESIZING",
            TribunalState::Complete => "COMPLETE",
            TribunalState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TribunalState::Complete | TribunalState::Failed)
    }

    pub fn can_transition_to(&self, next: TribunalState) -> bool {
        use TribunalState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Researching, Critiquing | Synthesizing) => true,
            (Critiquing, Revising) => true,
            (Revising, Synthesizing) => true,
            (Synthesizing, Complete) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TribunalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TribunalFlag {
    /// Only one model survived research; critique and revision were skipped
    InsufficientPanel,
}

impl TribunalFlag {
    pub fn description(&self) -> &str {
        match self {
            TribunalFlag::InsufficientPanel => "insufficient panel for critique",
        }
    }
}

/// Output of one phase: per-model documents plus who failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseArtifact {
    pub stage: Stage,
    pub documents: BTreeMap<ModelId, String>,
    pub failed: Vec<ModelId>,
}

impl PhaseArtifact {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            documents: BTreeMap::new(),
            failed: Vec::new(),
        }
    }
}

/// Why the session ended in `FAILED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFailure {
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TribunalSession {
    question: Question,
    panel: Vec<ModelId>,
    state: TribunalState,
    artifacts: Vec<PhaseArtifact>,
    working_set: BTreeMap<ModelId, String>,
    flags: Vec<TribunalFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<PhaseFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthesis: Option<SynthesisResult>,
}

impl TribunalSession {
    pub fn new(question: Question, panel: Vec<ModelId>) -> Self {
        Self {
            question,
            panel,
            state: TribunalState::Researching,
            artifacts: Vec::new(),
            working_set: BTreeMap::new(),
            flags: Vec::new(),
            failure: None,
            synthesis: None,
        }
    }

    pub fn transition(&mut self, next: TribunalState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Store a phase's output and update the working set.
    ///
    /// Research replaces the working set; revision overrides the documents
    /// of models that revised and leaves the rest as researched. Critiques
    /// are kept only as an artifact.
    pub fn record(&mut self, artifact: PhaseArtifact) {
        match artifact.stage {
            Stage::Research => self.working_set = artifact.documents.clone(),
            Stage::Revision => self.working_set.extend(
                artifact
                    .documents
                    .iter()
                    .map(|(m, d)| (m.clone(), d.clone())),
            ),
            _ => {}
        }
        self.artifacts.push(artifact);
    }

    pub fn flag(&mut self, flag: TribunalFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    pub fn fail(&mut self, stage: Stage, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition(TribunalState::Failed)?;
        self.failure = Some(PhaseFailure {
            stage,
            reason: reason.into(),
        });
        Ok(())
    }

    pub fn complete(&mut self, synthesis: SynthesisResult) -> Result<(), DomainError> {
        self.transition(TribunalState::Complete)?;
        self.synthesis = Some(synthesis);
        Ok(())
    }

    /// Attach the degraded answer built for a failed session.
    pub fn attach_fallback(&mut self, synthesis: SynthesisResult) {
        if self.state == TribunalState::Failed {
            self.synthesis = Some(synthesis);
        }
    }

    /// Swap the stored answer, e.g. after output filtering.
    pub fn replace_synthesis(&mut self, synthesis: SynthesisResult) {
        self.synthesis = Some(synthesis);
    }

    /// Take the stored answer out for filtering.
    pub fn take_synthesis(&mut self) -> Option<SynthesisResult> {
        self.synthesis.take()
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn panel(&self) -> &[ModelId] {
        &self.panel
    }

    pub fn state(&self) -> TribunalState {
        self.state
    }

    pub fn artifacts(&self) -> &[PhaseArtifact] {
        &self.artifacts
    }

    pub fn last_artifact(&self) -> Option<&PhaseArtifact> {
        self.artifacts.last()
    }

    pub fn artifact(&self, stage: Stage) -> Option<&PhaseArtifact> {
        self.artifacts.iter().find(|a| a.stage == stage)
    }

    pub fn working_set(&self) -> &BTreeMap<ModelId, String> {
        &self.working_set
    }

    pub fn flags(&self) -> &[TribunalFlag] {
        &self.flags
    }

    pub fn has_flag(&self, flag: TribunalFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn failure(&self) -> Option<&PhaseFailure> {
        self.failure.as_ref()
    }

    pub fn synthesis(&self) -> Option<&SynthesisResult> {
        self.synthesis.as_ref()
    }
}
