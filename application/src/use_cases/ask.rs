//! Ask use case
//!
//! The entry point for answering one [`PanelRequest`]: resolve the panel,
//! pass the budget guard, fetch context, run the mode's pipeline and filter
//! the result.
//!
//! ```text
//! resolve ─► admit ─► context ─► Quick/Thoughtful/Council: panel ─► synthesis
//!                               Contemplate: panel ─► roundtable ─► synthesis
//!                               Tribunal:    research ─► critique ─► revision ─► synthesis
//! ```

use super::run_panel::{PanelError, PanelOrchestrator, PanelTask, RunContext, stage_deadline};
use super::run_tribunal::TribunalRunner;
use super::synthesize::{SynthesisEngine, SynthesisInput};
use crate::budget::{Admission, BudgetGuard};
use crate::config::EngineConfig;
use crate::ports::collaborators::{
    CrisisResponse, KnowledgeRetrieval, NoKnowledge, PassThroughSafety, SafetyFilter,
    SafetyVerdict,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::provider::ProviderAdapter;
use serde::Serialize;
use std::sync::Arc;
use synod_domain::{
    CostUnits, DenialReason, DomainError, Mode, ModeResolver, ModelId, ModelInvocation,
    ModelRegistry, PanelPlan, PanelRequest, PromptTemplate, Stage, SynthesisResult,
    TribunalSession,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

/// Errors returned to the caller of [`PanelEngine::ask`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("All models unavailable ({} dispatched)", failed.len())]
    AllModelsUnavailable { failed: Vec<ModelInvocation> },

    #[error("Request denied: {reason}")]
    BudgetDenied { reason: DenialReason },

    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("No eligible models for mode {0}")]
    NoEligibleModels(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<DomainError> for EngineError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidMode(mode) => EngineError::InvalidMode(mode),
            DomainError::NoEligibleModels(mode) => EngineError::NoEligibleModels(mode),
            other => EngineError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<PanelError> for EngineError {
    fn from(e: PanelError) -> Self {
        match e {
            PanelError::EmptyPanel => EngineError::InvalidRequest("no models to run".to_string()),
            PanelError::AllModelsUnavailable { failed } => {
                EngineError::AllModelsUnavailable { failed }
            }
        }
    }
}

/// What the engine produced for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AskOutcome {
    Answer(SynthesisResult),
    Tribunal(TribunalSession),
    /// The safety filter replaced the answer
    Crisis(CrisisResponse),
}

impl AskOutcome {
    /// The synthesized answer, if the outcome carries one.
    pub fn synthesis(&self) -> Option<&SynthesisResult> {
        match self {
            AskOutcome::Answer(result) => Some(result),
            AskOutcome::Tribunal(session) => session.synthesis(),
            AskOutcome::Crisis(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub plan: PanelPlan,
    pub outcome: AskOutcome,
    /// Units actually committed for this request
    pub cost_units: CostUnits,
}

/// Answers questions with a panel of models.
pub struct PanelEngine<P: ProviderAdapter + 'static> {
    orchestrator: PanelOrchestrator<P>,
    registry: Arc<ModelRegistry>,
    config: EngineConfig,
    guard: Arc<BudgetGuard>,
    knowledge: Arc<dyn KnowledgeRetrieval>,
    safety: Arc<dyn SafetyFilter>,
}

impl<P: ProviderAdapter + 'static> PanelEngine<P> {
    pub fn new(
        provider: Arc<P>,
        registry: Arc<ModelRegistry>,
        config: EngineConfig,
        guard: Arc<BudgetGuard>,
    ) -> Self {
        let orchestrator = PanelOrchestrator::new(provider, registry.clone())
            .with_sampling(config.panel)
            .with_retry(config.retry);
        Self {
            orchestrator,
            registry,
            config,
            guard,
            knowledge: Arc::new(NoKnowledge),
            safety: Arc::new(PassThroughSafety),
        }
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeRetrieval>) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_safety(mut self, safety: Arc<dyn SafetyFilter>) -> Self {
        self.safety = safety;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Resolve the panel for a request without invoking anything.
    pub fn plan(&self, request: &PanelRequest) -> Result<PanelPlan, EngineError> {
        let plan = ModeResolver::new(&self.registry, &self.config.modes)
            .with_minimum_score(self.config.minimum_score)
            .resolve(
                request.mode(),
                request.question().signal(),
                request.ceiling(),
            )?;
        Ok(plan)
    }

    pub async fn ask(&self, request: &PanelRequest) -> Result<AskResponse, EngineError> {
        self.ask_with_progress(request, &NoProgress).await
    }

    pub async fn ask_with_progress(
        &self,
        request: &PanelRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<AskResponse, EngineError> {
        let deadline = Instant::now() + self.deadline_for(request);
        let plan = self.plan(request)?;
        info!(
            mode = %plan.mode,
            signal = ?plan.signal,
            models = plan.panel_size(),
            estimated_cost = plan.estimated_cost,
            "panel resolved"
        );
        if plan.downgraded {
            warn!(
                mode = %plan.mode,
                dropped = ?plan.dropped,
                "panel downgraded to fit the budget"
            );
        }
        if plan.undersized {
            warn!(
                mode = %plan.mode,
                models = plan.panel_size(),
                "fewer eligible models than the mode's minimum panel"
            );
        }
        progress.on_plan(&plan);

        let admission = self
            .guard
            .admit(
                request.requester(),
                plan.mode,
                plan.estimated_cost,
                request.ceiling().max_cost,
            )
            .await
            .map_err(|reason| EngineError::BudgetDenied { reason })?;

        let context = self.context_for(request).await;
        let outcome = match plan.mode {
            Mode::Tribunal => {
                let session = TribunalRunner::new(
                    &self.orchestrator,
                    &self.config,
                    &admission,
                    progress,
                )
                .run(request.question(), context.as_deref(), &plan, deadline)
                .await?;
                AskOutcome::Tribunal(session)
            }
            Mode::Contemplate => {
                let result = self
                    .contemplate(request, context.as_deref(), &plan, deadline, &admission, progress)
                    .await?;
                AskOutcome::Answer(result)
            }
            Mode::Quick | Mode::Thoughtful | Mode::Council => {
                let result = self
                    .single_round(request, context.as_deref(), &plan, deadline, &admission, progress)
                    .await?;
                AskOutcome::Answer(result)
            }
        };

        let outcome = self.filter(outcome);
        let cost_units = admission.spent();
        info!(mode = %plan.mode, cost_units, "request complete");
        Ok(AskResponse {
            plan,
            outcome,
            cost_units,
        })
    }

    async fn single_round(
        &self,
        request: &PanelRequest,
        context: Option<&str>,
        plan: &PanelPlan,
        deadline: Instant,
        admission: &Admission,
        progress: &dyn ProgressNotifier,
    ) -> Result<SynthesisResult, EngineError> {
        let prompt = PromptTemplate::panel(request.question().content(), context);
        let ctx = RunContext::new(
            Stage::Panel,
            stage_deadline(deadline, plan.mode.stage_count()),
            admission,
            progress,
        );
        let outcome = self.orchestrator.run(&plan.models, &prompt, &ctx).await?;

        let sources = outcome.outputs();
        let input = SynthesisInput {
            question: request.question(),
            signal: plan.signal,
            strategy: plan.strategy,
            sources: &sources,
            dispatched: plan.panel_size(),
            synthesizer: plan.synthesizer.as_ref(),
        };
        let ctx = RunContext::new(Stage::Synthesis, deadline, admission, progress);
        Ok(SynthesisEngine::new(&self.orchestrator, &self.config)
            .synthesize(&input, &ctx)
            .await)
    }

    /// Two rounds: independent answers, then every model refines its answer
    /// after reading the whole first round.
    async fn contemplate(
        &self,
        request: &PanelRequest,
        context: Option<&str>,
        plan: &PanelPlan,
        deadline: Instant,
        admission: &Admission,
        progress: &dyn ProgressNotifier,
    ) -> Result<SynthesisResult, EngineError> {
        let question = request.question().content();
        let prompt = PromptTemplate::panel(question, context);
        let ctx = RunContext::new(
            Stage::Panel,
            stage_deadline(deadline, 3),
            admission,
            progress,
        );
        let first = self.orchestrator.run(&plan.models, &prompt, &ctx).await?;
        let first_outputs = first.outputs();

        let answers: Vec<(&ModelId, &str)> = first_outputs
            .iter()
            .map(|(m, t)| (m, t.as_str()))
            .collect();
        let prompt = PromptTemplate::roundtable(question, context, &answers);
        // Only models that answered the first round take part.
        let tasks = plan
            .models
            .iter()
            .filter(|m| first_outputs.contains_key(*m))
            .map(|m| PanelTask::new(m.clone(), prompt.clone()))
            .collect();
        let ctx = RunContext::new(
            Stage::Roundtable,
            stage_deadline(deadline, 2),
            admission,
            progress,
        );
        let (sources, note) = match self.orchestrator.run_tasks(tasks, &ctx).await {
            Ok(second) => (second.outputs(), None),
            Err(e) => {
                warn!("roundtable failed, using first-round answers: {}", e);
                (first_outputs, Some("roundtable failed; first-round answers used"))
            }
        };

        let input = SynthesisInput {
            question: request.question(),
            signal: plan.signal,
            strategy: plan.strategy,
            sources: &sources,
            dispatched: plan.panel_size(),
            synthesizer: plan.synthesizer.as_ref(),
        };
        let ctx = RunContext::new(Stage::Synthesis, deadline, admission, progress);
        let result = SynthesisEngine::new(&self.orchestrator, &self.config)
            .synthesize(&input, &ctx)
            .await;
        Ok(match note {
            Some(note) => result.with_note(note),
            None => result,
        })
    }

    fn deadline_for(&self, request: &PanelRequest) -> std::time::Duration {
        let limit = request.ceiling().max_duration;
        if limit.is_zero() {
            self.config.default_deadline
        } else {
            limit
        }
    }

    /// Context attached to the request wins; otherwise ask the knowledge
    /// port. Retrieval failures are logged and the question goes out bare.
    async fn context_for(&self, request: &PanelRequest) -> Option<String> {
        if let Some(context) = request.context() {
            return Some(context.to_string());
        }
        match self
            .knowledge
            .fetch_context(request.question().content(), request.requester())
            .await
        {
            Ok(context) if !context.trim().is_empty() => Some(context),
            Ok(_) => None,
            Err(e) => {
                warn!("knowledge retrieval failed: {}", e);
                None
            }
        }
    }

    fn filter(&self, outcome: AskOutcome) -> AskOutcome {
        match outcome {
            AskOutcome::Answer(result) => match self.safety.filter_output(result) {
                SafetyVerdict::Pass(result) => AskOutcome::Answer(result),
                SafetyVerdict::Crisis(crisis) => AskOutcome::Crisis(crisis),
            },
            AskOutcome::Tribunal(mut session) => match session.take_synthesis() {
                Some(result) => match self.safety.filter_output(result) {
                    SafetyVerdict::Pass(result) => {
                        session.replace_synthesis(result);
                        AskOutcome::Tribunal(session)
                    }
                    SafetyVerdict::Crisis(crisis) => AskOutcome::Crisis(crisis),
                },
                None => AskOutcome::Tribunal(session),
            },
            crisis @ AskOutcome::Crisis(_) => crisis,
        }
    }
}
