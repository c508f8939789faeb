//! Tribunal use case
//!
//! Research → anonymised cross-critique → revision → consensus/dissent
//! synthesis. Each phase is a panel run; its output is stored on the
//! [`TribunalSession`] before the next phase starts, so a failure in a later
//! phase keeps everything produced so far.

use super::ask::EngineError;
use super::run_panel::{PanelOrchestrator, PanelOutcome, PanelTask, RunContext, stage_deadline};
use super::synthesize::{SynthesisEngine, SynthesisInput};
use crate::budget::CostLedger;
use crate::config::EngineConfig;
use crate::ports::progress::ProgressNotifier;
use crate::ports::provider::ProviderAdapter;
use std::collections::BTreeMap;
use synod_domain::tribunal::{CritiqueLabels, split_critique_by_label};
use synod_domain::{
    ModelId, PanelPlan, PhaseArtifact, PromptTemplate, Question, Stage, TribunalFlag,
    TribunalSession, TribunalState,
};
use tokio::time::Instant;
use tracing::{info, warn};

pub struct TribunalRunner<'a, P: ProviderAdapter + 'static> {
    orchestrator: &'a PanelOrchestrator<P>,
    config: &'a EngineConfig,
    ledger: &'a dyn CostLedger,
    progress: &'a dyn ProgressNotifier,
}

impl<'a, P: ProviderAdapter + 'static> TribunalRunner<'a, P> {
    pub fn new(
        orchestrator: &'a PanelOrchestrator<P>,
        config: &'a EngineConfig,
        ledger: &'a dyn CostLedger,
        progress: &'a dyn ProgressNotifier,
    ) -> Self {
        Self {
            orchestrator,
            config,
            ledger,
            progress,
        }
    }

    /// Run the full pipeline.
    ///
    /// Returns an error only when research produces nothing; later phase
    /// failures end the session in `FAILED` with a degraded answer attached.
    pub async fn run(
        &self,
        question: &Question,
        context: Option<&str>,
        plan: &PanelPlan,
        deadline: Instant,
    ) -> Result<TribunalSession, EngineError> {
        let mut session = TribunalSession::new(question.clone(), plan.models.clone());

        // Research
        let prompt = PromptTemplate::research(question.content(), context);
        let ctx = self.context(Stage::Research, stage_deadline(deadline, 4));
        let research = self.orchestrator.run(&plan.models, &prompt, &ctx).await?;
        session.record(artifact(Stage::Research, &research));
        info!(briefs = session.working_set().len(), "tribunal research complete");

        if session.working_set().len() == 1 {
            warn!("only one research brief survived; skipping critique and revision");
            session.flag(TribunalFlag::InsufficientPanel);
            session.transition(TribunalState::Synthesizing)?;
            return self.finish(session, plan, deadline).await;
        }

        // Critique
        session.transition(TribunalState::Critiquing)?;
        let labels = CritiqueLabels::new(session.working_set().keys());
        let tasks = critique_tasks(question, session.working_set(), &labels);
        let ctx = self.context(Stage::Critique, stage_deadline(deadline, 3));
        let critiques = match self.orchestrator.run_tasks(tasks, &ctx).await {
            Ok(outcome) => outcome,
            Err(e) => return self.abandon(session, plan, Stage::Critique, e.to_string()),
        };
        session.record(artifact(Stage::Critique, &critiques));
        let received = route_critiques(&critiques.outputs(), &labels);

        // Revision
        session.transition(TribunalState::Revising)?;
        let tasks = session
            .working_set()
            .iter()
            .map(|(model, brief)| {
                let critiques: Vec<&str> = received
                    .get(model)
                    .map(|v| v.iter().map(String::as_str).collect())
                    .unwrap_or_default();
                PanelTask::new(
                    model.clone(),
                    PromptTemplate::revision(question.content(), brief, &critiques),
                )
            })
            .collect();
        let ctx = self.context(Stage::Revision, stage_deadline(deadline, 2));
        let revisions = match self.orchestrator.run_tasks(tasks, &ctx).await {
            Ok(outcome) => outcome,
            Err(e) => return self.abandon(session, plan, Stage::Revision, e.to_string()),
        };
        session.record(artifact(Stage::Revision, &revisions));

        session.transition(TribunalState::Synthesizing)?;
        self.finish(session, plan, deadline).await
    }

    async fn finish(
        &self,
        mut session: TribunalSession,
        plan: &PanelPlan,
        deadline: Instant,
    ) -> Result<TribunalSession, EngineError> {
        let sources = session.working_set().clone();
        let input = SynthesisInput {
            question: session.question(),
            signal: plan.signal,
            strategy: plan.strategy,
            sources: &sources,
            dispatched: plan.panel_size(),
            synthesizer: plan.synthesizer.as_ref(),
        };
        let ctx = self.context(Stage::Synthesis, deadline);
        let synthesis = SynthesisEngine::new(self.orchestrator, self.config)
            .synthesize(&input, &ctx)
            .await;
        session.complete(synthesis)?;
        info!(state = %session.state(), "tribunal finished");
        Ok(session)
    }

    fn abandon(
        &self,
        mut session: TribunalSession,
        plan: &PanelPlan,
        stage: Stage,
        reason: String,
    ) -> Result<TribunalSession, EngineError> {
        warn!(stage = stage.as_str(), "tribunal phase failed: {}", reason);
        session.fail(stage, reason)?;

        let sources = session.working_set().clone();
        let input = SynthesisInput {
            question: session.question(),
            signal: plan.signal,
            strategy: plan.strategy,
            sources: &sources,
            dispatched: plan.panel_size(),
            synthesizer: None,
        };
        let fallback = SynthesisEngine::new(self.orchestrator, self.config)
            .local(&input)
            .with_note(format!("tribunal stopped at {}", stage.display_name()));
        session.attach_fallback(fallback);
        Ok(session)
    }

    fn context(&self, stage: Stage, deadline: Instant) -> RunContext<'a> {
        RunContext::new(stage, deadline, self.ledger, self.progress)
    }
}

fn artifact(stage: Stage, outcome: &PanelOutcome) -> PhaseArtifact {
    PhaseArtifact {
        documents: outcome.outputs(),
        failed: outcome.failed_models(),
        ..PhaseArtifact::new(stage)
    }
}

fn critique_tasks(
    question: &Question,
    briefs: &BTreeMap<ModelId, String>,
    labels: &CritiqueLabels,
) -> Vec<PanelTask> {
    briefs
        .iter()
        .map(|(reviewer, own)| {
            let others: Vec<(&str, &str)> = labels
                .others(reviewer)
                .into_iter()
                .filter_map(|(model, label)| briefs.get(model).map(|b| (label, b.as_str())))
                .collect();
            PanelTask::new(
                reviewer.clone(),
                PromptTemplate::critique(question.content(), own, &others),
            )
        })
        .collect()
}

/// Route each critique section to the model it reviews.
fn route_critiques(
    critiques: &BTreeMap<ModelId, String>,
    labels: &CritiqueLabels,
) -> BTreeMap<ModelId, Vec<String>> {
    let mut received: BTreeMap<ModelId, Vec<String>> = BTreeMap::new();
    for (reviewer, text) in critiques {
        let others: Vec<&str> = labels
            .others(reviewer)
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        for (label, section) in split_critique_by_label(text, &others) {
            if let Some(target) = labels.model_of(&label) {
                received
                    .entry(target.clone())
                    .or_default()
                    .push(section.to_string());
            }
        }
    }
    received
}
