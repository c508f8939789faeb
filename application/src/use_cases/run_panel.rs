//! Run Panel use case
//!
//! Dispatches one prompt (or one prompt per model) to a panel concurrently
//! and collects the results under a deadline. Every later stage (synthesis,
//! roundtable, tribunal phases) is built from this primitive.

use crate::budget::CostLedger;
use crate::config::{RetryPolicy, Sampling};
use crate::ports::progress::ProgressNotifier;
use crate::ports::provider::{InvokeOutput, InvokeRequest, ProviderAdapter, ProviderError};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use synod_domain::{
    CostClass, CostUnits, InvocationOutcome, ModelId, ModelInvocation, ModelRegistry, Prompt,
    Stage,
};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a panel run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("No models to run")]
    EmptyPanel,

    #[error("All models unavailable ({} dispatched)", failed.len())]
    AllModelsUnavailable { failed: Vec<ModelInvocation> },
}

/// One model with the prompt it should receive.
#[derive(Debug, Clone)]
pub struct PanelTask {
    pub model: ModelId,
    pub prompt: Prompt,
}

impl PanelTask {
    pub fn new(model: ModelId, prompt: Prompt) -> Self {
        Self { model, prompt }
    }
}

/// Result of a panel run. Both lists are ordered by model id.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelOutcome {
    pub completed: Vec<ModelInvocation>,
    pub failed: Vec<ModelInvocation>,
}

impl PanelOutcome {
    pub fn dispatched(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    /// Successful outputs keyed by model id.
    pub fn outputs(&self) -> BTreeMap<ModelId, String> {
        self.completed
            .iter()
            .map(|inv| (inv.model.clone(), inv.output.clone()))
            .collect()
    }

    pub fn failed_models(&self) -> Vec<ModelId> {
        self.failed.iter().map(|inv| inv.model.clone()).collect()
    }
}

/// Per-run parameters.
pub struct RunContext<'a> {
    pub stage: Stage,
    pub deadline: Instant,
    pub ledger: &'a dyn CostLedger,
    pub progress: &'a dyn ProgressNotifier,
    /// Overrides the orchestrator's default sampling
    pub sampling: Option<Sampling>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        stage: Stage,
        deadline: Instant,
        ledger: &'a dyn CostLedger,
        progress: &'a dyn ProgressNotifier,
    ) -> Self {
        Self {
            stage,
            deadline,
            ledger,
            progress,
            sampling: None,
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = Some(sampling);
        self
    }
}

/// Split what is left of `deadline` evenly over the remaining stages.
pub fn stage_deadline(deadline: Instant, stages_left: u32) -> Instant {
    let now = Instant::now();
    now + deadline.saturating_duration_since(now) / stages_left.max(1)
}

struct Attempt {
    result: Result<InvokeOutput, ProviderError>,
    attempts: u32,
    /// Units billed by failed attempts
    billed: CostUnits,
}

struct Pending {
    started_at: DateTime<Utc>,
    cost_class: CostClass,
}

/// Concurrent dispatch over a [`ProviderAdapter`]
pub struct PanelOrchestrator<P: ProviderAdapter + 'static> {
    provider: Arc<P>,
    registry: Arc<ModelRegistry>,
    sampling: Sampling,
    retry: RetryPolicy,
}

impl<P: ProviderAdapter + 'static> PanelOrchestrator<P> {
    pub fn new(provider: Arc<P>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            provider,
            registry,
            sampling: Sampling::new(2048, 0.7),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Send the same prompt to every model.
    pub async fn run(
        &self,
        models: &[ModelId],
        prompt: &Prompt,
        ctx: &RunContext<'_>,
    ) -> Result<PanelOutcome, PanelError> {
        let tasks = models
            .iter()
            .map(|m| PanelTask::new(m.clone(), prompt.clone()))
            .collect();
        self.run_tasks(tasks, ctx).await
    }

    /// Run every task concurrently until all finish or the deadline elapses.
    ///
    /// Tasks still running at the deadline are cancelled without waiting for
    /// them and recorded as timeouts, charged at their estimated cost.
    pub async fn run_tasks(
        &self,
        tasks: Vec<PanelTask>,
        ctx: &RunContext<'_>,
    ) -> Result<PanelOutcome, PanelError> {
        if tasks.is_empty() {
            return Err(PanelError::EmptyPanel);
        }

        info!(stage = ctx.stage.as_str(), models = tasks.len(), "dispatching panel");
        ctx.progress.on_stage_start(ctx.stage, tasks.len());

        let sampling = ctx.sampling.unwrap_or(self.sampling);
        let cancel = CancellationToken::new();
        let mut join_set = JoinSet::new();
        let mut pending: HashMap<ModelId, Pending> = HashMap::new();
        let mut completed = Vec::new();
        let mut failed = Vec::new();

        for task in tasks {
            let started_at = Utc::now();
            let Some(definition) = self.registry.get(&task.model) else {
                warn!(model = %task.model, "model not in registry");
                let invocation = ModelInvocation::failure(
                    task.model.clone(),
                    started_at,
                    InvocationOutcome::Error,
                    "unknown model",
                );
                ctx.progress
                    .on_model_complete(ctx.stage, &task.model, invocation.outcome);
                failed.push(invocation);
                continue;
            };
            if pending.contains_key(&task.model) {
                warn!(model = %task.model, "duplicate panel member ignored");
                continue;
            }

            let request = InvokeRequest {
                model: task.model.clone(),
                family: definition.family,
                cost_class: definition.cost_class,
                prompt: task.prompt,
                max_tokens: sampling.max_tokens,
                temperature: sampling.temperature,
                deadline: ctx.deadline,
                cancel: cancel.child_token(),
            };
            pending.insert(
                task.model.clone(),
                Pending {
                    started_at,
                    cost_class: definition.cost_class,
                },
            );

            let provider = Arc::clone(&self.provider);
            let retry = self.retry;
            join_set.spawn(async move {
                let attempt = invoke_with_retry(provider.as_ref(), &request, retry).await;
                (request.model, attempt)
            });
        }

        let deadline = tokio::time::sleep_until(ctx.deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                joined = join_set.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };
                    match joined {
                        Ok((model, attempt)) => {
                            let Some(state) = pending.remove(&model) else {
                                continue;
                            };
                            let invocation = self.record(ctx, model, state, attempt);
                            if invocation.is_success() {
                                completed.push(invocation);
                            } else {
                                failed.push(invocation);
                            }
                        }
                        Err(e) => {
                            // the model is resolved below as still pending
                            warn!("Task join error: {}", e);
                        }
                    }
                }
                _ = &mut deadline => {
                    cancel.cancel();
                    join_set.abort_all();
                    for (model, state) in pending.drain() {
                        let estimate = state.cost_class.units();
                        warn!(model = %model, stage = ctx.stage.as_str(), "deadline elapsed, cancelled");
                        ctx.ledger.commit(&model, estimate);
                        ctx.progress
                            .on_model_complete(ctx.stage, &model, InvocationOutcome::Timeout);
                        failed.push(
                            ModelInvocation::failure(
                                model,
                                state.started_at,
                                InvocationOutcome::Timeout,
                                "deadline elapsed",
                            )
                            .with_cost(estimate, false),
                        );
                    }
                    break;
                }
            }
        }

        // tasks that panicked never reported back
        for (model, state) in pending.drain() {
            ctx.progress
                .on_model_complete(ctx.stage, &model, InvocationOutcome::Error);
            failed.push(ModelInvocation::failure(
                model,
                state.started_at,
                InvocationOutcome::Error,
                "task failed",
            ));
        }

        completed.sort_by(|a, b| a.model.cmp(&b.model));
        failed.sort_by(|a, b| a.model.cmp(&b.model));
        ctx.progress.on_stage_complete(ctx.stage);

        info!(
            stage = ctx.stage.as_str(),
            completed = completed.len(),
            failed = failed.len(),
            "panel finished"
        );

        if completed.is_empty() {
            return Err(PanelError::AllModelsUnavailable { failed });
        }
        Ok(PanelOutcome { completed, failed })
    }

    fn record(
        &self,
        ctx: &RunContext<'_>,
        model: ModelId,
        state: Pending,
        attempt: Attempt,
    ) -> ModelInvocation {
        let invocation = match attempt.result {
            Ok(output) => {
                let cost = output.cost_units + attempt.billed;
                ModelInvocation::success(model, state.started_at, output.text, cost)
            }
            Err(e) => ModelInvocation::failure(
                model,
                state.started_at,
                InvocationOutcome::Error,
                e.to_string(),
            )
            .with_cost(attempt.billed, true),
        }
        .with_attempts(attempt.attempts);

        if invocation.cost_units > 0 {
            ctx.ledger.commit(&invocation.model, invocation.cost_units);
        }
        ctx.progress
            .on_model_complete(ctx.stage, &invocation.model, invocation.outcome);

        if invocation.is_success() {
            info!(
                model = %invocation.model,
                stage = ctx.stage.as_str(),
                elapsed_ms = invocation.elapsed_ms(),
                cost = invocation.cost_units,
                "model completed"
            );
        } else {
            warn!(
                model = %invocation.model,
                stage = ctx.stage.as_str(),
                attempts = invocation.attempts,
                error = invocation.error.as_deref().unwrap_or_default(),
                "model failed"
            );
        }
        invocation
    }
}

/// Retry transient errors while the backoff still fits before the deadline.
async fn invoke_with_retry<P: ProviderAdapter + ?Sized>(
    provider: &P,
    request: &InvokeRequest,
    retry: RetryPolicy,
) -> Attempt {
    let mut attempts = 0;
    let mut billed = 0;
    loop {
        attempts += 1;
        match provider.invoke(request).await {
            Ok(output) => {
                return Attempt {
                    result: Ok(output),
                    attempts,
                    billed,
                };
            }
            Err(e) => {
                billed += e.billed_units;
                let retryable = e.is_transient()
                    && attempts < retry.max_attempts
                    && !request.cancel.is_cancelled()
                    && request.remaining() > retry.backoff;
                if !retryable {
                    return Attempt {
                        result: Err(e),
                        attempts,
                        billed,
                    };
                }
                debug!(
                    model = %request.model,
                    provider = provider.name(),
                    attempt = attempts,
                    "transient error, retrying: {}",
                    e
                );
                tokio::time::sleep(retry.backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::NoLedger;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{RecordingLedger, Script, ScriptedProvider, registry};
    use std::time::Duration;

    fn ctx<'a>(ledger: &'a dyn CostLedger, secs: u64) -> RunContext<'a> {
        RunContext::new(
            Stage::Panel,
            Instant::now() + Duration::from_secs(secs),
            ledger,
            &NoProgress,
        )
    }

    fn ids(invocations: &[ModelInvocation]) -> Vec<&str> {
        invocations.iter().map(|i| i.model.as_str()).collect()
    }

    fn orchestrator(provider: ScriptedProvider) -> PanelOrchestrator<ScriptedProvider> {
        PanelOrchestrator::new(Arc::new(provider), Arc::new(registry(&["a", "b", "c"])))
    }

    fn models() -> Vec<ModelId> {
        ["a", "b", "c"].into_iter().map(ModelId::new).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_ordered_by_id_not_completion() {
        let provider = ScriptedProvider::new()
            .script("a", Script::reply("A").after(Duration::from_millis(300)))
            .script("b", Script::reply("B").after(Duration::from_millis(10)))
            .script("c", Script::reply("C").after(Duration::from_millis(100)));
        let outcome = orchestrator(provider)
            .run(&models(), &Prompt::new("s", "q"), &ctx(&NoLedger, 10))
            .await
            .unwrap();
        assert_eq!(ids(&outcome.completed), vec!["a", "b", "c"]);
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_partial_results() {
        let provider = ScriptedProvider::new()
            .script("a", Script::reply("A").after(Duration::from_secs(1)))
            .script("b", Script::reply("B").after(Duration::from_secs(60)))
            .script("c", Script::reply("C").after(Duration::from_secs(2)));
        let ledger = RecordingLedger::default();
        let started = Instant::now();
        let outcome = orchestrator(provider)
            .run(&models(), &Prompt::new("s", "q"), &ctx(&ledger, 5))
            .await
            .unwrap();

        assert!(Instant::now() - started <= Duration::from_secs(5));
        assert_eq!(ids(&outcome.completed), vec!["a", "c"]);
        assert_eq!(outcome.failed.len(), 1);
        let timed_out = &outcome.failed[0];
        assert_eq!(timed_out.outcome, InvocationOutcome::Timeout);
        assert!(!timed_out.cost_reported);
        // a, c reported; b charged at its estimate
        assert_eq!(ledger.total(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_are_unavailable() {
        let provider = ScriptedProvider::new()
            .script("a", Script::fail_permanent("bad key"))
            .script("b", Script::hang())
            .script("c", Script::fail_permanent("no such model"));
        let err = orchestrator(provider)
            .run(&models(), &Prompt::new("s", "q"), &ctx(&NoLedger, 3))
            .await
            .unwrap_err();
        let PanelError::AllModelsUnavailable { failed } = err else {
            panic!("expected AllModelsUnavailable");
        };
        assert_eq!(ids(&failed), vec!["a", "b", "c"]);
        assert_eq!(failed[1].outcome, InvocationOutcome::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_retried_once() {
        let provider = Arc::new(
            ScriptedProvider::new().script("a", Script::reply("ok").failing_first(1)),
        );
        let orchestrator =
            PanelOrchestrator::new(Arc::clone(&provider), Arc::new(registry(&["a"])));
        let outcome = orchestrator
            .run(&[ModelId::new("a")], &Prompt::new("s", "q"), &ctx(&NoLedger, 10))
            .await
            .unwrap();
        assert_eq!(outcome.completed[0].attempts, 2);
        assert_eq!(provider.calls_for("a"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_not_retried() {
        let provider =
            Arc::new(ScriptedProvider::new().script("a", Script::fail_permanent("denied")));
        let orchestrator = PanelOrchestrator::new(
            Arc::clone(&provider),
            Arc::new(registry(&["a", "b"])),
        );
        let outcome = orchestrator
            .run(
                &[ModelId::new("a"), ModelId::new("b")],
                &Prompt::new("s", "q"),
                &ctx(&NoLedger, 10),
            )
            .await
            .unwrap();
        assert_eq!(provider.calls_for("a"), 1);
        assert_eq!(outcome.failed[0].attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_billing_on_failure_is_committed() {
        let provider = ScriptedProvider::new()
            .script("a", Script::fail_permanent("content policy").billed(2))
            .script("b", Script::reply("B"));
        let ledger = RecordingLedger::default();
        let outcome = PanelOrchestrator::new(Arc::new(provider), Arc::new(registry(&["a", "b"])))
            .run(
                &[ModelId::new("a"), ModelId::new("b")],
                &Prompt::new("s", "q"),
                &ctx(&ledger, 10),
            )
            .await
            .unwrap();
        assert_eq!(outcome.failed[0].cost_units, 2);
        assert!(outcome.failed[0].cost_reported);
        assert_eq!(ledger.total(), 3);
    }

    #[tokio::test]
    async fn test_empty_panel() {
        let err = orchestrator(ScriptedProvider::new())
            .run(&[], &Prompt::new("s", "q"), &ctx(&NoLedger, 1))
            .await
            .unwrap_err();
        assert_eq!(err, PanelError::EmptyPanel);
    }

    #[test]
    fn test_stage_deadline_splits_remaining_time() {
        let now = Instant::now();
        let deadline = now + Duration::from_secs(40);
        let first = stage_deadline(deadline, 4);
        assert!(first <= deadline);
        assert!(first.saturating_duration_since(now) <= Duration::from_secs(10));
    }
}
