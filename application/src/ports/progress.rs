//! Progress notification port
//!
//! Defines the interface for reporting progress while a question is being
//! answered.

use synod_domain::{InvocationOutcome, ModelId, PanelPlan, Stage};

/// Callback for progress updates
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once the panel is resolved, before any model is invoked
    fn on_plan(&self, _plan: &PanelPlan) {}

    /// Called when a stage dispatches its models
    fn on_stage_start(&self, stage: Stage, total_tasks: usize);

    /// Called as each model finishes (or times out) within a stage
    fn on_model_complete(&self, stage: Stage, model: &ModelId, outcome: InvocationOutcome);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_tasks: usize) {}
    fn on_model_complete(&self, _stage: Stage, _model: &ModelId, _outcome: InvocationOutcome) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
