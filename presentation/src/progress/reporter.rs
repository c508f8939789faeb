//! Progress reporting while a panel answers

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use synod_application::ProgressNotifier;
use synod_domain::{InvocationOutcome, ModelId, PanelPlan, Stage};

/// Reports progress with one bar per stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn outcome_mark(model: &ModelId, outcome: InvocationOutcome) -> String {
    match outcome {
        InvocationOutcome::Success => format!("{} {}", "v".green(), model),
        InvocationOutcome::Timeout => format!("{} {} (timed out)", "~".yellow(), model),
        InvocationOutcome::Error | InvocationOutcome::Cancelled => {
            format!("{} {} ({})", "x".red(), model, outcome)
        }
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_plan(&self, plan: &PanelPlan) {
        if plan.downgraded {
            let _ = self.multi.println(format!(
                "{} panel reduced to {} model(s) to fit the budget",
                "!".yellow().bold(),
                plan.panel_size()
            ));
        }
        if plan.undersized {
            let _ = self.multi.println(format!(
                "{} only {} model(s) eligible for {} mode",
                "!".yellow().bold(),
                plan.panel_size(),
                plan.mode
            ));
        }
    }

    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(stage.display_name().to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.stage_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_model_complete(&self, _stage: Stage, model: &ModelId, outcome: InvocationOutcome) {
        if let Ok(slot) = self.stage_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(outcome_mark(model, outcome));
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        if let Ok(mut slot) = self.stage_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{} complete", stage.as_str().green()));
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_plan(&self, plan: &PanelPlan) {
        eprintln!(
            "{} {} mode, {} model(s)",
            "->".cyan(),
            plan.mode.as_str().bold(),
            plan.panel_size()
        );
    }

    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            stage.display_name().bold(),
            total_tasks
        );
    }

    fn on_model_complete(&self, _stage: Stage, model: &ModelId, outcome: InvocationOutcome) {
        eprintln!("  {}", outcome_mark(model, outcome));
    }

    fn on_stage_complete(&self, _stage: Stage) {}
}
