//! Synthesis use case
//!
//! Combines the completed outputs of a panel into one [`SynthesisResult`].
//! A single output passes through untouched; several outputs go through one
//! synthesizer pass. Synthesis never fails: if the synthesizer is
//! unavailable a local answer is built from the best-weighted contribution.

use crate::config::EngineConfig;
use crate::ports::provider::ProviderAdapter;
use crate::use_cases::run_panel::{PanelOrchestrator, RunContext};
use std::collections::BTreeMap;
use synod_domain::core::string::excerpt;
use synod_domain::prompt::SynthesisSource;
use synod_domain::synthesis::{ClaimReport, classify_claims, parse_synthesis_response};
use synod_domain::{
    AgreementSummary, CapabilityWeights, ClaimVerdict, Confidence, Contribution, ModelId,
    PromptTemplate, Question, QuestionSignal, Stage, SynthesisResult, SynthesisStrategy,
};
use tracing::{debug, info, warn};

/// What to synthesize.
pub struct SynthesisInput<'a> {
    pub question: &'a Question,
    pub signal: QuestionSignal,
    pub strategy: SynthesisStrategy,
    /// Completed outputs keyed (and therefore ordered) by model id
    pub sources: &'a BTreeMap<ModelId, String>,
    /// How many models were originally dispatched
    pub dispatched: usize,
    pub synthesizer: Option<&'a ModelId>,
}

pub struct SynthesisEngine<'a, P: ProviderAdapter + 'static> {
    orchestrator: &'a PanelOrchestrator<P>,
    config: &'a EngineConfig,
}

impl<'a, P: ProviderAdapter + 'static> SynthesisEngine<'a, P> {
    pub fn new(orchestrator: &'a PanelOrchestrator<P>, config: &'a EngineConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    pub async fn synthesize(
        &self,
        input: &SynthesisInput<'_>,
        ctx: &RunContext<'_>,
    ) -> SynthesisResult {
        if input.sources.len() == 1 {
            return self.pass_through(input);
        }
        let synthesizer = match input.synthesizer {
            Some(model) if input.strategy.needs_synthesizer() => model,
            _ => return self.local(input),
        };

        let contributions = self.contributions(input);
        let report = self.claims(input);
        let sources: Vec<SynthesisSource<'_>> = contributions
            .iter()
            .map(|c| SynthesisSource {
                model: &c.model,
                weight: c.weight,
                text: input.sources[&c.model].as_str(),
            })
            .collect();
        let prompt = PromptTemplate::synthesis(
            input.question.content(),
            input.strategy,
            &sources,
            &report.conflicts,
        );

        let synth_ctx = RunContext::new(Stage::Synthesis, ctx.deadline, ctx.ledger, ctx.progress)
            .with_sampling(self.config.synthesis);
        let outcome = self
            .orchestrator
            .run(std::slice::from_ref(synthesizer), &prompt, &synth_ctx)
            .await;

        let parsed = match outcome {
            Ok(outcome) => outcome
                .completed
                .first()
                .map(|inv| parse_synthesis_response(&inv.output))
                .filter(|parsed| !parsed.answer.is_empty()),
            Err(e) => {
                warn!(synthesizer = %synthesizer, "synthesizer unavailable: {}", e);
                None
            }
        };
        let Some(parsed) = parsed else {
            return self
                .local(input)
                .with_note(format!("synthesizer {} unavailable", synthesizer));
        };

        let mut summary = parsed.summary;
        summary.merge_conflicts(report.conflicts);
        let confidence = Confidence::assess(input.dispatched, input.sources.len(), &summary);
        info!(
            strategy = input.strategy.as_str(),
            sources = input.sources.len(),
            confidence = confidence.level.as_str(),
            "synthesis complete"
        );

        let mut result =
            SynthesisResult::new(parsed.answer, input.strategy, contributions, confidence)
                .with_synthesizer(synthesizer.clone())
                .with_summary(summary);
        if input.strategy == SynthesisStrategy::ConsensusDissent {
            result = result.with_claims(report.claims);
        }
        result
    }

    /// Build a result without calling any model: the answer is the
    /// highest-weighted contribution, agreement comes from the local claim
    /// detector.
    pub fn local(&self, input: &SynthesisInput<'_>) -> SynthesisResult {
        if input.sources.len() == 1 {
            return self.pass_through(input);
        }

        let contributions = self.contributions(input);
        let report = self.claims(input);
        let best = contributions
            .iter()
            .max_by(|a, b| a.weight.total_cmp(&b.weight).then_with(|| b.model.cmp(&a.model)));

        let summary = AgreementSummary {
            agreements: report
                .claims
                .iter()
                .filter(|c| c.verdict == ClaimVerdict::Unanimous)
                .map(|c| c.statement.clone())
                .collect(),
            disagreements: report.conflicts.clone(),
        };
        let confidence = Confidence::assess(input.dispatched, input.sources.len(), &summary);
        let (answer, note) = match best {
            Some(best) => (
                input.sources[&best.model].clone(),
                format!("answer taken from {} without a synthesizer pass", best.model),
            ),
            None => (String::new(), "no outputs to synthesize".to_string()),
        };
        debug!(strategy = input.strategy.as_str(), "local synthesis");

        let mut result = SynthesisResult::new(answer, input.strategy, contributions, confidence)
            .with_summary(summary)
            .with_note(note);
        if input.strategy == SynthesisStrategy::ConsensusDissent {
            result = result.with_claims(report.claims);
        }
        result
    }

    fn pass_through(&self, input: &SynthesisInput<'_>) -> SynthesisResult {
        let summary = AgreementSummary::default();
        let confidence = Confidence::assess(input.dispatched, input.sources.len(), &summary);
        let answer = input.sources.values().next().cloned().unwrap_or_default();
        let weights = CapabilityWeights::for_signal(input.signal);
        let contributions = input
            .sources
            .iter()
            .map(|(model, text)| Contribution {
                model: model.clone(),
                text: text.clone(),
                excerpted: false,
                weight: self.weight(&weights, model),
            })
            .collect();

        let result = SynthesisResult::new(
            answer,
            SynthesisStrategy::PassThrough,
            contributions,
            confidence,
        );
        if input.dispatched > 1 {
            result.with_note(format!(
                "only 1 of {} models answered; synthesis skipped",
                input.dispatched
            ))
        } else {
            result
        }
    }

    fn contributions(&self, input: &SynthesisInput<'_>) -> Vec<Contribution> {
        let weights = CapabilityWeights::for_signal(input.signal);
        let full = input.strategy.shows_full_outputs();
        input
            .sources
            .iter()
            .map(|(model, text)| {
                let shown = if full {
                    text.clone()
                } else {
                    excerpt(text, self.config.excerpt_chars)
                };
                Contribution {
                    model: model.clone(),
                    excerpted: shown != *text,
                    text: shown,
                    weight: self.weight(&weights, model),
                }
            })
            .collect()
    }

    fn weight(&self, weights: &CapabilityWeights, model: &ModelId) -> f64 {
        self.orchestrator
            .registry()
            .get(model)
            .map(|d| weights.score(&d.scores))
            .unwrap_or(0.0)
    }

    fn claims(&self, input: &SynthesisInput<'_>) -> ClaimReport {
        let sources: Vec<(ModelId, &str)> = input
            .sources
            .iter()
            .map(|(m, t)| (m.clone(), t.as_str()))
            .collect();
        classify_claims(&sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::NoLedger;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{Script, ScriptedProvider, registry};
    use std::sync::Arc;
    use std::time::Duration;
    use synod_domain::ConfidenceLevel;
    use tokio::time::Instant;

    const SYNTH_REPLY: &str = "## Answer\nCombined.\n\n## Agreement\n- Both agree\n\n## Disagreement\n- None\n";

    fn sources(pairs: &[(&str, &str)]) -> BTreeMap<ModelId, String> {
        pairs
            .iter()
            .map(|(m, t)| (ModelId::new(*m), t.to_string()))
            .collect()
    }

    fn input<'a>(
        question: &'a Question,
        sources: &'a BTreeMap<ModelId, String>,
        strategy: SynthesisStrategy,
        synthesizer: Option<&'a ModelId>,
    ) -> SynthesisInput<'a> {
        SynthesisInput {
            question,
            signal: QuestionSignal::General,
            strategy,
            sources,
            dispatched: sources.len(),
            synthesizer,
        }
    }

    fn orchestrator(provider: ScriptedProvider) -> PanelOrchestrator<ScriptedProvider> {
        PanelOrchestrator::new(Arc::new(provider), Arc::new(registry(&["a", "b", "c"])))
    }

    fn ctx() -> RunContext<'static> {
        RunContext::new(
            Stage::Panel,
            Instant::now() + Duration::from_secs(30),
            &NoLedger,
            &NoProgress,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_source_passes_through() {
        let orchestrator = orchestrator(ScriptedProvider::new());
        let config = EngineConfig::default();
        let engine = SynthesisEngine::new(&orchestrator, &config);
        let question = Question::new("Q?");
        let srcs = sources(&[("a", "raw output")]);
        let mut inp = input(&question, &srcs, SynthesisStrategy::WeightedCombine, None);
        inp.dispatched = 3;

        let result = engine.synthesize(&inp, &ctx()).await;
        assert_eq!(result.answer(), "raw output");
        assert_eq!(result.strategy(), SynthesisStrategy::PassThrough);
        assert_eq!(result.confidence().level, ConfidenceLevel::ReducedPanel);
        assert_eq!(result.contributions().len(), 1);
        assert!(!result.notes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesizer_pass_is_parsed() {
        let provider = ScriptedProvider::new().with_synthesis(Script::reply(SYNTH_REPLY));
        let orchestrator = orchestrator(provider);
        let config = EngineConfig::default();
        let engine = SynthesisEngine::new(&orchestrator, &config);
        let question = Question::new("Q?");
        let srcs = sources(&[("a", "First answer text."), ("b", "Second answer text.")]);
        let synth = ModelId::new("a");
        let inp = input(
            &question,
            &srcs,
            SynthesisStrategy::WeightedCombine,
            Some(&synth),
        );

        let result = engine.synthesize(&inp, &ctx()).await;
        assert_eq!(result.answer(), "Combined.");
        assert_eq!(result.synthesizer(), Some(&synth));
        assert_eq!(result.summary().agreements, vec!["Both agree".to_string()]);
        assert_eq!(result.confidence().level, ConfidenceLevel::High);
        let models: Vec<_> = result.contributions().iter().map(|c| c.model.as_str()).collect();
        assert_eq!(models, vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesizer_failure_falls_back_locally() {
        let provider =
            ScriptedProvider::new().with_synthesis(Script::fail_permanent("overloaded"));
        let orchestrator = orchestrator(provider);
        let config = EngineConfig::default();
        let engine = SynthesisEngine::new(&orchestrator, &config);
        let question = Question::new("Q?");
        let srcs = sources(&[("a", "Alpha answer."), ("b", "Beta answer.")]);
        let synth = ModelId::new("a");
        let inp = input(
            &question,
            &srcs,
            SynthesisStrategy::WeightedCombine,
            Some(&synth),
        );

        let result = engine.synthesize(&inp, &ctx()).await;
        // equal weights: lowest id wins
        assert_eq!(result.answer(), "Alpha answer.");
        assert_eq!(result.synthesizer(), None);
        assert!(result.notes().iter().any(|n| n.contains("unavailable")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_numeric_conflicts_surface_even_if_synthesizer_blends() {
        let provider = ScriptedProvider::new()
            .with_synthesis(Script::reply("## Answer\nAbout 1,290 meters.\n"));
        let orchestrator = orchestrator(provider);
        let config = EngineConfig::default();
        let engine = SynthesisEngine::new(&orchestrator, &config);
        let question = Question::new("How long is the bridge?");
        let srcs = sources(&[
            ("a", "The bridge spans 1,280 meters across the bay."),
            ("b", "The bridge spans 1,300 meters across the bay."),
        ]);
        let synth = ModelId::new("a");
        let inp = input(
            &question,
            &srcs,
            SynthesisStrategy::CombineWithDisagreement,
            Some(&synth),
        );

        let result = engine.synthesize(&inp, &ctx()).await;
        let disagreements = &result.summary().disagreements;
        assert_eq!(disagreements.len(), 1);
        assert_eq!(disagreements[0].positions.len(), 2);
        assert_ne!(result.confidence().level, ConfidenceLevel::High);
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_excerpts_long_outputs() {
        let provider = ScriptedProvider::new().with_synthesis(Script::reply(SYNTH_REPLY));
        let orchestrator = orchestrator(provider);
        let config = EngineConfig::default().with_excerpt_chars(20);
        let engine = SynthesisEngine::new(&orchestrator, &config);
        let question = Question::new("Q?");
        let long = "word ".repeat(50);
        let srcs = sources(&[("a", long.as_str()), ("b", "short")]);
        let synth = ModelId::new("a");
        let inp = input(
            &question,
            &srcs,
            SynthesisStrategy::WeightedCombine,
            Some(&synth),
        );

        let result = engine.synthesize(&inp, &ctx()).await;
        assert!(result.contributions()[0].excerpted);
        assert!(!result.contributions()[1].excerpted);
    }
}
