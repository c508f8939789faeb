//! Console output formatter for panel answers

use colored::Colorize;
use synod_application::{AskOutcome, AskResponse};
use synod_domain::{
    ClaimVerdict, ClassifiedClaim, ConfidenceLevel, OutputFormat, PanelPlan, SynthesisResult,
    TribunalSession,
};

/// Claims beyond this many are summarized as a count.
const MAX_CLAIMS_SHOWN: usize = 8;

/// Formats engine responses for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn colored output on or off for the whole process.
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    pub fn render(format: OutputFormat, question: &str, response: &AskResponse) -> String {
        match format {
            OutputFormat::Full => Self::format(question, response),
            OutputFormat::Answer => Self::format_answer_only(response),
            OutputFormat::Json => Self::format_json(response),
        }
    }

    /// Format the complete response
    pub fn format(question: &str, response: &AskResponse) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Synod"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Question:".cyan().bold(), question));
        output.push_str(&Self::plan(&response.plan));

        match &response.outcome {
            AskOutcome::Answer(result) => output.push_str(&Self::synthesis(result)),
            AskOutcome::Tribunal(session) => output.push_str(&Self::tribunal(session)),
            AskOutcome::Crisis(crisis) => {
                output.push_str(&Self::section_header("Response"));
                output.push_str(&format!("\n{}\n", crisis.message));
                for resource in &crisis.resources {
                    output.push_str(&format!("  * {}\n", resource));
                }
            }
        }

        output.push_str(&format!(
            "\n{} {} units\n",
            "Cost:".dimmed(),
            response.cost_units
        ));
        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(response: &AskResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Only the answer text (concise output)
    pub fn format_answer_only(response: &AskResponse) -> String {
        match &response.outcome {
            AskOutcome::Crisis(crisis) => format!("{}\n", crisis.message),
            outcome => match outcome.synthesis() {
                Some(result) => format!("{}\n", result.answer()),
                None => format!("{}\n", "No answer was produced.".red()),
            },
        }
    }

    fn plan(plan: &PanelPlan) -> String {
        let mut output = format!(
            "{} {} ({} question, {})\n",
            "Mode:".cyan().bold(),
            plan.mode.as_str(),
            plan.signal.as_str(),
            plan.strategy
        );
        let panel = plan
            .models
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!("{} {}\n", "Panel:".cyan().bold(), panel));
        if plan.downgraded {
            let dropped = plan
                .dropped
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(
                "{} {}\n",
                "Downgraded to fit the budget; dropped:".yellow().bold(),
                dropped
            ));
        }
        if plan.undersized {
            output.push_str(&format!(
                "{}\n",
                format!("Fewer models were available than {} usually uses", plan.mode)
                    .yellow()
            ));
        }
        output
    }

    fn synthesis(result: &SynthesisResult) -> String {
        let mut output = String::new();

        if result.contributions().len() > 1 {
            output.push_str(&Self::section_header("Contributions"));
            for contribution in result.contributions() {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} (weight {:.1}) ──", contribution.model, contribution.weight)
                        .yellow()
                        .bold(),
                    contribution.text
                ));
            }
        }

        output.push_str(&Self::section_header("Answer"));
        if let Some(synthesizer) = result.synthesizer() {
            output.push_str(&format!(
                "{}\n",
                format!("Synthesized by {}", synthesizer).dimmed()
            ));
        }
        output.push_str(&format!("\n{}\n", result.answer()));

        let summary = result.summary();
        if !summary.agreements.is_empty() {
            output.push_str(&format!("\n{}\n", "Agreement:".green().bold()));
            for point in &summary.agreements {
                output.push_str(&format!("  * {}\n", point));
            }
        }
        if !summary.disagreements.is_empty() {
            output.push_str(&format!("\n{}\n", "Disagreement:".yellow().bold()));
            for disagreement in &summary.disagreements {
                output.push_str(&format!("  * {}\n", disagreement.topic));
                for position in &disagreement.positions {
                    output.push_str(&format!(
                        "      {}: {}\n",
                        position.model.to_string().dimmed(),
                        position.statement
                    ));
                }
            }
        }

        output.push_str(&Self::claims(result.claims()));
        output.push_str(&Self::confidence(result));

        for note in result.notes() {
            output.push_str(&format!("{} {}\n", "Note:".dimmed(), note));
        }
        output
    }

    fn claims(claims: &[ClassifiedClaim]) -> String {
        if claims.is_empty() {
            return String::new();
        }
        let mut output = format!("\n{}\n", "Claims:".cyan().bold());
        for claim in claims.iter().take(MAX_CLAIMS_SHOWN) {
            let verdict = match claim.verdict {
                ClaimVerdict::Unanimous => claim.verdict.as_str().green(),
                ClaimVerdict::Majority => claim.verdict.as_str().yellow(),
                ClaimVerdict::Contested => claim.verdict.as_str().red(),
            };
            output.push_str(&format!(
                "  [{}] {} ({})\n",
                verdict,
                claim.statement,
                claim.supporters.len()
            ));
        }
        if claims.len() > MAX_CLAIMS_SHOWN {
            output.push_str(&format!(
                "  {}\n",
                format!("... and {} more", claims.len() - MAX_CLAIMS_SHOWN).dimmed()
            ));
        }
        output
    }

    fn confidence(result: &SynthesisResult) -> String {
        let confidence = result.confidence();
        let level = match confidence.level {
            ConfidenceLevel::High => confidence.level.as_str().green().bold(),
            ConfidenceLevel::Moderate | ConfidenceLevel::Single => {
                confidence.level.as_str().yellow().bold()
            }
            ConfidenceLevel::Low | ConfidenceLevel::ReducedPanel => {
                confidence.level.as_str().red().bold()
            }
        };
        format!(
            "\n{} {} ({} of {} models answered, {:.0}% agreement)\n",
            "Confidence:".cyan().bold(),
            level,
            confidence.reachable,
            confidence.dispatched,
            confidence.agreement * 100.0
        )
    }

    fn tribunal(session: &TribunalSession) -> String {
        let mut output = Self::section_header("Tribunal");
        output.push_str(&format!("State: {}\n", session.state()));
        for flag in session.flags() {
            output.push_str(&format!("{} {}\n", "Flag:".yellow(), flag.description()));
        }
        if let Some(failure) = session.failure() {
            output.push_str(&format!(
                "{} {}: {}\n",
                "Stopped at".red().bold(),
                failure.stage,
                failure.reason
            ));
        }
        for artifact in session.artifacts() {
            output.push_str(&format!(
                "  {} {} document(s), {} failed\n",
                format!("{}:", artifact.stage).dimmed(),
                artifact.documents.len(),
                artifact.failed.len()
            ));
        }
        if let Some(result) = session.synthesis() {
            output.push_str(&Self::synthesis(result));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synod_domain::{
        AgreementSummary, Confidence, Contribution, Disagreement, Mode, ModelId,
        QuestionSignal, SynthesisStrategy,
    };

    fn plan(downgraded: bool) -> PanelPlan {
        PanelPlan {
            mode: Mode::Council,
            signal: QuestionSignal::Reasoning,
            models: vec![ModelId::new("alpha"), ModelId::new("beta")],
            strategy: SynthesisStrategy::CombineWithDisagreement,
            rounds: 1,
            synthesizer: Some(ModelId::new("alpha")),
            estimated_cost: 12,
            downgraded,
            dropped: if downgraded {
                vec![ModelId::new("gamma")]
            } else {
                vec![]
            },
            undersized: false,
        }
    }

    fn result() -> SynthesisResult {
        let summary = AgreementSummary {
            agreements: vec!["Both prefer tenants".to_string()],
            disagreements: vec![Disagreement::new("Shard count")],
        };
        let contributions = vec![
            Contribution {
                model: ModelId::new("alpha"),
                text: "Shard by tenant.".to_string(),
                excerpted: false,
                weight: 8.0,
            },
            Contribution {
                model: ModelId::new("beta"),
                text: "Shard by tenant, 16 shards.".to_string(),
                excerpted: false,
                weight: 7.0,
            },
        ];
        let confidence = Confidence::assess(2, 2, &summary);
        let claims = (0..10)
            .map(|i| ClassifiedClaim {
                statement: format!("claim {}", i),
                verdict: ClaimVerdict::Majority,
                supporters: vec![ModelId::new("alpha")],
                positions: vec![],
            })
            .collect();
        SynthesisResult::new(
            "Shard by tenant.",
            SynthesisStrategy::CombineWithDisagreement,
            contributions,
            confidence,
        )
        .with_summary(summary)
        .with_claims(claims)
        .with_note("synthesizer alpha unavailable")
    }

    fn response(downgraded: bool) -> AskResponse {
        AskResponse {
            plan: plan(downgraded),
            outcome: AskOutcome::Answer(result()),
            cost_units: 9,
        }
    }

    #[test]
    fn test_full_output_sections() {
        let output = ConsoleFormatter::format("How to shard?", &response(false));
        assert!(output.contains("How to shard?"));
        assert!(output.contains("Shard by tenant, 16 shards."));
        assert!(output.contains("Both prefer tenants"));
        assert!(output.contains("Shard count"));
        assert!(output.contains("synthesizer alpha unavailable"));
        assert!(output.contains("2 of 2 models answered"));
        assert!(!output.contains("Downgraded"));
    }

    #[test]
    fn test_claims_are_capped() {
        let output = ConsoleFormatter::format("q", &response(false));
        assert!(output.contains("claim 7"));
        assert!(!output.contains("claim 8"));
        assert!(output.contains("and 2 more"));
    }

    #[test]
    fn test_downgrade_is_visible() {
        let output = ConsoleFormatter::format("q", &response(true));
        assert!(output.contains("Downgraded to fit the budget; dropped:"));
        assert!(output.contains("gamma"));
    }

    #[test]
    fn test_undersized_panel_is_visible() {
        let mut short = response(false);
        short.plan.undersized = true;
        let output = ConsoleFormatter::format("q", &short);
        assert!(output.contains("Fewer models were available than council usually uses"));
        assert!(!ConsoleFormatter::format("q", &response(false)).contains("Fewer models"));
    }

    #[test]
    fn test_answer_only() {
        let output = ConsoleFormatter::format_answer_only(&response(false));
        assert_eq!(output, "Shard by tenant.\n");
    }

    #[test]
    fn test_json_is_tagged() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&response(true))).unwrap();
        assert_eq!(json["outcome"]["kind"], "answer");
        assert_eq!(json["plan"]["downgraded"], true);
        assert_eq!(json["cost_units"], 9);
    }
}
