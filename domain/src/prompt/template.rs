//! Prompt templates for every stage of a panel run

use crate::model::ModelId;
use crate::orchestration::mode::SynthesisStrategy;
use crate::synthesis::Disagreement;
use serde::{Deserialize, Serialize};

/// A system + user prompt pair sent to one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// One labelled source handed to the synthesizer.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisSource<'a> {
    pub model: &'a ModelId,
    pub weight: f64,
    pub text: &'a str,
}

/// System prompt for synthesizer passes. Adapters may key on it.
pub const SYNTHESIS_SYSTEM: &str = r#"You are the synthesizer for a panel of independent experts.
Combine their answers into one accurate answer. Prefer claims that are well supported and
give more weight to experts with a higher weight. Never average or blend conflicting numbers
or facts: report each conflicting position as stated, attributed to its expert.

Respond in markdown with exactly these sections:
## Answer
## Agreement
## Disagreement"#;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    pub fn panel_system() -> &'static str {
        r#"You are a knowledgeable expert answering a question independently.
Be concise but comprehensive. Support your points with reasoning and examples where appropriate.
State figures precisely. Focus on accuracy and clarity."#
    }

    pub fn panel(question: &str, context: Option<&str>) -> Prompt {
        Prompt::new(
            Self::panel_system(),
            format!(
                "{}Please answer the following question:\n\n{}\n\nProvide a clear, well-structured response.",
                context_block(context),
                question
            ),
        )
    }

    /// Contemplate round 2: every model sees every round-1 answer.
    pub fn roundtable(question: &str, context: Option<&str>, answers: &[(&ModelId, &str)]) -> Prompt {
        let mut user = format!(
            "{}Original question: {}\n\nA panel of experts answered independently:\n",
            context_block(context),
            question
        );
        for (model, answer) in answers {
            user.push_str(&format!("\n--- {} ---\n{}\n", model, answer));
        }
        user.push_str(
            "\nConsider the other answers carefully. Keep what is right, fix what is wrong, \
and give your refined answer to the original question.",
        );
        Prompt::new(
            r#"You are an expert in a roundtable discussion. You have already seen the question
and now read every panelist's first answer, possibly including your own. Produce a refined answer."#,
            user,
        )
    }

    pub fn research(question: &str, context: Option<&str>) -> Prompt {
        Prompt::new(
            r#"You are a researcher preparing an independent brief. Work on your own; other experts
are researching the same question separately. Cite concrete facts and figures and list your key
claims as bullet points."#,
            format!(
                "{}Research the following question and write a thorough brief:\n\n{}",
                context_block(context),
                question
            ),
        )
    }

    /// Cross-critique: `own` is the model's research, `others` are the
    /// anonymised briefs of the rest of the panel.
    pub fn critique(question: &str, own: &str, others: &[(&str, &str)]) -> Prompt {
        let mut user = format!(
            "Original question: {}\n\nYour own brief:\n{}\n\nBriefs from other experts:\n",
            question, own
        );
        for (label, brief) in others {
            user.push_str(&format!("\n### {}\n{}\n", label, brief));
        }
        user.push_str(
            "\nCritique each brief under its own heading (for example `### Response A`). \
Point out factual errors, unsupported claims, and omissions. Be specific.",
        );
        Prompt::new(
            r#"You are a critical reviewer. Evaluate other experts' briefs objectively and
constructively. Identify both strengths and weaknesses."#,
            user,
        )
    }

    pub fn revision(question: &str, own: &str, critiques: &[&str]) -> Prompt {
        let mut user = format!(
            "Original question: {}\n\nYour brief:\n{}\n\nCritiques you received:\n",
            question, own
        );
        if critiques.is_empty() {
            user.push_str("\n(no critiques were received)\n");
        }
        for (i, critique) in critiques.iter().enumerate() {
            user.push_str(&format!("\n--- Reviewer {} ---\n{}\n", i + 1, critique));
        }
        user.push_str(
            "\nRevise your brief. Address valid criticism, keep what holds up, and state \
explicitly where you still disagree.",
        );
        Prompt::new(
            r#"You are revising your own research after peer critique."#,
            user,
        )
    }

    pub fn synthesis_system() -> &'static str {
        SYNTHESIS_SYSTEM
    }

    /// Synthesizer prompt. `conflicts` are figures the local detector already
    /// found in disagreement; the synthesizer must keep them apart.
    pub fn synthesis(
        question: &str,
        strategy: SynthesisStrategy,
        sources: &[SynthesisSource<'_>],
        conflicts: &[Disagreement],
    ) -> Prompt {
        let mut user = format!("Original question: {}\n\nExpert answers:\n", question);
        for source in sources {
            user.push_str(&format!(
                "\n--- {} (weight {:.1}) ---\n{}\n",
                source.model, source.weight, source.text
            ));
        }

        if !conflicts.is_empty() {
            user.push_str("\nThe following conflicting claims were detected. Do not merge them:\n");
            for conflict in conflicts {
                user.push_str(&format!("- {}\n", conflict.topic));
                for position in &conflict.positions {
                    user.push_str(&format!("  - {}: {}\n", position.model, position.statement));
                }
            }
        }

        user.push_str(match strategy {
            SynthesisStrategy::DeepWeightedCombine => {
                "\nThe experts have already discussed each other's answers. Produce a deep, \
carefully reasoned final answer that resolves what can be resolved."
            }
            SynthesisStrategy::CombineWithDisagreement => {
                "\nThe user will see every expert's answer. Make the disagreements explicit: \
under ## Disagreement list each topic as a bullet with indented `- expert-id: position` bullets."
            }
            SynthesisStrategy::ConsensusDissent => {
                "\nThese are revised briefs after cross-critique. State the consensus first, then \
the dissent. Under ## Disagreement list each contested topic with indented `- expert-id: position` \
bullets quoting each side verbatim."
            }
            SynthesisStrategy::WeightedCombine | SynthesisStrategy::PassThrough => {
                "\nCombine the answers into a single best answer."
            }
        });

        Prompt::new(SYNTHESIS_SYSTEM, user)
    }
}

fn context_block(context: Option<&str>) -> String {
    match context {
        Some(context) if !context.trim().is_empty() => {
            format!("Reference material:\n{}\n\n", context.trim())
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::ClaimPosition;

    #[test]
    fn test_panel_prompt_includes_context() {
        let prompt = PromptTemplate::panel("What is Rust?", Some("Rust 1.85 notes"));
        assert!(prompt.user.contains("What is Rust?"));
        assert!(prompt.user.starts_with("Reference material:\nRust 1.85 notes"));

        let bare = PromptTemplate::panel("What is Rust?", None);
        assert!(!bare.user.contains("Reference material"));
    }

    #[test]
    fn test_critique_prompt_uses_labels() {
        let prompt = PromptTemplate::critique(
            "What is Rust?",
            "My brief",
            &[("Response A", "Systems language."), ("Response C", "Has a GC.")],
        );
        assert!(prompt.user.contains("### Response A"));
        assert!(prompt.user.contains("### Response C"));
        assert!(prompt.user.contains("My brief"));
    }

    #[test]
    fn test_synthesis_prompt_lists_sources_and_conflicts() {
        let a = ModelId::new("model-a");
        let b = ModelId::new("model-b");
        let sources = [
            SynthesisSource { model: &a, weight: 8.25, text: "42 is the answer." },
            SynthesisSource { model: &b, weight: 7.0, text: "41 is the answer." },
        ];
        let conflict = Disagreement::new("the answer")
            .with_position(ClaimPosition::new(a.clone(), "42 is the answer."))
            .with_position(ClaimPosition::new(b.clone(), "41 is the answer."));
        let prompt = PromptTemplate::synthesis(
            "What is the answer?",
            SynthesisStrategy::WeightedCombine,
            &sources,
            &[conflict],
        );
        assert_eq!(prompt.system, SYNTHESIS_SYSTEM);
        assert!(prompt.user.contains("--- model-a (weight 8.2) ---")
            || prompt.user.contains("--- model-a (weight 8.3) ---"));
        assert!(prompt.user.contains("  - model-b: 41 is the answer."));
    }

    #[test]
    fn test_revision_without_critiques() {
        let prompt = PromptTemplate::revision("Q?", "brief", &[]);
        assert!(prompt.user.contains("no critiques were received"));
    }
}
