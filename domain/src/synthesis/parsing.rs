//! Synthesizer response parsing.
//!
//! The synthesizer is asked for markdown with `## Answer`, `## Agreement`
//! and `## Disagreement` sections. Parsing is lenient: heading level and
//! common synonyms are accepted, and a response with no recognised answer
//! heading is taken as the answer in full.

use super::value_objects::{AgreementSummary, ClaimPosition, Disagreement};
use crate::model::ModelId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSynthesis {
    pub answer: String,
    pub summary: AgreementSummary,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Answer,
    Agreement,
    Disagreement,
    Other,
}

fn classify_heading(title: &str) -> Section {
    let title = title
        .trim()
        .trim_matches(|c: char| c == '*' || c == ':')
        .to_lowercase();
    match title.as_str() {
        "answer" | "final answer" | "conclusion" | "synthesis" => Section::Answer,
        "agreement" | "agreements" | "points of agreement" | "consensus" => Section::Agreement,
        "disagreement" | "disagreements" | "points of disagreement" | "dissent" => {
            Section::Disagreement
        }
        _ => Section::Other,
    }
}

/// Parse a synthesizer response into the answer and the agreement summary.
pub fn parse_synthesis_response(response: &str) -> ParsedSynthesis {
    let mut answer_lines: Vec<&str> = Vec::new();
    let mut agreement_lines: Vec<&str> = Vec::new();
    let mut disagreement_lines: Vec<&str> = Vec::new();
    let mut saw_answer = false;
    let mut section = Section::Preamble;

    for line in response.lines() {
        if let Some(title) = line.trim_start().strip_prefix('#') {
            section = classify_heading(title.trim_start_matches('#'));
            saw_answer |= section == Section::Answer;
            continue;
        }
        match section {
            Section::Answer => answer_lines.push(line),
            Section::Agreement => agreement_lines.push(line),
            Section::Disagreement => disagreement_lines.push(line),
            Section::Preamble | Section::Other => {}
        }
    }

    let answer = if saw_answer {
        answer_lines.join("\n").trim().to_string()
    } else {
        response.trim().to_string()
    };

    ParsedSynthesis {
        answer,
        summary: AgreementSummary {
            agreements: parse_bullets(&agreement_lines),
            disagreements: parse_disagreements(&disagreement_lines),
        },
    }
}

fn bullet_body(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn is_placeholder(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower == "none"
        || lower == "n/a"
        || lower.starts_with("none.")
        || lower.starts_with("no disagreement")
        || lower.starts_with("no significant disagreement")
}

fn parse_bullets(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| bullet_body(line))
        .filter(|body| !is_placeholder(body))
        .map(str::to_string)
        .collect()
}

/// Top-level bullets are topics; indented `- model: statement` bullets
/// beneath them are the positions.
fn parse_disagreements(lines: &[&str]) -> Vec<Disagreement> {
    let mut out: Vec<Disagreement> = Vec::new();
    for line in lines {
        let Some(body) = bullet_body(line) else {
            continue;
        };
        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented && let Some(current) = out.last_mut() {
            if let Some((model, statement)) = body.split_once(':') {
                let model = model.trim().trim_matches('*').trim_matches('`');
                if !model.is_empty() && !model.contains(' ') {
                    current
                        .positions
                        .push(ClaimPosition::new(ModelId::new(model), statement.trim()));
                }
            }
            continue;
        }
        if !is_placeholder(body) {
            out.push(Disagreement::new(body));
        }
    }
    out
}
