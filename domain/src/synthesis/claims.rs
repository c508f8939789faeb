//! Local claim detection.
//!
//! Splits each source's output into statements, groups statements that talk
//! about the same thing (content-word Jaccard similarity) and classifies each
//! group as unanimous, majority or contested. Groups whose members cite
//! different numbers are always contested, and every side is kept verbatim:
//! conflicting figures are never averaged or merged.

use super::value_objects::{ClaimPosition, ClaimVerdict, ClassifiedClaim, Disagreement};
use crate::core::string::excerpt;
use crate::model::ModelId;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Similarity at which two statements are considered the same claim.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Statements with fewer content words are not treated as claims.
const MIN_CONTENT_WORDS: usize = 2;

const TOPIC_CHARS: usize = 80;

static RE_LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+").expect("valid regex"));
static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+(?:[.,][0-9]+)*").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "but", "not", "with", "this", "that", "these",
    "those", "from", "into", "than", "then", "there", "their", "they", "its", "has", "have",
    "had", "will", "would", "can", "could", "should", "may", "might", "also", "more", "most",
    "some", "such", "very", "about", "which", "what", "when", "where", "who", "how", "all",
    "any", "each", "other", "our", "you", "your", "is", "be", "been", "being", "it", "of",
    "to", "in", "on", "at", "by", "or", "as", "an", "a",
];

/// Outcome of classifying every claim across the sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimReport {
    pub claims: Vec<ClassifiedClaim>,
    /// Claims on which sources cite different figures
    pub conflicts: Vec<Disagreement>,
}

impl ClaimReport {
    pub fn contested(&self) -> impl Iterator<Item = &ClassifiedClaim> {
        self.claims
            .iter()
            .filter(|c| c.verdict == ClaimVerdict::Contested)
    }
}

struct Statement<'a> {
    source: usize,
    text: &'a str,
    words: BTreeSet<String>,
    numbers: BTreeSet<String>,
}

/// Classify the claims made across `sources`.
///
/// `sources` should be in a stable order (the engine passes them sorted by
/// model id); the output order follows first appearance.
pub fn classify_claims(sources: &[(ModelId, &str)]) -> ClaimReport {
    let statements: Vec<Statement<'_>> = sources
        .iter()
        .enumerate()
        .flat_map(|(source, (_, text))| extract_statements(source, text))
        .collect();

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for (idx, statement) in statements.iter().enumerate() {
        let best = clusters
            .iter()
            .enumerate()
            .map(|(c, members)| (c, jaccard(&statements[members[0]].words, &statement.words)))
            .filter(|(_, sim)| *sim >= SIMILARITY_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

        match best {
            Some((c, _)) => {
                // a source repeating itself is not extra support
                if clusters[c]
                    .iter()
                    .all(|m| statements[*m].source != statement.source)
                {
                    clusters[c].push(idx);
                }
            }
            None => clusters.push(vec![idx]),
        }
    }

    let total = sources.len();
    let mut report = ClaimReport::default();
    for members in clusters {
        let members: Vec<&Statement<'_>> = members.iter().map(|m| &statements[*m]).collect();
        let positions = || -> Vec<ClaimPosition> {
            members
                .iter()
                .map(|s| ClaimPosition::new(sources[s.source].0.clone(), s.text))
                .collect()
        };

        let conflicting = has_numeric_conflict(&members);
        let support = members.len();
        let verdict = if conflicting {
            ClaimVerdict::Contested
        } else if support == total {
            ClaimVerdict::Unanimous
        } else if support * 2 > total {
            ClaimVerdict::Majority
        } else {
            ClaimVerdict::Contested
        };

        if conflicting {
            report.conflicts.push(Disagreement {
                topic: excerpt(members[0].text, TOPIC_CHARS),
                positions: positions(),
            });
        }

        report.claims.push(ClassifiedClaim {
            statement: members[0].text.to_string(),
            verdict,
            supporters: members
                .iter()
                .map(|s| sources[s.source].0.clone())
                .collect(),
            positions: if verdict == ClaimVerdict::Contested {
                positions()
            } else {
                Vec::new()
            },
        });
    }
    report
}

fn extract_statements(source: usize, text: &str) -> Vec<Statement<'_>> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("```") {
            continue;
        }
        let line = match RE_LIST_MARKER.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        };
        for sentence in split_sentences(line) {
            let (words, numbers) = tokenize(sentence);
            if words.len() >= MIN_CONTENT_WORDS {
                out.push(Statement {
                    source,
                    text: sentence,
                    words,
                    numbers,
                });
            }
        }
    }
    out
}

/// Split after `.`, `!` or `?` when followed by whitespace or end of line,
/// so decimals like `3.5` stay intact.
fn split_sentences(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|(_, n)| n.is_whitespace()) {
            let end = i + c.len_utf8();
            let sentence = line[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let rest = line[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

fn tokenize(sentence: &str) -> (BTreeSet<String>, BTreeSet<String>) {
    let lower = sentence.to_lowercase().replace("**", "");
    let mut words = BTreeSet::new();
    let mut numbers = BTreeSet::new();
    for token in RE_TOKEN.find_iter(&lower).map(|m| m.as_str()) {
        if token.starts_with(|c: char| c.is_ascii_digit())
            && token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            numbers.insert(token.replace(',', ""));
        } else if token.len() >= 3 && !STOPWORDS.contains(&token) {
            words.insert(token.to_string());
        }
    }
    (words, numbers)
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn has_numeric_conflict(members: &[&Statement<'_>]) -> bool {
    let mut cited = members.iter().map(|s| &s.numbers).filter(|n| !n.is_empty());
    match cited.next() {
        Some(first) => cited.any(|other| other != first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(claim: &ClassifiedClaim) -> Vec<&str> {
        claim.supporters.iter().map(|m| m.as_str()).collect()
    }

    #[test]
    fn test_split_sentences_keeps_decimals() {
        let parts = split_sentences("Pi is about 3.14 in value. It is irrational!");
        assert_eq!(parts, vec!["Pi is about 3.14 in value.", "It is irrational!"]);
    }

    #[test]
    fn test_unanimous_claim() {
        let a = ModelId::new("a");
        let b = ModelId::new("b");
        let report = classify_claims(&[
            (a, "Rust guarantees memory safety without garbage collection."),
            (b, "- Rust guarantees memory safety without a garbage collection runtime."),
        ]);
        assert_eq!(report.claims.len(), 1);
        assert_eq!(report.claims[0].verdict, ClaimVerdict::Unanimous);
        assert_eq!(ids(&report.claims[0]), vec!["a", "b"]);
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_majority_and_lone_claims() {
        let report = classify_claims(&[
            (ModelId::new("a"), "Tokio provides an async runtime for Rust."),
            (ModelId::new("b"), "Tokio provides an async runtime for Rust programs."),
            (ModelId::new("c"), "Python uses reference counting for memory."),
        ]);
        assert_eq!(report.claims[0].verdict, ClaimVerdict::Majority);
        assert_eq!(report.claims[1].verdict, ClaimVerdict::Contested);
        assert_eq!(report.claims[1].positions.len(), 1);
    }

    #[test]
    fn test_numeric_conflict_is_never_blended() {
        let report = classify_claims(&[
            (ModelId::new("a"), "The bridge spans 1,280 meters across the bay."),
            (ModelId::new("b"), "The bridge spans 1,300 meters across the bay."),
        ]);
        assert_eq!(report.claims.len(), 1);
        let claim = &report.claims[0];
        assert_eq!(claim.verdict, ClaimVerdict::Contested);
        assert_eq!(claim.positions.len(), 2);
        assert!(claim.positions[0].statement.contains("1,280"));
        assert!(claim.positions[1].statement.contains("1,300"));

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].positions.len(), 2);
    }

    #[test]
    fn test_same_numbers_are_not_a_conflict() {
        let report = classify_claims(&[
            (ModelId::new("a"), "Water boils at 100 degrees Celsius at sea level."),
            (ModelId::new("b"), "At sea level water boils at 100 degrees Celsius."),
        ]);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.claims[0].verdict, ClaimVerdict::Unanimous);
    }

    #[test]
    fn test_headings_and_repeats_ignored() {
        let report = classify_claims(&[(
            ModelId::new("a"),
            "# Summary heading words\nCaching improves read latency.\nCaching improves read latency.",
        )]);
        assert_eq!(report.claims.len(), 1);
        assert_eq!(report.claims[0].supporters.len(), 1);
    }
}
