//! Anonymised labels for cross-critique.
//!
//! During critique each model sees the other models' research as
//! "Response A", "Response B", ... so it cannot tell which vendor wrote what.
//! Labels are assigned once per session in model id order, which lets the
//! critique text be routed back to the model it talks about.

use crate::model::ModelId;
use std::collections::BTreeMap;

pub fn response_label(index: usize) -> String {
    match u8::try_from(index).ok().filter(|i| *i < 26) {
        Some(i) => format!("Response {}", (b'A' + i) as char),
        None => format!("Response {}", index + 1),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CritiqueLabels {
    by_model: BTreeMap<ModelId, String>,
}

impl CritiqueLabels {
    pub fn new<'a>(models: impl IntoIterator<Item = &'a ModelId>) -> Self {
        let mut sorted: Vec<&ModelId> = models.into_iter().collect();
        sorted.sort();
        sorted.dedup();
        Self {
            by_model: sorted
                .into_iter()
                .enumerate()
                .map(|(i, m)| (m.clone(), response_label(i)))
                .collect(),
        }
    }

    pub fn label_of(&self, model: &ModelId) -> Option<&str> {
        self.by_model.get(model).map(String::as_str)
    }

    pub fn model_of(&self, label: &str) -> Option<&ModelId> {
        self.by_model
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(m, _)| m)
    }

    /// Labels for everyone except `reviewer`, in label order.
    pub fn others(&self, reviewer: &ModelId) -> Vec<(&ModelId, &str)> {
        self.by_model
            .iter()
            .filter(|(m, _)| *m != reviewer)
            .map(|(m, l)| (m, l.as_str()))
            .collect()
    }
}

/// Split a critique into the parts addressed to each label.
///
/// Sections are anchored on heading lines (`### Response A`,
/// `**Response A**`, or a line opening with the label), so a section may
/// mention other labels in its body. Only when no label has a heading does
/// a section run from the first mention of its label to the next one.
/// When the critique mentions none of the labels, every label receives the
/// whole text.
pub fn split_critique_by_label<'a>(text: &'a str, labels: &[&str]) -> BTreeMap<String, &'a str> {
    let mut found: Vec<(usize, &str)> = labels
        .iter()
        .filter_map(|label| find_heading(text, label).map(|pos| (pos, *label)))
        .collect();
    if found.is_empty() {
        found = labels
            .iter()
            .filter_map(|label| find_label(text, label).map(|pos| (pos, *label)))
            .collect();
    }

    if found.is_empty() {
        return labels
            .iter()
            .map(|l| (l.to_string(), text.trim()))
            .collect();
    }

    found.sort();
    let mut sections = BTreeMap::new();
    for (i, (start, label)) in found.iter().enumerate() {
        let end = found
            .get(i + 1)
            .map_or(text.len(), |(next, _)| line_start(text, *next));
        let start = line_start(text, *start);
        sections.insert(label.to_string(), text[start..end.max(start)].trim());
    }
    sections
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// `text` opens with `label` and the label ends there
/// ("Response A" must not match "Response AB").
fn starts_with_label(text: &str, label: &str) -> bool {
    text.strip_prefix(label)
        .is_some_and(|rest| rest.chars().next().is_none_or(|c| !c.is_alphanumeric()))
}

/// Byte offset of the first heading line for `label`.
fn find_heading(text: &str, label: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marked = trimmed.starts_with('#') || trimmed.starts_with("**");
        let rest = trimmed.trim_start_matches(['#', '*']).trim_start();
        if (marked || trimmed.starts_with(label)) && starts_with_label(rest, label) {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// First occurrence of `label` anywhere in the text.
fn find_label(text: &str, label: &str) -> Option<usize> {
    text.match_indices(label)
        .map(|(pos, _)| pos)
        .find(|pos| starts_with_label(&text[*pos..], label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_id_order() {
        let models = [ModelId::new("zeta"), ModelId::new("alpha"), ModelId::new("mid")];
        let labels = CritiqueLabels::new(&models);
        assert_eq!(labels.label_of(&ModelId::new("alpha")), Some("Response A"));
        assert_eq!(labels.label_of(&ModelId::new("zeta")), Some("Response C"));
        assert_eq!(labels.model_of("Response B"), Some(&ModelId::new("mid")));

        let others = labels.others(&ModelId::new("mid"));
        let names: Vec<_> = others.iter().map(|(_, l)| *l).collect();
        assert_eq!(names, vec!["Response A", "Response C"]);
    }

    #[test]
    fn test_label_past_alphabet() {
        assert_eq!(response_label(0), "Response A");
        assert_eq!(response_label(25), "Response Z");
        assert_eq!(response_label(26), "Response 27");
    }

    #[test]
    fn test_split_by_label() {
        let text = "### Response A\nToo vague.\n\n### Response B\nMissing sources.";
        let sections = split_critique_by_label(text, &["Response A", "Response B"]);
        assert_eq!(sections["Response A"], "### Response A\nToo vague.");
        assert_eq!(sections["Response B"], "### Response B\nMissing sources.");
    }

    #[test]
    fn test_cross_reference_stays_in_its_section() {
        let text = "### Response A\nUnlike Response B, A forgets lifetimes.\n\n### Response B\nB is vague.";
        let sections = split_critique_by_label(text, &["Response A", "Response B"]);
        assert_eq!(
            sections["Response A"],
            "### Response A\nUnlike Response B, A forgets lifetimes."
        );
        assert_eq!(sections["Response B"], "### Response B\nB is vague.");
    }

    #[test]
    fn test_bold_and_bare_headings() {
        let text = "**Response B**: cites Response A twice.\nResponse A: no error handling.";
        let sections = split_critique_by_label(text, &["Response A", "Response B"]);
        assert_eq!(sections["Response B"], "**Response B**: cites Response A twice.");
        assert_eq!(sections["Response A"], "Response A: no error handling.");
    }

    #[test]
    fn test_inline_mentions_without_headings() {
        let text = "Overall, Response A is thin.\nOn Response B: fine.";
        let sections = split_critique_by_label(text, &["Response A", "Response B"]);
        assert_eq!(sections["Response A"], "Overall, Response A is thin.");
        assert_eq!(sections["Response B"], "On Response B: fine.");
    }

    #[test]
    fn test_split_without_labels_gives_everyone_the_text() {
        let sections = split_critique_by_label("All fine.", &["Response A", "Response B"]);
        assert_eq!(sections["Response A"], "All fine.");
        assert_eq!(sections["Response B"], "All fine.");
    }
}
