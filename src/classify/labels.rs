//! Pull request label classification.

use crate::version::ChangeLevel;

/// Recognized pull request labels. Keys are lower-case and trimmed.
///
/// `none` is recognized but carries no change, so a pull labeled `none`
/// satisfies label enforcement without bumping the version.
const LABEL_LEVELS: &[(&str, ChangeLevel)] = &[
    ("breaking", ChangeLevel::Major),
    ("breaking change", ChangeLevel::Major),
    ("major", ChangeLevel::Major),
    ("enhancement", ChangeLevel::Minor),
    ("minor", ChangeLevel::Minor),
    ("bug", ChangeLevel::Patch),
    ("patch", ChangeLevel::Patch),
    ("none", ChangeLevel::NoChange),
];

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Level of a single label, or `None` when the label is not recognized.
pub fn label_level(label: &str) -> Option<ChangeLevel> {
    let label = normalize(label);
    LABEL_LEVELS
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, level)| *level)
}

pub fn is_recognized_label(label: &str) -> bool {
    label_level(label).is_some()
}

/// Recognized labels, normalized, in their original order.
pub fn recognized_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .map(|label| normalize(label.as_ref()))
        .filter(|label| is_recognized_label(label))
        .collect()
}

/// Classify a pull request by its highest recognized label.
pub fn classify_labels<S: AsRef<str>>(labels: &[S]) -> ChangeLevel {
    labels
        .iter()
        .filter_map(|label| label_level(label.as_ref()))
        .fold(ChangeLevel::NoChange, ChangeLevel::greater)
}
