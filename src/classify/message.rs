//! Commit message prefix classification.
//!
//! Every line of the message is inspected, so a body line such as
//! `breaking: renamed the config key` raises the level even when the
//! summary line is a plain `fix:`.

use crate::version::ChangeLevel;

/// Recognized message prefixes. Keys are lower-case and trimmed.
const PREFIX_LEVELS: &[(&str, ChangeLevel)] = &[
    ("feat", ChangeLevel::Minor),
    ("feature", ChangeLevel::Minor),
    ("fix", ChangeLevel::Patch),
    ("bugfix", ChangeLevel::Patch),
    ("perf", ChangeLevel::Patch),
    ("security", ChangeLevel::Patch),
    ("patch", ChangeLevel::Patch),
    ("breaking", ChangeLevel::Major),
    ("breaking change", ChangeLevel::Major),
];

fn prefix_level(prefix: &str) -> Option<ChangeLevel> {
    PREFIX_LEVELS
        .iter()
        .find(|(key, _)| *key == prefix)
        .map(|(_, level)| *level)
}

/// Normalized text before the first colon of a line, if the line has one.
fn line_prefix(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(prefix, _)| prefix.trim().to_lowercase())
}

/// Recognized prefixes in the order their lines appear in the message.
pub fn message_prefixes(message: &str) -> Vec<String> {
    message
        .replace("\r\n", "\n")
        .split('\n')
        .filter_map(line_prefix)
        .filter(|prefix| prefix_level(prefix).is_some())
        .collect()
}

/// Whether any line of the message starts with a recognized prefix.
pub fn has_recognized_prefix(message: &str) -> bool {
    !message_prefixes(message).is_empty()
}

/// Classify a commit message by its highest recognized prefix.
///
/// Messages without a recognized prefix are `NoChange`.
pub fn classify_message(message: &str) -> ChangeLevel {
    message_prefixes(message)
        .iter()
        .filter_map(|prefix| prefix_level(prefix))
        .fold(ChangeLevel::NoChange, ChangeLevel::greater)
}
