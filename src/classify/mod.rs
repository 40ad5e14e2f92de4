//! Rule tables turning commit messages and pull request labels into change levels.

pub mod labels;
pub mod message;

pub use labels::{classify_labels, is_recognized_label, label_level, recognized_labels};
pub use message::{classify_message, has_recognized_prefix, message_prefixes};
