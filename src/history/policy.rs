//! Detection of commits merged through pull requests that lack a change label.

use crate::classify::is_recognized_label;

use super::Commit;

/// Commits whose pull requests carry no recognized label.
///
/// Commits without any pull request are never reported: there is no label
/// to require. The commit message is not considered.
pub fn unlabeled_commits(commits: &[Commit]) -> Vec<&Commit> {
    commits
        .iter()
        .filter(|commit| !commit.pulls.is_empty())
        .filter(|commit| {
            !commit
                .pulls
                .iter()
                .flat_map(|pull| pull.labels.iter())
                .any(|label| is_recognized_label(label))
        })
        .collect()
}
