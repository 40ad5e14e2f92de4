//! Commit history between two references, enriched with pull requests.

pub mod commit;
pub mod policy;
pub mod traversal;

pub use commit::{Commit, Pull};
pub use policy::unlabeled_commits;
pub use traversal::{MAX_CONCURRENT_PULL_FETCHES, PAGE_SIZE, diff_commits};
