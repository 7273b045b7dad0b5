// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Trait seams for the task and commit sources feeding the correlation engine
// role: sources/namespace
// outputs: TaskSource and CommitSource traits plus their tracker and git implementations
// invariants: Window bounds are inclusive calendar days; absent optional fields are not fetch failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod git;
pub mod jira;

use crate::error::FetchError;
use crate::model::{Commit, RepoSpec, Task};
use crate::window::ReportWindow;

/// Fetches the tasks assigned to one person within a window.
pub trait TaskSource {
  fn fetch_tasks(&self, assignee: &str, window: &ReportWindow) -> Result<Vec<Task>, FetchError>;
}

/// Fetches one repository's commits by one author within a window.
///
/// `Sync` because repositories are fetched in parallel.
pub trait CommitSource: Sync {
  fn fetch_commits(&self, repo: &RepoSpec, author: &str, window: &ReportWindow) -> Result<Vec<Commit>, FetchError>;
}
