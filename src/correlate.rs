// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Link commits to tasks by the identifiers found in commit messages
// role: engine/correlation
// inputs: Fetched tasks, every repository's commits, IdentifierExtractor
// outputs: Correlation (tasks in fetch order with their commits; linked/unlinked counts per repository)
// invariants:
// - every task appears, with an empty commit list when nothing references it
// - a commit referencing several known tasks appears under each, but counts once as linked
// - commits under a task are ordered by (timestamp, repository, sha)
// - linked + unlinked per repository equals that repository's fetched commits
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::identifiers::{normalize_key, IdentifierExtractor};
use crate::model::{Commit, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoActivity {
  pub linked: usize,
  pub unlinked: usize,
}

impl RepoActivity {
  pub fn total(&self) -> usize {
    self.linked + self.unlinked
  }
}

#[derive(Debug, Clone)]
pub struct Correlation {
  pub tasks: Vec<(Task, Vec<Commit>)>,
  pub repositories: BTreeMap<String, RepoActivity>,
}

pub fn correlate(tasks: Vec<Task>, commits: &[Commit], extractor: &IdentifierExtractor) -> Correlation {
  let mut index: HashMap<String, usize> = HashMap::new();
  let mut linked: Vec<(Task, Vec<Commit>)> = Vec::with_capacity(tasks.len());
  for task in tasks {
    let key = normalize_key(&task.id);
    if index.contains_key(&key) {
      debug!(task = %key, "duplicate task id from tracker ignored");
      continue;
    }
    index.insert(key, linked.len());
    linked.push((task, Vec::new()));
  }

  let mut ordered: Vec<&Commit> = commits.iter().collect();
  ordered.sort_by(|a, b| {
    a.timestamp
      .cmp(&b.timestamp)
      .then_with(|| a.repository.cmp(&b.repository))
      .then_with(|| a.sha.cmp(&b.sha))
  });

  let mut repositories: BTreeMap<String, RepoActivity> = BTreeMap::new();
  for commit in ordered {
    let hits: Vec<usize> = extractor
      .extract(&commit.message)
      .iter()
      .filter_map(|id| index.get(id).copied())
      .collect();

    let activity = repositories.entry(commit.repository.clone()).or_default();
    if hits.is_empty() {
      activity.unlinked += 1;
      continue;
    }
    activity.linked += 1;
    for i in hits {
      linked[i].1.push(commit.clone());
    }
  }

  Correlation { tasks: linked, repositories }
}
