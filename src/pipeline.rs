// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one report run: fetch tasks and commits, then correlate, estimate, classify, aggregate
// role: processing/orchestrator
// inputs: ReportRequest; TaskSource and CommitSource trait objects; IdentifierExtractor; TimeEstimator
// outputs: WorkReport (summary + per-task breakdown)
// side_effects: Whatever the sources do (HTTP, git subprocesses); nothing else
// invariants:
// - repositories are fetched concurrently and all outcomes are collected before correlation starts
// - a task backend failure aborts the run; repository failures become recorded degradations
// - identical fetched inputs give identical WorkReports
// errors: ReportError::TaskBackend for tracker failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing::{info, warn};

use crate::aggregate::{aggregate, RepositoryActivity};
use crate::classify::classify;
use crate::correlate::correlate;
use crate::error::ReportError;
use crate::estimate::TimeEstimator;
use crate::identifiers::IdentifierExtractor;
use crate::model::{Commit, Degradation, DegradationScope, RepoSpec, Task, TaskReport, WorkReport};
use crate::sources::git::{fetch_repositories, RepositoryFetch};
use crate::sources::{CommitSource, TaskSource};
use crate::window::ReportWindow;

#[derive(Debug, Clone)]
pub struct ReportRequest {
  pub assignee: String,
  /// Identity passed to the commit source (`git log --author`).
  pub author: String,
  pub window: ReportWindow,
  pub repos: Vec<RepoSpec>,
}

pub struct ReportEngine<'a> {
  tasks: &'a dyn TaskSource,
  commits: &'a dyn CommitSource,
  extractor: IdentifierExtractor,
  estimator: TimeEstimator,
}

impl<'a> ReportEngine<'a> {
  pub fn new(tasks: &'a dyn TaskSource, commits: &'a dyn CommitSource, extractor: IdentifierExtractor) -> Self {
    Self { tasks, commits, extractor, estimator: TimeEstimator::default() }
  }

  pub fn with_estimator(mut self, estimator: TimeEstimator) -> Self {
    self.estimator = estimator;
    self
  }

  pub fn run(&self, req: &ReportRequest) -> Result<WorkReport, ReportError> {
    info!(
      assignee = %req.assignee,
      start = %req.window.start(),
      end = %req.window.end(),
      repos = req.repos.len(),
      "generating report"
    );

    let tasks = self.tasks.fetch_tasks(&req.assignee, &req.window).map_err(ReportError::TaskBackend)?;
    info!(count = tasks.len(), "tasks fetched");

    // fan-out, then barrier
    let fetched = fetch_repositories(self.commits, &req.repos, &req.author, &req.window);

    Ok(assemble(&req.assignee, &req.window, tasks, fetched, &self.extractor, &self.estimator))
  }
}

/// The pure half of a run: everything after fetching.
pub fn assemble(
  assignee: &str,
  window: &ReportWindow,
  tasks: Vec<Task>,
  fetched: Vec<RepositoryFetch>,
  extractor: &IdentifierExtractor,
  estimator: &TimeEstimator,
) -> WorkReport {
  let mut degradations = Vec::new();
  for f in &fetched {
    if let Some(reason) = &f.degraded {
      degradations.push(Degradation {
        scope: DegradationScope::Repository,
        subject: f.repo.name.clone(),
        message: format!("access failed, excluded from totals: {}", reason),
      });
    }
  }
  if !fetched.is_empty() && fetched.iter().all(|f| f.degraded.is_some()) {
    warn!("every configured repository failed; report is based on task data only");
  }

  let all_commits: Vec<Commit> = fetched.iter().flat_map(|f| f.commits.iter().cloned()).collect();
  let correlation = correlate(tasks, &all_commits, extractor);

  let activity: Vec<RepositoryActivity> = fetched
    .into_iter()
    .map(|f| {
      let counts = correlation.repositories.get(&f.repo.name).cloned().unwrap_or_default();
      RepositoryActivity { repo: f.repo, linked: counts.linked, unlinked: counts.unlinked, degraded: f.degraded }
    })
    .collect();

  let reports: Vec<TaskReport> = correlation
    .tasks
    .into_iter()
    .map(|(task, commits)| {
      let estimate = estimator.estimate(&task, &commits);
      let category = classify(&task);
      TaskReport { task, commits, estimate, category }
    })
    .collect();

  let summary = aggregate(assignee, window, &reports, &activity, degradations);
  info!(
    tasks = summary.totals.tasks,
    commits = summary.totals.commits,
    hours = summary.totals.hours,
    "report assembled"
  );

  WorkReport { summary, tasks: reports }
}
