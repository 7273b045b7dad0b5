// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold per-task results and per-repository activity into the AggregationSummary
// role: engine/aggregation
// inputs: TaskReport list, RepositoryActivity list, ReportWindow, recorded degradations
// outputs: AggregationSummary (no wall-clock values)
// invariants:
// - sum of category seconds == sum of task seconds == totals.seconds
// - sum of repository commits == totals.commits == linked + unlinked
// - a task touching several repositories adds its full estimate to each of them
// - weekly buckets cover every ISO week the window touches, zero weeks included
// - average hours per day divides by weekdays in the window (0 weekdays => 0.0)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use crate::model::{
  seconds_to_hours, AggregationSummary, Category, CategoryTotals, Degradation, EstimateSource, OverallTotals, Priority,
  RepoSpec, RepositoryTotals, SprintContext, TaskReport, WeeklyBucket,
};
use crate::window::{week_label, week_start, ReportWindow};

/// What one repository contributed after correlation.
#[derive(Debug, Clone)]
pub struct RepositoryActivity {
  pub repo: RepoSpec,
  pub linked: usize,
  pub unlinked: usize,
  pub degraded: Option<String>,
}

fn percent(part: f64, whole: f64) -> f64 {
  if whole > 0.0 {
    part / whole * 100.0
  } else {
    0.0
  }
}

pub fn aggregate(
  assignee: &str,
  window: &ReportWindow,
  tasks: &[TaskReport],
  repos: &[RepositoryActivity],
  degradations: Vec<Degradation>,
) -> AggregationSummary {
  let total_seconds: u64 = tasks.iter().map(|t| t.estimate.seconds).sum();
  let linked: usize = repos.iter().map(|r| r.linked).sum();
  let unlinked: usize = repos.iter().map(|r| r.unlinked).sum();
  let total_commits = linked + unlinked;

  // Per repository
  let mut repositories: BTreeMap<String, RepositoryTotals> = BTreeMap::new();
  for r in repos {
    let commits = r.linked + r.unlinked;
    repositories.insert(
      r.repo.name.clone(),
      RepositoryTotals {
        path: r.repo.path.clone(),
        commits,
        linked_commits: r.linked,
        unlinked_commits: r.unlinked,
        tasks: 0,
        seconds: 0,
        hours: 0.0,
        percentage: percent(commits as f64, total_commits as f64),
        degraded: r.degraded.clone(),
      },
    );
  }
  for t in tasks {
    for name in t.repositories() {
      let entry = repositories.entry(name.clone()).or_insert_with(|| RepositoryTotals {
        path: name.clone(),
        commits: 0,
        linked_commits: 0,
        unlinked_commits: 0,
        tasks: 0,
        seconds: 0,
        hours: 0.0,
        percentage: 0.0,
        degraded: None,
      });
      entry.tasks += 1;
      entry.seconds += t.estimate.seconds;
    }
  }
  for r in repositories.values_mut() {
    r.hours = seconds_to_hours(r.seconds);
  }

  // Per category, fixed order
  let categories: Vec<CategoryTotals> = Category::ALL
    .iter()
    .map(|cat| {
      let members: Vec<&TaskReport> = tasks.iter().filter(|t| t.category == *cat).collect();
      let seconds: u64 = members.iter().map(|t| t.estimate.seconds).sum();
      CategoryTotals {
        category: *cat,
        label: cat.label().to_string(),
        tasks: members.len(),
        completed_tasks: members.iter().filter(|t| t.task.status.is_done()).count(),
        seconds,
        hours: seconds_to_hours(seconds),
        percentage: percent(seconds as f64, total_seconds as f64),
      }
    })
    .collect();

  // Weekly series
  let mut weeks: BTreeMap<chrono::NaiveDate, (usize, u64)> =
    window.week_starts().into_iter().map(|w| (w, (0, 0))).collect();
  for t in tasks {
    let Some(done) = t.task.completed_on() else { continue };
    if !window.contains(done) {
      continue;
    }
    if let Some(bucket) = weeks.get_mut(&week_start(done)) {
      bucket.0 += 1;
      bucket.1 += t.estimate.seconds;
    }
  }
  let weekly: Vec<WeeklyBucket> = weeks
    .into_iter()
    .map(|(start, (completed, seconds))| WeeklyBucket {
      week: week_label(start),
      week_start: start,
      completed_tasks: completed,
      seconds,
      hours: seconds_to_hours(seconds),
    })
    .collect();

  // Sprints
  let mut sprint_map: BTreeMap<String, SprintContext> = BTreeMap::new();
  for t in tasks {
    let Some(name) = t.task.sprint.as_ref() else { continue };
    let s = sprint_map.entry(name.clone()).or_insert_with(|| SprintContext {
      sprint: name.clone(),
      tasks: 0,
      completed_tasks: 0,
      seconds: 0,
      hours: 0.0,
    });
    s.tasks += 1;
    if t.task.status.is_done() {
      s.completed_tasks += 1;
    }
    s.seconds += t.estimate.seconds;
    s.hours = seconds_to_hours(s.seconds);
  }

  let mut priorities: BTreeMap<Priority, usize> =
    [Priority::Low, Priority::Medium, Priority::High, Priority::Critical].into_iter().map(|p| (p, 0)).collect();
  let mut estimate_sources: BTreeMap<EstimateSource, usize> =
    [EstimateSource::LoggedTime, EstimateSource::OriginalEstimate, EstimateSource::CommitActivity]
      .into_iter()
      .map(|s| (s, 0))
      .collect();
  for t in tasks {
    *priorities.entry(t.task.priority).or_default() += 1;
    *estimate_sources.entry(t.estimate.source).or_default() += 1;
  }

  let completed_tasks = tasks.iter().filter(|t| t.task.status.is_done()).count();
  let working_days = window.working_days();
  let hours = seconds_to_hours(total_seconds);
  let totals = OverallTotals {
    tasks: tasks.len(),
    completed_tasks,
    tasks_with_commits: tasks.iter().filter(|t| !t.commits.is_empty()).count(),
    commits: total_commits,
    linked_commits: linked,
    unlinked_commits: unlinked,
    seconds: total_seconds,
    hours,
    average_hours_per_working_day: if working_days > 0 { hours / working_days as f64 } else { 0.0 },
    completion_rate: percent(completed_tasks as f64, tasks.len() as f64),
  };

  AggregationSummary {
    assignee: assignee.to_string(),
    window: window.info(),
    totals,
    repositories,
    categories,
    weekly,
    sprints: sprint_map.into_values().collect(),
    priorities,
    estimate_sources,
    degradations,
  }
}
