// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Estimate effort per task through an ordered fallback chain of evidence tiers
// role: engine/estimation
// inputs: Task plus its correlated commits; EstimatorWeights
// outputs: Estimate (whole seconds, provenance tier, inferred task type, floor flag, basis string)
// invariants:
// - the first tier with evidence wins; its provenance is the one recorded
// - logged time and original estimates are returned exactly, no multipliers
// - the commit-activity tier never returns less than the task-type policy floor
// - deterministic math; no IO; no panics
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::classify::words;
use crate::model::{seconds_to_hours, Commit, Estimate, EstimateSource, Priority, Task, TaskType, SECONDS_PER_HOUR};

/// Stems whose presence in commit messages or task text signals harder work.
static COMPLEXITY_SIGNALS: &[&str] = &[
  "migrat",
  "architect",
  "security",
  "performance",
  "optimi",
  "refactor",
  "integrat",
  "database",
  "schema",
  "concurren",
  "distributed",
  "scalab",
  "encrypt",
  "authenticat",
];

/// Task-type keywords checked in this order; the first type with a hit wins.
static TYPE_KEYWORDS: &[(TaskType, &[&str])] = &[
  (TaskType::Integration, &["integrate", "integration", "webhook", "connector"]),
  (
    TaskType::Infrastructure,
    &["deploy", "deployment", "pipeline", "ci", "docker", "kubernetes", "infra", "infrastructure", "terraform"],
  ),
  (TaskType::Bugfix, &["fix", "bug", "hotfix", "crash", "regression"]),
  (TaskType::Documentation, &["docs", "documentation", "readme", "document"]),
  (TaskType::Refactor, &["refactor", "cleanup", "restructure"]),
  (TaskType::Feature, &["implement", "feature", "introduce"]),
];

/// Static weights and knobs for the commit-activity tier.
#[derive(Debug, Clone, Copy)]
pub struct EstimatorWeights {
  pub hours_per_commit: f64,
  pub daily_span_cap_hours: f64,
  pub extra_day_hours: f64,
  pub signal_hours: f64,
  pub signal_cap_hours: f64,
  pub lifecycle_factor: f64,
  pub complexity_step: f64,
  pub long_description_chars: usize,
  pub long_description_bonus: f64,
  pub complexity_max: f64,
}

impl Default for EstimatorWeights {
  fn default() -> Self {
    Self {
      hours_per_commit: 0.5,
      daily_span_cap_hours: 4.0,
      extra_day_hours: 0.5,
      signal_hours: 0.25,
      signal_cap_hours: 2.0,
      lifecycle_factor: 2.5,
      complexity_step: 0.2,
      long_description_chars: 500,
      long_description_bonus: 0.1,
      complexity_max: 1.8,
    }
  }
}

/// Policy minimum per task type. Not a measurement.
pub fn floor_seconds(task_type: TaskType) -> u64 {
  let hours = match task_type {
    TaskType::Bugfix | TaskType::Documentation => 2,
    TaskType::General | TaskType::Refactor | TaskType::Infrastructure => 4,
    TaskType::Feature => 6,
    TaskType::Integration => 8,
  };
  hours * SECONDS_PER_HOUR
}

pub fn priority_multiplier(priority: Priority) -> f64 {
  match priority {
    Priority::Low | Priority::Medium => 1.0,
    Priority::High => 1.15,
    Priority::Critical => 1.3,
  }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
  v.max(lo).min(hi)
}

/// Issue type first, then summary/description keywords; General when nothing fits.
pub fn infer_task_type(task: &Task) -> TaskType {
  if let Some(kind) = task.issue_type.as_deref() {
    let k = kind.to_ascii_lowercase();
    if k.contains("bug") {
      return TaskType::Bugfix;
    }
    if k.contains("doc") {
      return TaskType::Documentation;
    }
    if k.contains("integration") {
      return TaskType::Integration;
    }
    if k.contains("story") || k.contains("feature") || k.contains("epic") {
      return TaskType::Feature;
    }
  }

  let text: BTreeSet<String> = words(&format!("{} {}", task.summary, task.description)).into_iter().collect();
  TYPE_KEYWORDS
    .iter()
    .find(|(_, kws)| kws.iter().any(|kw| text.contains(*kw)))
    .map(|(t, _)| *t)
    .unwrap_or(TaskType::General)
}

/// Distinct complexity stems present in `text`.
fn signals_in(text: &str) -> BTreeSet<&'static str> {
  let ws = words(text);
  COMPLEXITY_SIGNALS
    .iter()
    .copied()
    .filter(|stem| ws.iter().any(|w| w.starts_with(stem)))
    .collect()
}

type Tier = fn(&TimeEstimator, &Task, &[Commit], TaskType) -> Option<Estimate>;

pub struct TimeEstimator {
  weights: EstimatorWeights,
  tiers: Vec<Tier>,
}

impl Default for TimeEstimator {
  fn default() -> Self {
    Self::new(EstimatorWeights::default())
  }
}

impl TimeEstimator {
  pub fn new(weights: EstimatorWeights) -> Self {
    Self { weights, tiers: vec![logged_time, original_estimate, commit_activity] }
  }

  pub fn weights(&self) -> EstimatorWeights {
    self.weights
  }

  pub fn estimate(&self, task: &Task, commits: &[Commit]) -> Estimate {
    let task_type = infer_task_type(task);
    self
      .tiers
      .iter()
      .find_map(|tier| tier(self, task, commits, task_type))
      .unwrap_or_else(|| policy_floor(task_type, "no estimation evidence"))
  }
}

fn policy_floor(task_type: TaskType, why: &str) -> Estimate {
  let seconds = floor_seconds(task_type);
  Estimate {
    seconds,
    source: EstimateSource::CommitActivity,
    task_type,
    floor_applied: true,
    basis: format!("{}; policy minimum {:.0}h for {} tasks", why, seconds_to_hours(seconds), task_type.label()),
  }
}

fn logged_time(_: &TimeEstimator, task: &Task, _: &[Commit], task_type: TaskType) -> Option<Estimate> {
  let seconds = task.time_spent_seconds?;
  Some(Estimate {
    seconds,
    source: EstimateSource::LoggedTime,
    task_type,
    floor_applied: false,
    basis: format!("logged {:.2}h in tracker", seconds_to_hours(seconds)),
  })
}

fn original_estimate(_: &TimeEstimator, task: &Task, _: &[Commit], task_type: TaskType) -> Option<Estimate> {
  let seconds = task.original_estimate_seconds?;
  Some(Estimate {
    seconds,
    source: EstimateSource::OriginalEstimate,
    task_type,
    floor_applied: false,
    basis: format!("original estimate {:.2}h from tracker", seconds_to_hours(seconds)),
  })
}

fn commit_activity(est: &TimeEstimator, task: &Task, commits: &[Commit], task_type: TaskType) -> Option<Estimate> {
  let w = est.weights;

  // Phase 1: commit features
  let mut per_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
  let mut commit_signals = 0usize;
  for c in commits {
    let span = per_day.entry(c.date).or_insert((c.timestamp, c.timestamp));
    span.0 = span.0.min(c.timestamp);
    span.1 = span.1.max(c.timestamp);
    commit_signals += signals_in(&c.message).len();
  }
  let active_days = per_day.len();
  let span_hours: f64 = per_day
    .values()
    .map(|(lo, hi)| ((hi - lo).max(0) as f64 / SECONDS_PER_HOUR as f64).min(w.daily_span_cap_hours))
    .sum();

  // Phase 2: base hours
  let mut base = (commits.len() as f64 * w.hours_per_commit).max(span_hours);
  base += active_days.saturating_sub(1) as f64 * w.extra_day_hours;
  base += (commit_signals as f64 * w.signal_hours).min(w.signal_cap_hours);

  // Phase 3: multipliers
  let task_signals = signals_in(&format!("{} {}", task.summary, task.description)).len();
  let mut complexity = 1.0 + w.complexity_step * task_signals as f64;
  if task.description.chars().count() > w.long_description_chars {
    complexity += w.long_description_bonus;
  }
  let complexity = clamp(complexity, 1.0, w.complexity_max);
  let priority = priority_multiplier(task.priority);

  // Phase 4: finalize
  let hours = base * w.lifecycle_factor * complexity * priority;
  let computed = ((hours * 60.0).round().max(0.0) as u64) * 60;
  let floor = floor_seconds(task_type);
  let floor_applied = computed < floor;
  let seconds = computed.max(floor);

  let mut basis = format!(
    "commits={} days={} base={:.2}h lifecycle={:.1}x complexity={:.2}x priority={:.2}x computed={:.2}h",
    commits.len(),
    active_days,
    base,
    w.lifecycle_factor,
    complexity,
    priority,
    seconds_to_hours(computed)
  );
  if floor_applied {
    basis.push_str(&format!(
      "; policy minimum {:.0}h for {} tasks applied",
      seconds_to_hours(floor),
      task_type.label()
    ));
  }

  Some(Estimate { seconds, source: EstimateSource::CommitActivity, task_type, floor_applied, basis })
}
