// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the data model (tasks, commits, estimates, categories, aggregation summary) shared by the engine and renderers
// role: model/types
// outputs: Serializable structs with stable field names; durations carried as whole seconds
// invariants: Task/Commit are immutable after fetch; hours are always derived from seconds; summary maps are ordered (BTreeMap/Vec)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: u64 = 3600;

/// Convert whole seconds to fractional hours for display.
pub fn seconds_to_hours(seconds: u64) -> f64 {
  seconds as f64 / SECONDS_PER_HOUR as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  Medium,
  High,
  Critical,
}

impl Priority {
  /// Map a tracker priority name onto the ordered scale. Unknown names land on Medium.
  pub fn from_name(name: &str) -> Self {
    match name.trim().to_ascii_lowercase().as_str() {
      "lowest" | "low" | "trivial" | "minor" => Priority::Low,
      "high" | "major" => Priority::High,
      "highest" | "critical" | "blocker" | "urgent" => Priority::Critical,
      _ => Priority::Medium,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Priority::Low => "Low",
      Priority::Medium => "Medium",
      Priority::High => "High",
      Priority::Critical => "Critical",
    }
  }
}

impl Default for Priority {
  fn default() -> Self {
    Priority::Medium
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  Open,
  InProgress,
  Done,
}

impl TaskStatus {
  /// Prefer the tracker's status category key ("new" / "indeterminate" / "done"); fall back to the status name.
  pub fn from_tracker(category_key: Option<&str>, name: &str) -> Self {
    match category_key.map(|k| k.to_ascii_lowercase()) {
      Some(k) if k == "done" => return TaskStatus::Done,
      Some(k) if k == "indeterminate" => return TaskStatus::InProgress,
      Some(k) if k == "new" => return TaskStatus::Open,
      _ => {}
    }

    let n = name.trim().to_ascii_lowercase();
    match n.as_str() {
      "done" | "closed" | "resolved" | "complete" | "completed" | "released" => TaskStatus::Done,
      "in progress" | "in review" | "review" | "testing" | "qa" | "in qa" => TaskStatus::InProgress,
      _ => TaskStatus::Open,
    }
  }

  pub fn is_done(&self) -> bool {
    matches!(self, TaskStatus::Done)
  }
}

/// One project-tracking item as returned by the task source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub id: String,
  pub summary: String,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub issue_type: Option<String>,
  pub priority: Priority,
  pub status: TaskStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time_spent_seconds: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub original_estimate_seconds: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sprint: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resolved_on: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_on: Option<NaiveDate>,
}

impl Task {
  /// Date the task counts as completed, if it is done.
  pub fn completed_on(&self) -> Option<NaiveDate> {
    if !self.status.is_done() {
      return None;
    }
    self.resolved_on.or(self.updated_on)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub name: String,
  pub email: String,
}

/// One version-control change, tagged with the repository it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
  pub sha: String,
  pub short_sha: String,
  pub author: Person,
  /// Author time, unix seconds.
  pub timestamp: i64,
  /// Author date in the report time zone.
  pub date: NaiveDate,
  /// Author time rendered in the report time zone (RFC3339).
  pub authored_local: String,
  pub subject: String,
  pub message: String,
  pub repository: String,
}

/// A repository the caller asked us to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
  pub name: String,
  pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
  /// Time logged against the task in the tracker.
  LoggedTime,
  /// The tracker's original estimate.
  OriginalEstimate,
  /// Computed from correlated commit activity and the lifecycle multiplier model.
  CommitActivity,
}

impl EstimateSource {
  pub fn tier(&self) -> u8 {
    match self {
      EstimateSource::LoggedTime => 1,
      EstimateSource::OriginalEstimate => 2,
      EstimateSource::CommitActivity => 3,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      EstimateSource::LoggedTime => "logged time",
      EstimateSource::OriginalEstimate => "original estimate",
      EstimateSource::CommitActivity => "commit activity model",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
  Bugfix,
  Documentation,
  General,
  Refactor,
  Infrastructure,
  Feature,
  Integration,
}

impl TaskType {
  pub fn label(&self) -> &'static str {
    match self {
      TaskType::Bugfix => "bugfix",
      TaskType::Documentation => "documentation",
      TaskType::General => "general",
      TaskType::Refactor => "refactor",
      TaskType::Infrastructure => "infrastructure",
      TaskType::Feature => "feature",
      TaskType::Integration => "integration",
    }
  }
}

/// Estimated effort for one task plus the provenance needed to disclose how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
  pub seconds: u64,
  pub source: EstimateSource,
  pub task_type: TaskType,
  /// True when the policy minimum for the task type replaced a smaller computed value.
  pub floor_applied: bool,
  pub basis: String,
}

impl Estimate {
  pub fn hours(&self) -> f64 {
    seconds_to_hours(self.seconds)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  RevenueSales,
  UserExperience,
  SecurityCompliance,
  OperationalEfficiency,
  PlatformStability,
  FeatureExpansion,
}

impl Category {
  pub const ALL: [Category; 6] = [
    Category::RevenueSales,
    Category::UserExperience,
    Category::SecurityCompliance,
    Category::OperationalEfficiency,
    Category::PlatformStability,
    Category::FeatureExpansion,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Category::RevenueSales => "Revenue & Sales",
      Category::UserExperience => "User Experience",
      Category::SecurityCompliance => "Security & Compliance",
      Category::OperationalEfficiency => "Operational Efficiency",
      Category::PlatformStability => "Platform Stability",
      Category::FeatureExpansion => "Feature Expansion",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// A task with everything the engine derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
  pub task: Task,
  pub commits: Vec<Commit>,
  pub estimate: Estimate,
  pub category: Category,
}

impl TaskReport {
  /// Distinct repositories this task's commits came from, sorted.
  pub fn repositories(&self) -> Vec<String> {
    let mut repos: Vec<String> = self.commits.iter().map(|c| c.repository.clone()).collect();
    repos.sort();
    repos.dedup();
    repos
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
  pub start: NaiveDate,
  pub end: NaiveDate,
  pub calendar_days: u32,
  pub working_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
  pub tasks: usize,
  pub completed_tasks: usize,
  pub tasks_with_commits: usize,
  pub commits: usize,
  pub linked_commits: usize,
  pub unlinked_commits: usize,
  pub seconds: u64,
  pub hours: f64,
  pub average_hours_per_working_day: f64,
  pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryTotals {
  pub path: String,
  pub commits: usize,
  pub linked_commits: usize,
  pub unlinked_commits: usize,
  pub tasks: usize,
  /// Full estimate of every task touching this repository; tasks spanning repositories count in each.
  pub seconds: u64,
  pub hours: f64,
  /// Share of all fetched commits.
  pub percentage: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub degraded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
  pub category: Category,
  pub label: String,
  pub tasks: usize,
  pub completed_tasks: usize,
  pub seconds: u64,
  pub hours: f64,
  /// Share of all estimated seconds.
  pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
  pub week: String,
  pub week_start: NaiveDate,
  pub completed_tasks: usize,
  pub seconds: u64,
  pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintContext {
  pub sprint: String,
  pub tasks: usize,
  pub completed_tasks: usize,
  pub seconds: u64,
  pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationScope {
  Repository,
  Summary,
}

/// A non-fatal problem the rendered report must disclose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
  pub scope: DegradationScope,
  pub subject: String,
  pub message: String,
}

/// The engine's terminal output. Contains no wall-clock values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSummary {
  pub assignee: String,
  pub window: WindowInfo,
  pub totals: OverallTotals,
  pub repositories: BTreeMap<String, RepositoryTotals>,
  pub categories: Vec<CategoryTotals>,
  pub weekly: Vec<WeeklyBucket>,
  pub sprints: Vec<SprintContext>,
  pub priorities: BTreeMap<Priority, usize>,
  pub estimate_sources: BTreeMap<EstimateSource, usize>,
  pub degradations: Vec<Degradation>,
}

/// Everything a renderer consumes: the summary plus the per-task breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkReport {
  pub summary: AggregationSummary,
  pub tasks: Vec<TaskReport>,
}
