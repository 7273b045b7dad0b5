// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Task source for a Jira-compatible tracker (JQL search, paging, issue normalization)
// role: sources/tracker
// inputs: TrackerCredentials (explicit), assignee, ReportWindow, ReportTz; or an offline fixture payload
// outputs: Vec<Task> with optional fields left unset when the tracker omits them
// side_effects: HTTP GET against {base}/rest/api/2/search (bounded by HTTP_TIMEOUT)
// invariants:
// - JQL window is inclusive: updated >= start AND updated < end + 1 day
// - zero logged/estimated seconds are normalized to None
// - issues without a key are skipped with a warning, never a failure
// errors: FetchError::{Unauthorized, Unreachable, Backend, Malformed}
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::TrackerCredentials;
use crate::error::FetchError;
use crate::ext::serde_json::JsonFetch;
use crate::identifiers::normalize_key;
use crate::model::{Priority, Task, TaskStatus};
use crate::sources::TaskSource;
use crate::window::{ReportTz, ReportWindow};

pub const DEFAULT_SPRINT_FIELD: &str = "customfield_10020";
const PAGE_SIZE: usize = 100;
const BASE_FIELDS: [&str; 9] = [
  "summary",
  "description",
  "issuetype",
  "priority",
  "status",
  "timespent",
  "timeoriginalestimate",
  "resolutiondate",
  "updated",
];

// --- Trait seam for the tracker API ---
pub trait TrackerApi: Send + Sync {
  /// One page of a JQL search, in the tracker's `{startAt, maxResults, total, issues}` shape.
  fn search(&self, jql: &str, fields: &[String], start_at: usize, max_results: usize) -> Result<serde_json::Value, FetchError>;
}

pub struct JiraHttpApi {
  creds: TrackerCredentials,
  agent: ureq::Agent,
}

impl JiraHttpApi {
  pub fn new(creds: TrackerCredentials, timeout: Duration) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    Self { creds, agent }
  }

  fn auth_header(&self) -> String {
    let raw = format!("{}:{}", self.creds.username, self.creds.api_token);
    format!("Basic {}", BASE64.encode(raw))
  }
}

impl TrackerApi for JiraHttpApi {
  fn search(&self, jql: &str, fields: &[String], start_at: usize, max_results: usize) -> Result<serde_json::Value, FetchError> {
    let url = format!("{}/rest/api/2/search", self.creds.base_url);
    debug!(%url, start_at, "tracker search");

    let resp = self
      .agent
      .get(&url)
      .query("jql", jql)
      .query("startAt", &start_at.to_string())
      .query("maxResults", &max_results.to_string())
      .query("fields", &fields.join(","))
      .set("Accept", "application/json")
      .set("User-Agent", "work-report")
      .set("Authorization", &self.auth_header())
      .call();

    match resp {
      Ok(r) => r
        .into_json::<serde_json::Value>()
        .map_err(|e| FetchError::Malformed(e.to_string())),
      Err(ureq::Error::Status(status, _)) if status == 401 || status == 403 => Err(FetchError::Unauthorized { status }),
      Err(ureq::Error::Status(status, r)) => {
        let body = r.into_string().unwrap_or_default();
        Err(FetchError::Backend { status, message: body.chars().take(200).collect() })
      }
      Err(ureq::Error::Transport(t)) => Err(FetchError::Unreachable(t.to_string())),
    }
  }
}

/// Serves a recorded search response (a bare issue array or `{"issues": [...]}`) for offline runs.
pub struct FixtureTrackerApi {
  issues: Vec<serde_json::Value>,
}

impl FixtureTrackerApi {
  pub fn from_value(v: serde_json::Value) -> Result<Self, FetchError> {
    let issues = match v {
      serde_json::Value::Array(items) => items,
      other => other
        .fetch("issues")
        .to::<Vec<serde_json::Value>>()
        .ok_or_else(|| FetchError::Malformed("fixture has no issues array".into()))?,
    };
    Ok(Self { issues })
  }

  pub fn from_path(path: &Path) -> anyhow::Result<Self> {
    let data = std::fs::read(path).with_context(|| format!("reading task fixture {}", path.display()))?;
    let v: serde_json::Value =
      serde_json::from_slice(&data).with_context(|| format!("parsing task fixture {}", path.display()))?;
    Ok(Self::from_value(v)?)
  }
}

impl TrackerApi for FixtureTrackerApi {
  fn search(&self, _jql: &str, _fields: &[String], start_at: usize, max_results: usize) -> Result<serde_json::Value, FetchError> {
    let page: Vec<serde_json::Value> = self.issues.iter().skip(start_at).take(max_results).cloned().collect();
    Ok(serde_json::json!({
      "startAt": start_at,
      "maxResults": max_results,
      "total": self.issues.len(),
      "issues": page,
    }))
  }
}

pub struct JiraTaskSource {
  api: Box<dyn TrackerApi>,
  sprint_field: String,
  tz: ReportTz,
  page_size: usize,
}

impl JiraTaskSource {
  pub fn new(api: Box<dyn TrackerApi>, sprint_field: impl Into<String>, tz: ReportTz) -> Self {
    Self { api, sprint_field: sprint_field.into(), tz, page_size: PAGE_SIZE }
  }

  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  fn fields(&self) -> Vec<String> {
    let mut fields: Vec<String> = BASE_FIELDS.iter().map(|s| s.to_string()).collect();
    fields.push(self.sprint_field.clone());
    fields
  }
}

fn jql_quote(s: &str) -> String {
  format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn build_jql(assignee: &str, window: &ReportWindow) -> String {
  let end_exclusive = window.end().succ_opt().unwrap_or(window.end());
  format!(
    "assignee = {} AND updated >= \"{}\" AND updated < \"{}\" ORDER BY key ASC",
    jql_quote(assignee),
    window.start(),
    end_exclusive
  )
}

impl TaskSource for JiraTaskSource {
  fn fetch_tasks(&self, assignee: &str, window: &ReportWindow) -> Result<Vec<Task>, FetchError> {
    let jql = build_jql(assignee, window);
    let fields = self.fields();
    let mut tasks = Vec::new();
    let mut start_at = 0usize;

    loop {
      let page = self.api.search(&jql, &fields, start_at, self.page_size)?;
      let issues = page
        .fetch("issues")
        .to::<Vec<serde_json::Value>>()
        .ok_or_else(|| FetchError::Malformed("search response has no issues array".into()))?;
      let total = page.fetch("total").to::<usize>().unwrap_or(0);

      if issues.is_empty() {
        break;
      }
      start_at += issues.len();

      for issue in &issues {
        match map_issue(issue, &self.sprint_field, self.tz) {
          Some(t) => tasks.push(t),
          None => warn!("skipping tracker issue without a key"),
        }
      }

      if start_at >= total {
        break;
      }
    }

    debug!(count = tasks.len(), %assignee, "fetched tasks");
    Ok(tasks)
  }
}

static RE_LEGACY_SPRINT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"name=([^,\]]+)").expect("static regex"));

/// Most recent sprint name from either sprint objects or legacy serialized sprint strings.
fn sprint_name(v: Option<&serde_json::Value>) -> Option<String> {
  let v = v?;
  let latest = match v.as_array() {
    Some(items) => items.last()?,
    None => v,
  };
  if let Some(name) = latest.fetch("name").to::<String>() {
    return Some(name);
  }
  let s = latest.as_str()?;
  RE_LEGACY_SPRINT_NAME
    .captures(s)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_string())
    .or_else(|| Some(s.to_string()))
}

fn tracker_date(raw: Option<String>, tz: ReportTz) -> Option<NaiveDate> {
  let raw = raw?;
  let parsed = DateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f%z")
    .or_else(|_| DateTime::parse_from_rfc3339(&raw))
    .ok();
  match parsed {
    Some(dt) => tz.localize(dt.timestamp()).map(|(d, _)| d),
    None => raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
  }
}

fn positive_seconds(v: Option<i64>) -> Option<u64> {
  v.filter(|s| *s > 0).map(|s| s as u64)
}

/// Normalize one tracker issue. Returns None only when the issue has no key.
pub fn map_issue(issue: &serde_json::Value, sprint_field: &str, tz: ReportTz) -> Option<Task> {
  let key = issue.fetch("key").to::<String>().filter(|k| !k.trim().is_empty())?;
  let fields = issue.fetch("fields").value().cloned().unwrap_or(serde_json::Value::Null);

  let status_name = fields.fetch("status.name").to_or_default::<String>();
  let status_key = fields.fetch("status.statusCategory.key").to::<String>();

  Some(Task {
    id: normalize_key(&key),
    summary: fields.fetch("summary").to_or_default::<String>(),
    description: fields.fetch("description").text().unwrap_or_default(),
    issue_type: fields.fetch("issuetype.name").to::<String>(),
    priority: fields
      .fetch("priority.name")
      .to::<String>()
      .map(|p| Priority::from_name(&p))
      .unwrap_or_default(),
    status: TaskStatus::from_tracker(status_key.as_deref(), &status_name),
    time_spent_seconds: positive_seconds(fields.fetch("timespent").to::<i64>()),
    original_estimate_seconds: positive_seconds(fields.fetch("timeoriginalestimate").to::<i64>()),
    sprint: sprint_name(fields.fetch(sprint_field).value()),
    resolved_on: tracker_date(fields.fetch("resolutiondate").to::<String>(), tz),
    updated_on: tracker_date(fields.fetch("updated").to::<String>(), tz),
  })
}
