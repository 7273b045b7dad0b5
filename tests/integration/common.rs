// Shared fixtures for the CLI tests.

use std::path::{Path, PathBuf};

use test_support::{tracker_issue, write_tasks_fixture};

pub const BIN: &str = "work-report";

/// Three tasks matching `test_support::init_fixture_repo`:
/// ABC-1 done with 3h logged, ABC-2 done without time fields, ABC-3 in progress without commits.
pub fn standard_tasks(dir: &Path) -> PathBuf {
  let mut abc2 = tracker_issue("ABC-2", "Document login flow", "Medium", "done", None);
  abc2["fields"]["customfield_10020"] = serde_json::Value::Null;
  let payload = serde_json::json!({
    "startAt": 0,
    "total": 3,
    "issues": [
      tracker_issue("ABC-1", "Checkout endpoint for cart", "High", "done", Some(10_800)),
      abc2,
      tracker_issue("ABC-3", "Miscellaneous adjustments", "Low", "indeterminate", None),
    ]
  });
  write_tasks_fixture(dir, &payload)
}

/// Arguments shared by every report run against the fixture repo.
pub fn report_args(repo: &str, tasks: &Path) -> Vec<String> {
  vec![
    "--assignee".into(),
    "dev@example.com".into(),
    "--author".into(),
    test_support::FIXTURE_AUTHOR_EMAIL.into(),
    "--month".into(),
    "2025-08".into(),
    "--repos".into(),
    repo.into(),
    "--tz".into(),
    "utc".into(),
    "--tasks-json".into(),
    tasks.to_string_lossy().to_string(),
    "--now-override".into(),
    "2025-09-01T08:00:00Z".into(),
  ]
}

pub fn run_json(args: &[String]) -> serde_json::Value {
  let out = test_support::cmd_bin(BIN).args(args).args(["--format", "json"]).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).expect("json on stdout")
}
