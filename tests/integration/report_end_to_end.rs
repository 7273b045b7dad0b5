use crate::common::{report_args, run_json, standard_tasks, BIN};
use predicates::prelude::*;
use test_support::{cmd_bin, init_fixture_repo, tempdir};

#[test]
fn json_report_correlates_estimates_and_aggregates() {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let v = run_json(&report_args(repo.path().to_str().unwrap(), &tasks));

  let s = &v["summary"];
  assert_eq!(s["window"]["start"], "2025-08-01");
  assert_eq!(s["window"]["end"], "2025-08-31");
  assert_eq!(s["window"]["working_days"], 21);

  assert_eq!(s["totals"]["tasks"], 3);
  assert_eq!(s["totals"]["completed_tasks"], 2);
  assert_eq!(s["totals"]["commits"], 4);
  assert_eq!(s["totals"]["linked_commits"], 3);
  assert_eq!(s["totals"]["unlinked_commits"], 1);
  // 3h logged + 2h documentation floor + 4h general floor
  assert_eq!(s["totals"]["seconds"], 9 * 3600);

  let tasks = v["tasks"].as_array().unwrap();
  assert_eq!(tasks[0]["task"]["id"], "ABC-1");
  assert_eq!(tasks[0]["commits"].as_array().unwrap().len(), 2);
  assert_eq!(tasks[0]["estimate"]["source"], "logged_time");
  assert_eq!(tasks[0]["category"], "revenue_sales");
  assert_eq!(tasks[1]["estimate"]["task_type"], "documentation");
  assert_eq!(tasks[1]["estimate"]["floor_applied"], true);
  assert_eq!(tasks[1]["category"], "user_experience");
  assert!(tasks[2]["commits"].as_array().unwrap().is_empty());
  assert_eq!(tasks[2]["category"], "feature_expansion");

  let weekly = s["weekly"].as_array().unwrap();
  assert_eq!(weekly.len(), 5);
  assert_eq!(weekly[2]["week"], "2025-W33");
  assert_eq!(weekly[2]["completed_tasks"], 2);

  assert_eq!(v["generated_at"], "2025-09-01T08:00:00Z");
  assert_eq!(v["narrative"]["source"], "template");
}

#[test]
fn detailed_text_report_shows_commit_lines() {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  cmd_bin(BIN)
    .args(report_args(repo.path().to_str().unwrap(), &tasks))
    .assert()
    .success()
    .stdout(predicate::str::contains("WORK REPORT: dev@example.com"))
    .stdout(predicate::str::is_match(r"[0-9a-f]{12}: ABC-1: add checkout endpoint \(2025-08-12 14:03\) \[").unwrap())
    .stdout(predicate::str::contains("No commits found for this task."))
    .stdout(predicate::str::contains("Total estimated time: 9.00h across 3 tasks"));
}

#[test]
fn executive_markdown_is_written_to_out_path() {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let target = work.path().join("reports/august.md");
  cmd_bin(BIN)
    .args(report_args(repo.path().to_str().unwrap(), &tasks))
    .args(["--format", "markdown", "--report-type", "executive", "--out", target.to_str().unwrap()])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  let md = std::fs::read_to_string(&target).unwrap();
  assert!(md.starts_with("# Executive Work Summary: dev@example.com"));
  assert!(md.contains("## Business Impact"));
  assert!(!md.contains("## Tasks"));
}

#[test]
fn repeated_runs_produce_identical_json() {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let args = report_args(repo.path().to_str().unwrap(), &tasks);
  assert_eq!(run_json(&args), run_json(&args));
}

#[test]
fn ai_summary_without_key_falls_back_and_is_disclosed() {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let mut args = report_args(repo.path().to_str().unwrap(), &tasks);
  args.push("--ai-summary".into());
  let v = run_json(&args);
  assert_eq!(v["narrative"]["source"], "template");
  let degradations = v["summary"]["degradations"].as_array().unwrap();
  assert!(degradations.iter().any(|d| d["scope"] == "summary"));
}

#[test]
fn custom_identifier_pattern_is_honored() {
  let repo = test_support::init_repo_with(&[("ops#42 rotate keys", "2025-08-05T10:00:00+00:00")]);
  let work = tempdir();
  let payload = serde_json::json!({ "issues": [ test_support::tracker_issue("OPS-42", "Rotate keys", "Medium", "done", None) ] });
  let tasks = test_support::write_tasks_fixture(work.path(), &payload);
  let mut args = report_args(repo.path().to_str().unwrap(), &tasks);
  args.extend(["--id-pattern".to_string(), r"(?i)(?P<project>[a-z]+)#(?P<number>\d+)".to_string()]);
  let v = run_json(&args);
  assert_eq!(v["tasks"][0]["commits"].as_array().unwrap().len(), 1);
  assert_eq!(v["summary"]["totals"]["linked_commits"], 1);
}
