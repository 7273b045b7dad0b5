use crate::common::{report_args, run_json, standard_tasks};
use test_support::{init_empty_repo, init_fixture_repo, init_repo_with, tempdir};

fn repo_entry<'a>(v: &'a serde_json::Value, path_suffix: &str) -> &'a serde_json::Value {
  v["summary"]["repositories"]
    .as_object()
    .unwrap()
    .values()
    .find(|r| r["path"].as_str().unwrap_or("").ends_with(path_suffix))
    .unwrap_or_else(|| panic!("no repository ending with {}", path_suffix))
}

#[test]
fn invalid_repository_is_degraded_not_fatal() {
  let good = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let missing = work.path().join("does-not-exist");
  let repos = format!("{},{}", good.path().display(), missing.display());

  let v = run_json(&report_args(&repos, &tasks));
  let s = &v["summary"];
  assert_eq!(s["totals"]["commits"], 4);
  assert_eq!(repo_entry(&v, "does-not-exist")["commits"], 0);
  assert!(repo_entry(&v, "does-not-exist")["degraded"].is_string());
  let degradations = s["degradations"].as_array().unwrap();
  assert_eq!(degradations.len(), 1);
  assert_eq!(degradations[0]["scope"], "repository");
}

#[test]
fn task_spanning_repositories_counts_in_both() {
  let api = init_repo_with(&[("ABC-1 api side", "2025-08-12T10:00:00+00:00")]);
  let web = init_repo_with(&[("ABC-1 web side", "2025-08-12T11:00:00+00:00"), ("misc", "2025-08-12T12:00:00+00:00")]);
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let repos = format!("{},{}", api.path().display(), web.path().display());

  let v = run_json(&report_args(&repos, &tasks));
  let a = repo_entry(&v, &api.path().file_name().unwrap().to_string_lossy());
  let w = repo_entry(&v, &web.path().file_name().unwrap().to_string_lossy());
  assert_eq!(a["seconds"], 10_800);
  assert_eq!(w["seconds"], 10_800);
  assert_eq!(w["unlinked_commits"], 1);
  assert_eq!(v["summary"]["totals"]["commits"], 3);
  let abc1 = &v["tasks"][0];
  assert_eq!(abc1["commits"].as_array().unwrap().len(), 2);
}

#[test]
fn empty_repository_is_not_degraded() {
  let fresh = init_empty_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let v = run_json(&report_args(fresh.path().to_str().unwrap(), &tasks));
  assert!(v["summary"]["degradations"].as_array().unwrap().is_empty());
  assert_eq!(v["summary"]["totals"]["commits"], 0);
}
