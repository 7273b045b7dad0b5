use crate::common::{run_json, standard_tasks};
use test_support::{init_fixture_repo, tempdir, FIXTURE_AUTHOR_EMAIL};

fn window_for(phrase_args: &[&str]) -> (String, String, serde_json::Value) {
  let repo = init_fixture_repo();
  let work = tempdir();
  let tasks = standard_tasks(work.path());
  let mut args: Vec<String> = vec![
    "--assignee".into(),
    "dev".into(),
    "--author".into(),
    FIXTURE_AUTHOR_EMAIL.into(),
    "--repos".into(),
    repo.path().to_string_lossy().to_string(),
    "--tz".into(),
    "utc".into(),
    "--tasks-json".into(),
    tasks.to_string_lossy().to_string(),
  ];
  args.extend(phrase_args.iter().map(|s| s.to_string()));
  let v = run_json(&args);
  let w = &v["summary"]["window"];
  (w["start"].as_str().unwrap().to_string(), w["end"].as_str().unwrap().to_string(), v.clone())
}

#[test]
fn last_week_phrase_resolves_to_previous_iso_week() {
  // 2025-08-20 is a Wednesday
  let (start, end, v) = window_for(&["--for", "last week", "--now-override", "2025-08-20T12:00:00"]);
  assert_eq!(start, "2025-08-11");
  assert_eq!(end, "2025-08-17");
  assert_eq!(v["summary"]["totals"]["commits"], 4);
  assert_eq!(v["summary"]["weekly"].as_array().unwrap().len(), 1);
}

#[test]
fn single_day_window_keeps_same_day_commits_only() {
  let (start, end, v) = window_for(&["--start", "2025-08-13", "--end", "2025-08-13"]);
  assert_eq!(start, end);
  assert_eq!(v["summary"]["totals"]["commits"], 1);
  assert_eq!(v["summary"]["window"]["working_days"], 1);
}

#[test]
fn month_window_covers_whole_month() {
  let (start, end, _) = window_for(&["--month", "2025-02"]);
  assert_eq!(start, "2025-02-01");
  assert_eq!(end, "2025-02-28");
}
