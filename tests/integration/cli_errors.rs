use crate::common::BIN;
use predicates::prelude::*;
use test_support::{cmd_bin, init_fixture_repo};

#[test]
fn inverted_range_is_rejected() {
  cmd_bin(BIN)
    .args(["--assignee", "dev", "--start", "2025-08-10", "--end", "2025-08-01", "--tasks-json", "unused.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("end date 2025-08-01 is before start date 2025-08-10"));
}

#[test]
fn missing_tracker_credentials_are_listed() {
  let repo = init_fixture_repo();
  cmd_bin(BIN)
    .args(["--assignee", "dev", "--month", "2025-08", "--repos", repo.path().to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing environment variables: JIRA_URL, JIRA_USERNAME, JIRA_API_TOKEN"));
}

#[test]
fn unreachable_tracker_is_fatal() {
  let repo = init_fixture_repo();
  cmd_bin(BIN)
    .env("JIRA_URL", "http://127.0.0.1:9")
    .env("JIRA_USERNAME", "dev")
    .env("JIRA_API_TOKEN", "token")
    .args(["--assignee", "dev", "--month", "2025-08", "--repos", repo.path().to_str().unwrap()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("task backend fetch failed"));
}

#[test]
fn window_selection_is_required() {
  cmd_bin(BIN)
    .args(["--assignee", "dev"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Provide one of --start/--end, --month, or --for"));
}

#[test]
fn bad_identifier_pattern_is_a_config_error() {
  cmd_bin(BIN)
    .args(["--assignee", "dev", "--month", "2025-08", "--id-pattern", "(unclosed"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid identifier pattern"));
}
