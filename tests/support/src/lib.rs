//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{init_tracing, init_fixture_repo};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _repo = init_fixture_repo();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Author every fixture commit is made under.
pub const FIXTURE_AUTHOR_EMAIL: &str = "fixture@example.com";
pub const FIXTURE_AUTHOR_NAME: &str = "Fixture Bot";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Tracker credentials are removed from the child environment so tests never
/// reach a real backend by accident.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    let mut cmd = assert_cmd::Command::cargo_bin(bin).expect("binary target not found");
    for var in ["JIRA_URL", "JIRA_USERNAME", "JIRA_API_TOKEN", "OPENAI_API_KEY", "OPENAI_BASE_URL"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut prev = Vec::with_capacity(kv.len());
        for (k, v) in kv {
            let k_owned = k.to_string();
            prev.push((k_owned.clone(), env::var(k).ok()));
            env::set_var(k, v);
        }
        Self { prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, old) in self.prev.drain(..) {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

pub fn run(repo: &Path, args: &[&str]) {
    let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// `git init` with the fixture identity and no commits (unborn HEAD).
pub fn init_empty_repo() -> tempfile::TempDir {
    let dir = tempdir();
    run(dir.path(), &["init", "-q", "-b", "main"]);
    run(dir.path(), &["config", "user.name", FIXTURE_AUTHOR_NAME]);
    run(dir.path(), &["config", "user.email", FIXTURE_AUTHOR_EMAIL]);
    run(dir.path(), &["config", "commit.gpgsign", "false"]);
    dir
}

/// Append one commit touching a file named after its index, authored and
/// committed at `date` (ISO-8601 with offset, e.g. `2025-08-12T14:03:00+00:00`).
pub fn commit_at(repo: &Path, message: &str, date: &str) {
    commit_with_dates(repo, message, date, date);
}

/// Like `commit_at`, but with distinct author and committer dates, as a rebase
/// or cherry-pick leaves them.
pub fn commit_with_dates(repo: &Path, message: &str, author_date: &str, committer_date: &str) {
    let n = std::fs::read_dir(repo).map(|d| d.count()).unwrap_or(0);
    std::fs::write(repo.join(format!("change_{}.txt", n)), format!("{}\n", message)).unwrap();
    run(repo, &["add", "."]);

    let status = Command::new("git")
        .args(["commit", "-q", "-m", message])
        .current_dir(repo)
        .env("GIT_AUTHOR_DATE", author_date)
        .env("GIT_COMMITTER_DATE", committer_date)
        .status()
        .unwrap();
    assert!(status.success(), "git commit {:?} failed", message);
}

/// Create a repository holding the given `(message, date)` commits in order.
pub fn init_repo_with(commits: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = init_empty_repo();
    for (message, date) in commits {
        commit_at(dir.path(), message, date);
    }
    dir
}

/// Standard fixture: two commits referencing ABC-1 (one lower-case), one
/// referencing ABC-2, and one unlinked chore commit, all in August 2025 UTC.
pub fn init_fixture_repo() -> tempfile::TempDir {
    init_repo_with(&[
        ("ABC-1: add checkout endpoint", "2025-08-12T14:03:00+00:00"),
        ("fix abc-1 rounding in cart totals", "2025-08-13T09:12:00+00:00"),
        ("ABC-2 document the login flow", "2025-08-14T10:00:00+00:00"),
        ("chore: bump dependencies", "2025-08-15T16:30:00+00:00"),
    ])
}

/// Write a tracker search-response fixture to `<dir>/tasks.json` and return its path.
#[cfg(feature = "serde")]
pub fn write_tasks_fixture(dir: &Path, payload: &serde_json::Value) -> PathBuf {
    let path = dir.join("tasks.json");
    std::fs::write(&path, serde_json::to_vec_pretty(payload).unwrap()).unwrap();
    path
}

/// A tracker issue in the search-response shape the task source reads.
#[cfg(feature = "serde")]
pub fn tracker_issue(key: &str, summary: &str, priority: &str, status_category: &str, timespent: Option<u64>) -> serde_json::Value {
    serde_json::json!({
        "key": key,
        "fields": {
            "summary": summary,
            "description": "",
            "issuetype": { "name": "Task" },
            "priority": { "name": priority },
            "status": {
                "name": if status_category == "done" { "Done" } else { "In Progress" },
                "statusCategory": { "key": status_category }
            },
            "timespent": timespent,
            "timeoriginalestimate": null,
            "resolutiondate": if status_category == "done" { serde_json::json!("2025-08-13T17:00:00.000+0000") } else { serde_json::Value::Null },
            "updated": "2025-08-14T09:00:00.000+0000",
            "customfield_10020": [ { "name": "Sprint 7" } ]
        }
    })
}
