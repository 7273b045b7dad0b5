// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Commit source backed by local git work trees, with parallel multi-repository fetch
// role: sources/git
// inputs: RepoSpec list, author filter, ReportWindow, ReportTz, merge/ref toggles
// outputs: Vec<RepositoryFetch> in input order; commits tagged with their repository name
// side_effects: Spawns `git` subprocesses (one per repository, concurrently via rayon)
// invariants:
// - a failing repository never aborts the others; it is returned degraded with zero commits
// - an empty repository (unborn HEAD) yields zero commits and is not degraded
// - commits are kept only when their author date, in the report zone, falls inside the window
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::gitio::{self, LogQuery, RawCommit};
use crate::model::{Commit, Person, RepoSpec};
use crate::sources::CommitSource;
use crate::util::{canonicalize_lossy, short_sha};
use crate::window::{ReportTz, ReportWindow};

#[derive(Clone, Copy, Debug)]
pub struct GitCommitSource {
  pub tz: ReportTz,
  pub include_merges: bool,
  pub all_refs: bool,
}

impl GitCommitSource {
  pub fn new(tz: ReportTz) -> Self {
    Self { tz, include_merges: false, all_refs: false }
  }

  fn to_commit(&self, raw: RawCommit, repo: &RepoSpec) -> Option<Commit> {
    let (date, authored_local) = self.tz.localize(raw.at)?;
    let subject = raw.message.lines().next().unwrap_or("").trim().to_string();
    Some(Commit {
      short_sha: short_sha(&raw.sha),
      sha: raw.sha,
      author: Person { name: raw.author_name, email: raw.author_email },
      timestamp: raw.at,
      date,
      authored_local,
      subject,
      message: raw.message,
      repository: repo.name.clone(),
    })
  }
}

fn unavailable(repo: &RepoSpec, reason: impl Into<String>) -> FetchError {
  FetchError::RepositoryUnavailable { repo: repo.name.clone(), reason: reason.into() }
}

impl CommitSource for GitCommitSource {
  fn fetch_commits(&self, repo: &RepoSpec, author: &str, window: &ReportWindow) -> Result<Vec<Commit>, FetchError> {
    if !Path::new(&repo.path).is_dir() {
      return Err(unavailable(repo, format!("{} is not a directory", repo.path)));
    }
    match gitio::is_work_tree(&repo.path) {
      Ok(true) => {}
      Ok(false) => return Err(unavailable(repo, "not inside a git work tree")),
      Err(e) => return Err(unavailable(repo, format!("{:#}", e))),
    }
    if !gitio::has_head(&repo.path) {
      debug!(repo = %repo.name, "repository has no commits yet");
      return Ok(Vec::new());
    }

    let since = window.git_since();
    let q = LogQuery {
      author,
      since: &since,
      include_merges: self.include_merges,
      all_refs: self.all_refs,
    };
    let raw = gitio::log_commits(&repo.path, &q).map_err(|e| unavailable(repo, format!("{:#}", e)))?;

    let commits: Vec<Commit> = raw
      .into_iter()
      .filter_map(|r| self.to_commit(r, repo))
      .filter(|c| window.contains(c.date))
      .collect();
    debug!(repo = %repo.name, count = commits.len(), "fetched commits");
    Ok(commits)
  }
}

/// Outcome of reading one repository.
#[derive(Debug, Clone)]
pub struct RepositoryFetch {
  pub repo: RepoSpec,
  pub commits: Vec<Commit>,
  pub degraded: Option<String>,
}

/// Fetch every repository concurrently. Output order matches `repos`.
pub fn fetch_repositories<S>(source: &S, repos: &[RepoSpec], author: &str, window: &ReportWindow) -> Vec<RepositoryFetch>
where
  S: CommitSource + ?Sized,
{
  repos
    .par_iter()
    .map(|repo| match source.fetch_commits(repo, author, window) {
      Ok(commits) => RepositoryFetch { repo: repo.clone(), commits, degraded: None },
      Err(e) => {
        warn!(repo = %repo.name, error = %e, "repository skipped");
        RepositoryFetch { repo: repo.clone(), commits: Vec::new(), degraded: Some(e.to_string()) }
      }
    })
    .collect()
}

/// Turn raw `--repos` paths into uniquely named repositories. The name is the
/// directory's base name; on a clash it becomes the canonical path, and then the
/// canonical path with a numeric suffix.
pub fn repo_specs(paths: &[String]) -> Vec<RepoSpec> {
  let mut taken: HashSet<String> = HashSet::new();
  let mut out = Vec::with_capacity(paths.len());
  for raw in paths {
    let abs = canonicalize_lossy(raw);
    let base = Path::new(&abs)
      .file_name()
      .map(|s| s.to_string_lossy().to_string())
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| abs.clone());

    let name = if !taken.contains(&base) {
      base
    } else if !taken.contains(&abs) {
      abs.clone()
    } else {
      (2..)
        .map(|i| format!("{}-{}", abs, i))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| abs.clone())
    };
    taken.insert(name.clone());
    out.push(RepoSpec { name, path: raw.clone() });
  }
  out
}
