//! Error taxonomy for a report run.
//!
//! Only configuration problems and a failed task backend abort a run. Repository
//! access problems are carried as `FetchError::RepositoryUnavailable` up to the
//! orchestration layer, which turns them into recorded degradations.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("missing environment variables: {}", .0.join(", "))]
  MissingVariables(Vec<String>),

  #[error("end date {end} is before start date {start}")]
  InvertedRange { start: String, end: String },

  #[error("invalid date '{0}', expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("invalid --month '{0}', expected YYYY-MM")]
  InvalidMonth(String),

  #[error("could not resolve time phrase '{0}'")]
  UnresolvedPhrase(String),

  #[error("invalid identifier pattern: {0}")]
  InvalidPattern(String),

  #[error("unknown time zone '{0}'")]
  UnknownTimeZone(String),

  #[error("{0}")]
  Selection(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
  #[error("tracker rejected credentials (HTTP {status})")]
  Unauthorized { status: u16 },

  #[error("tracker unreachable: {0}")]
  Unreachable(String),

  #[error("tracker returned HTTP {status}: {message}")]
  Backend { status: u16, message: String },

  #[error("tracker response malformed: {0}")]
  Malformed(String),

  #[error("repository {repo} unavailable: {reason}")]
  RepositoryUnavailable { repo: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("task backend fetch failed: {0}")]
  TaskBackend(#[source] FetchError),
}
