// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve tracker credentials and AI settings from an injected variable lookup
// role: configuration
// inputs: A lookup closure (process env in the binary, fixtures in tests)
// outputs: TrackerCredentials, AiSettings passed explicitly into adapters
// invariants: No global state; every missing required variable is reported at once; blank values count as missing
// errors: ConfigError::MissingVariables
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_TRACKER_URL: &str = "JIRA_URL";
pub const ENV_TRACKER_USER: &str = "JIRA_USERNAME";
pub const ENV_TRACKER_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_AI_KEY: &str = "OPENAI_API_KEY";
pub const ENV_AI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_AI_MODEL: &str = "WORK_REPORT_AI_MODEL";

pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Upper bound for any single backend HTTP call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Read a variable from the process environment, treating blank values as unset.
pub fn env_lookup(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Clone, PartialEq, Eq)]
pub struct TrackerCredentials {
  pub base_url: String,
  pub username: String,
  pub api_token: String,
}

impl std::fmt::Debug for TrackerCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TrackerCredentials")
      .field("base_url", &self.base_url)
      .field("username", &self.username)
      .field("api_token", &"<redacted>")
      .finish()
  }
}

impl TrackerCredentials {
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let base_url = get(ENV_TRACKER_URL);
    let username = get(ENV_TRACKER_USER);
    let api_token = get(ENV_TRACKER_TOKEN);

    match (base_url, username, api_token) {
      (Some(base_url), Some(username), Some(api_token)) => Ok(Self {
        base_url: base_url.trim_end_matches('/').to_string(),
        username,
        api_token,
      }),
      (u, n, t) => {
        let missing = [(ENV_TRACKER_URL, u.is_none()), (ENV_TRACKER_USER, n.is_none()), (ENV_TRACKER_TOKEN, t.is_none())]
          .into_iter()
          .filter(|(_, absent)| *absent)
          .map(|(name, _)| name.to_string())
          .collect();
        Err(ConfigError::MissingVariables(missing))
      }
    }
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(env_lookup)
  }
}

/// Optional AI summary provider settings. A missing key is not an error.
#[derive(Clone, PartialEq, Eq)]
pub struct AiSettings {
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
}

impl std::fmt::Debug for AiSettings {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AiSettings")
      .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
      .field("base_url", &self.base_url)
      .field("model", &self.model)
      .finish()
  }
}

impl AiSettings {
  pub fn from_lookup<F>(lookup: F, model_override: Option<&str>) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let model = model_override
      .map(str::to_string)
      .or_else(|| get(ENV_AI_MODEL))
      .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());

    Self {
      api_key: get(ENV_AI_KEY),
      base_url: get(ENV_AI_BASE_URL)
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
      model,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn credentials_resolve_and_trim_trailing_slash() {
    let creds = TrackerCredentials::from_lookup(lookup_from(&[
      (ENV_TRACKER_URL, "https://example.atlassian.net/"),
      (ENV_TRACKER_USER, "dev@example.com"),
      (ENV_TRACKER_TOKEN, "secret"),
    ]))
    .unwrap();
    assert_eq!(creds.base_url, "https://example.atlassian.net");
    assert!(!format!("{:?}", creds).contains("secret"));
  }

  #[test]
  fn credentials_report_all_missing_names() {
    let err = TrackerCredentials::from_lookup(lookup_from(&[(ENV_TRACKER_USER, "dev")])).unwrap_err();
    assert_eq!(
      err,
      ConfigError::MissingVariables(vec![ENV_TRACKER_URL.into(), ENV_TRACKER_TOKEN.into()])
    );
  }

  #[test]
  fn blank_values_count_as_missing() {
    let err = TrackerCredentials::from_lookup(lookup_from(&[
      (ENV_TRACKER_URL, "https://x"),
      (ENV_TRACKER_USER, "  "),
      (ENV_TRACKER_TOKEN, "t"),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::MissingVariables(vec![ENV_TRACKER_USER.into()]));
  }

  #[test]
  fn ai_settings_defaults_and_override() {
    let s = AiSettings::from_lookup(lookup_from(&[]), None);
    assert_eq!(s.api_key, None);
    assert_eq!(s.model, DEFAULT_AI_MODEL);
    assert_eq!(s.base_url, DEFAULT_AI_BASE_URL);

    let s = AiSettings::from_lookup(lookup_from(&[(ENV_AI_MODEL, "env-model"), (ENV_AI_KEY, "k")]), Some("cli-model"));
    assert_eq!(s.model, "cli-model");
    assert_eq!(s.api_key.as_deref(), Some("k"));
  }

  #[test]
  #[serial]
  fn from_env_reads_process_environment() {
    let _env = test_support::with_env(&[
      (ENV_TRACKER_URL, "https://tracker.example"),
      (ENV_TRACKER_USER, "dev"),
      (ENV_TRACKER_TOKEN, "tok"),
    ]);
    let creds = TrackerCredentials::from_env().unwrap();
    assert_eq!(creds.base_url, "https://tracker.example");
    assert_eq!(creds.username, "dev");
  }
}
