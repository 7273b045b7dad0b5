// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extract task identifiers (e.g. ABC-123) from free-text commit messages
// role: parsing/pure
// inputs: commit message text; identifier pattern (default or caller-supplied regex)
// outputs: Distinct upper-cased identifiers in first-occurrence order
// invariants: Never panics on input; no match yields an empty Vec; identical input yields identical output
// errors: Only pattern compilation can fail (ConfigError::InvalidPattern)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

pub const DEFAULT_PATTERN: &str = r"(?i)(?P<project>[a-z][a-z0-9]+)[-_](?P<number>[0-9]+)";

static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_PATTERN).expect("static regex"));

#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
  re: Regex,
  structured: bool,
}

impl Default for IdentifierExtractor {
  fn default() -> Self {
    Self { re: DEFAULT_RE.clone(), structured: true }
  }
}

impl IdentifierExtractor {
  /// Build from a caller-supplied regex. With named groups `project` and `number` the
  /// identifier is rebuilt as `PROJECT-NUMBER`; otherwise group 1 (or the whole match)
  /// is upper-cased.
  pub fn new(pattern: &str) -> Result<Self, ConfigError> {
    let re = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
    let names: HashSet<&str> = re.capture_names().flatten().collect();
    let structured = names.contains("project") && names.contains("number");
    Ok(Self { re, structured })
  }

  pub fn from_option(pattern: Option<&str>) -> Result<Self, ConfigError> {
    match pattern {
      Some(p) => Self::new(p),
      None => Ok(Self::default()),
    }
  }

  /// Distinct identifiers found in `message`, normalized, first occurrence first.
  pub fn extract(&self, message: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for caps in self.re.captures_iter(message) {
      let Some(whole) = caps.get(0) else { continue };

      // Reject matches glued to a preceding alphanumeric ("x86-64" style tails, "1ABC-2").
      let glued = message[..whole.start()]
        .chars()
        .next_back()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false);
      if glued {
        continue;
      }

      let id = if self.structured {
        match (caps.name("project"), caps.name("number")) {
          (Some(p), Some(n)) => format!("{}-{}", p.as_str().to_ascii_uppercase(), n.as_str()),
          _ => continue,
        }
      } else {
        caps.get(1).unwrap_or(whole).as_str().to_ascii_uppercase()
      };

      if seen.insert(id.clone()) {
        out.push(id);
      }
    }

    out
  }
}

/// Normalize a tracker key the same way extracted identifiers are normalized.
pub fn normalize_key(key: &str) -> String {
  key.trim().to_ascii_uppercase()
}
