// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Optional AI-written summary paragraph with a deterministic template fallback
// role: narrative/summary
// inputs: WorkReport digest; optional SummaryProvider (OpenAI-compatible chat completions)
// outputs: Narrative text plus an optional Degradation when the provider failed
// side_effects: One HTTP POST per run when a provider is configured
// invariants:
// - provider failure never fails the run; the template summary is used instead
// - template output depends only on the report
// errors: Swallowed into a Degradation (scope = summary) and a warning log
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AiSettings;
use crate::ext::serde_json::JsonFetch;
use crate::model::{Degradation, DegradationScope, WorkReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
  Ai,
  Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
  pub source: NarrativeSource,
  pub text: String,
}

pub trait SummaryProvider {
  fn summarize(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiProvider {
  settings: AiSettings,
  agent: ureq::Agent,
}

impl OpenAiProvider {
  pub fn new(settings: AiSettings, timeout: Duration) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    Self { settings, agent }
  }
}

impl SummaryProvider for OpenAiProvider {
  fn summarize(&self, prompt: &str) -> Result<String> {
    let Some(key) = self.settings.api_key.as_deref() else {
      bail!("OPENAI_API_KEY is not set");
    };
    let url = format!("{}/chat/completions", self.settings.base_url);
    debug!(%url, model = %self.settings.model, "requesting AI summary");

    let body = serde_json::json!({
      "model": self.settings.model,
      "temperature": 0.3,
      "messages": [
        { "role": "system", "content": "You write concise, professional summaries of a developer's completed work for managers." },
        { "role": "user", "content": prompt }
      ]
    });

    let resp = self
      .agent
      .post(&url)
      .set("Authorization", &format!("Bearer {}", key))
      .set("Content-Type", "application/json")
      .send_json(body)
      .map_err(|e| match e {
        ureq::Error::Status(code, _) => anyhow!("AI provider returned HTTP {}", code),
        ureq::Error::Transport(t) => anyhow!("AI provider unreachable: {}", t),
      })?;

    let v: serde_json::Value = resp.into_json()?;
    let text = v.fetch("choices.0.message.content").to::<String>().unwrap_or_default();
    if text.trim().is_empty() {
      bail!("AI provider returned no summary text");
    }
    Ok(text.trim().to_string())
  }
}

/// Prompt listing every task with its type, priority and estimate.
pub fn build_prompt(report: &WorkReport) -> String {
  let s = &report.summary;
  let mut p = format!(
    "Summarize the work of {} between {} and {} in one or two short paragraphs. \
     Focus on business impact, not implementation details.\n\nTasks:\n",
    s.assignee, s.window.start, s.window.end
  );
  for t in &report.tasks {
    let _ = writeln!(
      p,
      "- {}: {} (type: {}, priority: {}, category: {}, estimated {:.1}h)",
      t.task.id,
      t.task.summary,
      t.estimate.task_type.label(),
      t.task.priority.label(),
      t.category.label(),
      t.estimate.hours()
    );
  }
  let _ = write!(
    p,
    "\nTotals: {} tasks, {} completed, {:.1} hours, {} commits.",
    s.totals.tasks, s.totals.completed_tasks, s.totals.hours, s.totals.commits
  );
  p
}

/// Deterministic summary used when no AI text is available.
pub fn template_summary(report: &WorkReport) -> String {
  let s = &report.summary;
  let mut out = format!(
    "Between {} and {}, {} worked on {} task{} ({} completed), an estimated {:.1} hours of work",
    s.window.start,
    s.window.end,
    s.assignee,
    s.totals.tasks,
    if s.totals.tasks == 1 { "" } else { "s" },
    s.totals.completed_tasks,
    s.totals.hours
  );

  let active_repos = s.repositories.values().filter(|r| r.commits > 0).count();
  if s.totals.commits > 0 {
    let _ = write!(
      out,
      " backed by {} commit{} across {} repositor{}",
      s.totals.commits,
      if s.totals.commits == 1 { "" } else { "s" },
      active_repos,
      if active_repos == 1 { "y" } else { "ies" }
    );
  }
  out.push('.');

  let top = s
    .categories
    .iter()
    .filter(|c| c.seconds > 0)
    .max_by(|a, b| a.seconds.cmp(&b.seconds).then_with(|| b.category.cmp(&a.category)));
  if let Some(c) = top {
    let _ = write!(out, " Most effort went to {} ({:.0}% of estimated time).", c.label, c.percentage);
  }
  if s.window.working_days > 0 && s.totals.seconds > 0 {
    let _ = write!(out, " That averages {:.1} hours per working day.", s.totals.average_hours_per_working_day);
  }
  out
}

/// Produce the narrative. `provider` is None when AI summaries were not requested.
pub fn narrate(report: &WorkReport, provider: Option<&dyn SummaryProvider>) -> (Narrative, Option<Degradation>) {
  let Some(p) = provider else {
    return (Narrative { source: NarrativeSource::Template, text: template_summary(report) }, None);
  };

  match p.summarize(&build_prompt(report)) {
    Ok(text) => (Narrative { source: NarrativeSource::Ai, text }, None),
    Err(e) => {
      warn!(error = %e, "AI summary unavailable; using template summary");
      let degradation = Degradation {
        scope: DegradationScope::Summary,
        subject: "ai-summary".into(),
        message: format!("AI summary unavailable, template used: {}", e),
      };
      (Narrative { source: NarrativeSource::Template, text: template_summary(report) }, Some(degradation))
    }
  }
}
