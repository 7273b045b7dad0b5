use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use tracing::info;

use work_report::cli::{normalize, Cli};
use work_report::config::{env_lookup, AiSettings, TrackerCredentials, HTTP_TIMEOUT};
use work_report::error::ReportError;
use work_report::narrative::{narrate, OpenAiProvider, SummaryProvider};
use work_report::pipeline::{ReportEngine, ReportRequest};
use work_report::render::{render, RenderContext};
use work_report::sources::git::{repo_specs, GitCommitSource};
use work_report::sources::jira::{FixtureTrackerApi, JiraHttpApi, JiraTaskSource, TrackerApi};
use work_report::util;
use work_report::window::parse_now_override;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_logging(cli.verbose);

  // Phase 1: normalize CLI and resolve the window
  let cfg = normalize(cli)?;
  let now = util::effective_now(parse_now_override(cfg.now_override.as_deref()));
  let (window, extractor) = cfg.resolve(now.date_naive())?;

  // Phase 2: wire sources from explicit configuration
  let api: Box<dyn TrackerApi> = match &cfg.tasks_json {
    Some(path) => Box::new(FixtureTrackerApi::from_path(path)?),
    None => {
      let creds = TrackerCredentials::from_env().map_err(ReportError::from)?;
      Box::new(JiraHttpApi::new(creds, HTTP_TIMEOUT))
    }
  };
  let tasks = JiraTaskSource::new(api, cfg.sprint_field.clone(), cfg.tz);
  let commits = GitCommitSource { tz: cfg.tz, include_merges: cfg.include_merges, all_refs: cfg.all_branches };

  let req = ReportRequest {
    assignee: cfg.assignee.clone(),
    author: cfg.author.clone(),
    window,
    repos: repo_specs(&cfg.repos),
  };

  // Phase 3: run the engine
  let mut report = ReportEngine::new(&tasks, &commits, extractor).run(&req)?;

  // Phase 4: narrative, render, write
  let provider = cfg
    .ai_summary
    .then(|| OpenAiProvider::new(AiSettings::from_lookup(env_lookup, cfg.ai_model.as_deref()), HTTP_TIMEOUT));
  let (narrative, degraded) = narrate(&report, provider.as_ref().map(|p| p as &dyn SummaryProvider));
  if let Some(d) = degraded {
    report.summary.degradations.push(d);
  }

  let generated_at = now.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true);
  let ctx = RenderContext { report: &report, narrative: &narrative, generated_at: &generated_at, kind: cfg.kind };
  let rendered = render(cfg.format, &ctx)?;
  util::write_output(&cfg.out, &rendered)?;
  if cfg.out != "-" {
    info!(path = %cfg.out, "report written");
  }

  Ok(())
}
