use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::error::ReportError;
use crate::identifiers::IdentifierExtractor;
use crate::render::{ReportFormat, ReportKind};
use crate::sources::jira::DEFAULT_SPRINT_FIELD;
use crate::window::{resolve_window, ReportTz, ReportWindow, WindowSpec};

#[derive(Parser, Debug)]
#[command(
    name = "work-report",
    version,
    about = "Summarize a contributor's tracker tasks and git commits over a date range",
    long_about = None
)]
pub struct Cli {
  /// Tracker assignee (account id, username or email, as the tracker's JQL accepts it)
  #[arg(long, required_unless_present = "gen_man")]
  pub assignee: Option<String>,

  /// Git author filter (name or email); defaults to --assignee
  #[arg(long)]
  pub author: Option<String>,

  /// First day of the window, YYYY-MM-DD (inclusive); must be paired with --end
  #[arg(long, alias = "since")]
  pub start: Option<String>,

  /// Last day of the window, YYYY-MM-DD (inclusive); must be paired with --start
  #[arg(long, alias = "until")]
  pub end: Option<String>,

  /// Calendar month, e.g. 2025-08
  #[arg(long)]
  pub month: Option<String>,

  /// Natural language window, e.g. "last week" or "last 30 days"
  #[arg(long = "for")]
  pub for_str: Option<String>,

  /// Repository paths, comma-separated or repeated (default: current dir)
  #[arg(long, value_delimiter = ',', default_value = ".")]
  pub repos: Vec<String>,

  /// Output format
  #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
  pub format: ReportFormat,

  /// Report type
  #[arg(long = "report-type", value_enum, default_value_t = ReportKind::Detailed)]
  pub report_type: ReportKind,

  /// Output file path, or "-" for stdout
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Identifier regex; named groups `project` and `number` are joined as PROJECT-NUMBER
  #[arg(long = "id-pattern")]
  pub id_pattern: Option<String>,

  /// Time zone used to date commits: local, utc, or an IANA name such as Europe/Berlin
  #[arg(long, default_value = "local")]
  pub tz: String,

  /// Include merge commits
  #[arg(long)]
  pub include_merges: bool,

  /// Read commits from every ref instead of HEAD only
  #[arg(long)]
  pub all_branches: bool,

  /// Tracker field holding sprint membership
  #[arg(long = "sprint-field", default_value = DEFAULT_SPRINT_FIELD)]
  pub sprint_field: String,

  /// Ask an OpenAI-compatible provider for the summary paragraph (falls back to a template)
  #[arg(long = "ai-summary")]
  pub ai_summary: bool,

  /// Model for --ai-summary (overrides WORK_REPORT_AI_MODEL)
  #[arg(long = "ai-model")]
  pub ai_model: Option<String>,

  /// More logging on stderr (-v info, -vv debug); RUST_LOG wins when set
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Read tracker issues from a recorded search response instead of the network (hidden; tests/offline)
  #[arg(long = "tasks-json", hide = true)]
  pub tasks_json: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for natural-language parsing (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub assignee: String,
  pub author: String,
  pub window: WindowSpec,
  pub repos: Vec<String>,
  pub format: ReportFormat,
  pub kind: ReportKind,
  pub out: String,
  pub id_pattern: Option<String>,
  pub tz: ReportTz,
  pub include_merges: bool,
  pub all_branches: bool,
  pub sprint_field: String,
  pub ai_summary: bool,
  pub ai_model: Option<String>,
  pub tasks_json: Option<PathBuf>,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  // Validate window selection
  let window = match (&cli.start, &cli.end, &cli.month, &cli.for_str) {
    (Some(s), Some(e), None, None) => WindowSpec::Dates { start: s.clone(), end: e.clone() },
    (None, None, Some(ym), None) => WindowSpec::Month { ym: ym.clone() },
    (None, None, None, Some(p)) => WindowSpec::ForPhrase { phrase: p.clone() },
    (None, None, None, None) => bail!("Provide one of --start/--end, --month, or --for"),
    (Some(_), None, None, None) | (None, Some(_), None, None) => bail!("--start and --end must be given together"),
    _ => bail!("Ambiguous time selection: choose only one of --start/--end | --month | --for"),
  };

  let assignee = cli.assignee.as_deref().unwrap_or("").trim().to_string();
  if assignee.is_empty() {
    bail!("--assignee must not be empty");
  }
  let author = cli
    .author
    .map(|a| a.trim().to_string())
    .filter(|a| !a.is_empty())
    .unwrap_or_else(|| assignee.clone());

  let mut repos: Vec<String> = cli.repos.iter().map(|r| r.trim().to_string()).filter(|r| !r.is_empty()).collect();
  if repos.is_empty() {
    repos.push(".".into());
  }

  Ok(EffectiveConfig {
    assignee,
    author,
    window,
    repos,
    format: cli.format,
    kind: cli.report_type,
    out: cli.out,
    id_pattern: cli.id_pattern,
    tz: ReportTz::parse(&cli.tz)?,
    include_merges: cli.include_merges,
    all_branches: cli.all_branches,
    sprint_field: cli.sprint_field,
    ai_summary: cli.ai_summary,
    ai_model: cli.ai_model,
    tasks_json: cli.tasks_json,
    now_override: cli.now_override,
  })
}

impl EffectiveConfig {
  /// Resolve the window against `today` and compile the identifier pattern.
  pub fn resolve(&self, today: NaiveDate) -> Result<(ReportWindow, IdentifierExtractor), ReportError> {
    let window = resolve_window(&self.window, today)?;
    let extractor = IdentifierExtractor::from_option(self.id_pattern.as_deref())?;
    Ok((window, extractor))
  }
}
