use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

use crate::model::{AggregationSummary, Commit, EstimateSource, TaskReport, WorkReport};
use crate::narrative::Narrative;

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Every task with its commits
    Detailed,
    /// Headline metrics and breakdowns only
    Executive,
}

/// Read-only input shared by every renderer.
pub struct RenderContext<'a> {
    pub report: &'a WorkReport,
    pub narrative: &'a Narrative,
    /// Kept outside the summary so summaries stay reproducible.
    pub generated_at: &'a str,
    pub kind: ReportKind,
}

pub fn render(format: ReportFormat, ctx: &RenderContext) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(ctx)),
        ReportFormat::Markdown => Ok(render_markdown(ctx)),
        ReportFormat::Json => render_json(ctx),
    }
}

#[derive(Serialize)]
struct JsonEnvelope<'a> {
    generated_at: &'a str,
    report_type: ReportKind,
    narrative: &'a Narrative,
    summary: &'a AggregationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    tasks: Option<&'a [TaskReport]>,
}

pub fn render_json(ctx: &RenderContext) -> Result<String> {
    let env = JsonEnvelope {
        generated_at: ctx.generated_at,
        report_type: ctx.kind,
        narrative: ctx.narrative,
        summary: &ctx.report.summary,
        tasks: match ctx.kind {
            ReportKind::Detailed => Some(ctx.report.tasks.as_slice()),
            ReportKind::Executive => None,
        },
    };
    let mut s = serde_json::to_string_pretty(&env)?;
    s.push('\n');
    Ok(s)
}

/// `YYYY-MM-DD HH:MM` in the report zone.
fn commit_stamp(c: &Commit) -> String {
    if c.authored_local.len() >= 16 {
        c.authored_local[..16].replacen('T', " ", 1)
    } else {
        c.date.to_string()
    }
}

pub fn commit_line(c: &Commit) -> String {
    format!("{}: {} ({}) [{}]", c.short_sha, c.subject, commit_stamp(c), c.repository)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

fn estimate_note(t: &TaskReport) -> String {
    let mut note = format!("{:.2}h ({})", t.estimate.hours(), t.estimate.source.label());
    if t.estimate.floor_applied {
        note.push_str(", policy minimum applied");
    }
    note
}

fn methodology_lines(s: &AggregationSummary) -> Vec<String> {
    let mut lines: Vec<String> = s
        .estimate_sources
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(src, n)| format!("{}: {}", src.label(), plural(*n, "task", "tasks")))
        .collect();
    if s.estimate_sources.get(&EstimateSource::CommitActivity).copied().unwrap_or(0) > 0 {
        lines.push(
            "Commit-activity estimates apply a 2.5x lifecycle multiplier for planning, review, testing and deployment, \
             and never fall below a per-task-type policy minimum (2-8h)."
                .into(),
        );
    }
    lines
}

fn degradation_lines(s: &AggregationSummary) -> Vec<String> {
    s.degradations
        .iter()
        .map(|d| match d.scope {
            crate::model::DegradationScope::Repository => format!("repository {}: {}", d.subject, d.message),
            crate::model::DegradationScope::Summary => d.message.clone(),
        })
        .collect()
}

// --- Plain text ---

pub fn render_text(ctx: &RenderContext) -> String {
    let s = &ctx.report.summary;
    let mut out = String::new();

    let title = match ctx.kind {
        ReportKind::Detailed => "WORK REPORT",
        ReportKind::Executive => "EXECUTIVE WORK SUMMARY",
    };
    let _ = writeln!(out, "{}: {}", title, s.assignee);
    let _ = writeln!(
        out,
        "Period: {} to {} ({}, {})",
        s.window.start,
        s.window.end,
        plural(s.window.calendar_days as usize, "day", "days"),
        plural(s.window.working_days as usize, "working day", "working days")
    );
    let _ = writeln!(out, "Generated: {}", ctx.generated_at);
    let _ = writeln!(out);

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", ctx.narrative.text);
    let _ = writeln!(out);

    let _ = writeln!(out, "KEY METRICS");
    let _ = writeln!(out, "  Total estimated time: {:.2}h", s.totals.hours);
    let _ = writeln!(out, "  Tasks: {} ({} completed, {:.1}% completion)", s.totals.tasks, s.totals.completed_tasks, s.totals.completion_rate);
    let _ = writeln!(out, "  Average per working day: {:.2}h", s.totals.average_hours_per_working_day);
    let _ = writeln!(
        out,
        "  Commits: {} ({} linked to tasks, {} unlinked)",
        s.totals.commits, s.totals.linked_commits, s.totals.unlinked_commits
    );
    let _ = writeln!(out);

    if ctx.kind == ReportKind::Detailed {
        let _ = writeln!(out, "TASKS");
        let _ = writeln!(out, "{}", RULE);
        if ctx.report.tasks.is_empty() {
            let _ = writeln!(out, "No tasks found for this period.");
        }
        for t in &ctx.report.tasks {
            let _ = writeln!(out, "{}: {}", t.task.id, t.task.summary);
            let _ = writeln!(
                out,
                "  Type: {} | Priority: {} | Category: {}",
                t.task.issue_type.as_deref().unwrap_or(t.estimate.task_type.label()),
                t.task.priority.label(),
                t.category.label()
            );
            if let Some(sprint) = &t.task.sprint {
                let _ = writeln!(out, "  Sprint: {}", sprint);
            }
            let _ = writeln!(out, "  Estimated time: {}", estimate_note(t));
            if t.commits.is_empty() {
                let _ = writeln!(out, "  No commits found for this task.");
            } else {
                let _ = writeln!(out, "  Commits:");
                for c in &t.commits {
                    let _ = writeln!(out, "    {}", commit_line(c));
                }
            }
            let _ = writeln!(out, "{}", THIN_RULE);
        }
        let _ = writeln!(
            out,
            "Total estimated time: {:.2}h across {}",
            s.totals.hours,
            plural(s.totals.tasks, "task", "tasks")
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "REPOSITORIES");
    if s.repositories.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (name, r) in &s.repositories {
        match &r.degraded {
            Some(reason) => {
                let _ = writeln!(out, "  {}: DEGRADED, 0 commits ({})", name, reason);
            }
            None => {
                let _ = writeln!(
                    out,
                    "  {}: {} ({} linked, {} unlinked), {}, {:.2}h, {:.1}% of commits",
                    name,
                    plural(r.commits, "commit", "commits"),
                    r.linked_commits,
                    r.unlinked_commits,
                    plural(r.tasks, "task", "tasks"),
                    r.hours,
                    r.percentage
                );
            }
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "CATEGORIES");
    for c in s.categories.iter().filter(|c| c.tasks > 0) {
        let _ = writeln!(out, "  {}: {}, {:.2}h ({:.1}%)", c.label, plural(c.tasks, "task", "tasks"), c.hours, c.percentage);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "WEEKLY");
    for w in &s.weekly {
        let _ = writeln!(out, "  {} ({}): {} completed, {:.2}h", w.week, w.week_start, w.completed_tasks, w.hours);
    }

    if !s.sprints.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "SPRINTS");
        for sp in &s.sprints {
            let _ = writeln!(out, "  {}: {} ({} completed), {:.2}h", sp.sprint, plural(sp.tasks, "task", "tasks"), sp.completed_tasks, sp.hours);
        }
    }

    let method = methodology_lines(s);
    if !method.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "ESTIMATION METHOD");
        for line in method {
            let _ = writeln!(out, "  {}", line);
        }
    }

    let notices = degradation_lines(s);
    if !notices.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "NOTICES");
        for n in notices {
            let _ = writeln!(out, "  {}", n);
        }
    }

    out
}

// --- Markdown ---

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

pub fn render_markdown(ctx: &RenderContext) -> String {
    let s = &ctx.report.summary;
    let mut out = String::new();

    let title = match ctx.kind {
        ReportKind::Detailed => "Work Report",
        ReportKind::Executive => "Executive Work Summary",
    };
    let _ = writeln!(out, "# {}: {}", title, s.assignee);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Period:** {} to {} ({} working days)  ",
        s.window.start, s.window.end, s.window.working_days
    );
    let _ = writeln!(out, "**Generated:** {}", ctx.generated_at);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", ctx.narrative.text);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Key Metrics");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Total estimated time | {:.2}h |", s.totals.hours);
    let _ = writeln!(out, "| Tasks | {} |", s.totals.tasks);
    let _ = writeln!(out, "| Completed | {} ({:.1}%) |", s.totals.completed_tasks, s.totals.completion_rate);
    let _ = writeln!(out, "| Average per working day | {:.2}h |", s.totals.average_hours_per_working_day);
    let _ = writeln!(out, "| Commits | {} ({} linked) |", s.totals.commits, s.totals.linked_commits);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Business Impact");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Category | Tasks | Hours | Share |");
    let _ = writeln!(out, "|---|---:|---:|---:|");
    for c in s.categories.iter().filter(|c| c.tasks > 0) {
        let _ = writeln!(out, "| {} | {} | {:.2} | {:.1}% |", c.label, c.tasks, c.hours, c.percentage);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Repositories");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Repository | Commits | Linked | Tasks | Hours | Share | Status |");
    let _ = writeln!(out, "|---|---:|---:|---:|---:|---:|---|");
    for (name, r) in &s.repositories {
        let status = match &r.degraded {
            Some(reason) => format!("degraded: {}", md_escape(reason)),
            None => "ok".into(),
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {:.2} | {:.1}% | {} |",
            md_escape(name),
            r.commits,
            r.linked_commits,
            r.tasks,
            r.hours,
            r.percentage,
            status
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Weekly Progress");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Week | Starting | Completed | Hours |");
    let _ = writeln!(out, "|---|---|---:|---:|");
    for w in &s.weekly {
        let _ = writeln!(out, "| {} | {} | {} | {:.2} |", w.week, w.week_start, w.completed_tasks, w.hours);
    }
    let _ = writeln!(out);

    if ctx.kind == ReportKind::Detailed {
        let _ = writeln!(out, "## Tasks");
        let _ = writeln!(out);
        for t in &ctx.report.tasks {
            let _ = writeln!(out, "### {}: {}", t.task.id, t.task.summary);
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "- **Priority:** {} | **Category:** {} | **Estimate:** {}",
                t.task.priority.label(),
                t.category.label(),
                estimate_note(t)
            );
            if t.commits.is_empty() {
                let _ = writeln!(out, "- No commits found for this task.");
            } else {
                for c in &t.commits {
                    let _ = writeln!(out, "- `{}`", commit_line(c));
                }
            }
            let _ = writeln!(out);
        }
    }

    let method = methodology_lines(s);
    if !method.is_empty() {
        let _ = writeln!(out, "## Estimation Method");
        let _ = writeln!(out);
        for line in method {
            let _ = writeln!(out, "- {}", line);
        }
        let _ = writeln!(out);
    }

    let notices = degradation_lines(s);
    if !notices.is_empty() {
        let _ = writeln!(out, "## Notices");
        let _ = writeln!(out);
        for n in notices {
            let _ = writeln!(out, "- {}", n);
        }
        let _ = writeln!(out);
    }

    out
}
