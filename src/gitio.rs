use anyhow::Result;
use tracing::debug;

use crate::util::run_git;

const RECORD_SEP: char = '\u{1e}';
const FIELD_SEP: char = '\u{1f}';

/// One `git log` record before time-zone localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit { pub sha: String, pub author_name: String, pub author_email: String, pub at: i64, pub message: String }

pub struct LogQuery<'a> {
    pub author: &'a str,
    pub since: &'a str,
    pub include_merges: bool,
    pub all_refs: bool,
}

pub fn is_work_tree(repo: &str) -> Result<bool> {
    let out = run_git(repo, &["rev-parse".into(), "--is-inside-work-tree".into()])?;
    Ok(out.trim() == "true")
}

/// False for freshly initialised repositories whose HEAD is unborn.
pub fn has_head(repo: &str) -> bool {
    run_git(repo, &["rev-parse".into(), "--verify".into(), "-q".into(), "HEAD".into()]).is_ok()
}

pub fn log_args(q: &LogQuery) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-c".into(), "log.showSignature=false".into(),
        "log".into(),
        "--fixed-strings".into(),
        format!("--author={}", q.author),
        format!("--since={}", q.since),
        "--date-order".into(),
        "--reverse".into(),
        "--format=%x1e%H%x1f%an%x1f%ae%x1f%at%x1f%B".into(),
    ];
    if !q.include_merges { args.push("--no-merges".into()); }
    args.push(if q.all_refs { "--all".into() } else { "HEAD".into() });
    args
}

pub fn parse_log(out: &str) -> Vec<RawCommit> {
    out.split(RECORD_SEP)
        .filter(|r| !r.trim().is_empty())
        .filter_map(|record| {
            let parts: Vec<&str> = record.splitn(5, FIELD_SEP).collect();
            if parts.len() != 5 { return None; }
            let sha = parts[0].trim().to_string();
            if sha.is_empty() { return None; }
            let at = match parts[3].trim().parse::<i64>() {
                Ok(at) => at,
                Err(_) => {
                    debug!(%sha, raw = parts[3], "skipping commit with unparseable author time");
                    return None;
                }
            };
            Some(RawCommit {
                sha,
                author_name: parts[1].to_string(),
                author_email: parts[2].to_string(),
                at,
                message: parts[4].trim_end().to_string(),
            })
        })
        .collect()
}

pub fn log_commits(repo: &str, q: &LogQuery) -> Result<Vec<RawCommit>> {
    let out = run_git(repo, &log_args(q))?;
    Ok(parse_log(&out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_splits_records_and_keeps_multiline_bodies() {
        let raw = format!(
            "{r}aaa{f}Dev{f}dev@ex.com{f}1755000000{f}ABC-1 first\n\nbody line\n\n{r}bbb{f}Dev{f}dev@ex.com{f}1755003600{f}second\n",
            r = RECORD_SEP,
            f = FIELD_SEP
        );
        let got = parse_log(&raw);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].sha, "aaa");
        assert_eq!(got[0].message, "ABC-1 first\n\nbody line");
        assert_eq!(got[1].at, 1_755_003_600);
    }

    #[test]
    fn parse_log_skips_truncated_records() {
        let raw = format!("{r}ccc{f}only-two", r = RECORD_SEP, f = FIELD_SEP);
        assert!(parse_log(&raw).is_empty());
    }

    #[test]
    fn log_args_toggle_merges_and_refs() {
        let q = LogQuery { author: "dev@ex.com", since: "s", include_merges: false, all_refs: true };
        let args = log_args(&q);
        assert!(args.contains(&"--no-merges".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--all"));
        assert!(args.contains(&"--author=dev@ex.com".to_string()));
        // committer dates may run past the window after a rebase; only the lower bound is pushed to git
        assert!(!args.iter().any(|a| a.starts_with("--until")));
    }

    #[test]
    fn parse_log_skips_records_with_bad_author_time() {
        let raw = format!(
            "{r}aaa{f}Dev{f}dev@ex.com{f}not-a-time{f}broken\n{r}bbb{f}Dev{f}dev@ex.com{f}1755003600{f}fine\n",
            r = RECORD_SEP,
            f = FIELD_SEP
        );
        let got = parse_log(&raw);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].sha, "bbb");
    }
}
