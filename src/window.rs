use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc, Weekday};
use chrono_english::{parse_duration, Interval};
use once_cell::sync::Lazy;
use regex::Regex;
use two_timer::{parse as parse_natural, Config as NaturalConfig};

use crate::error::ConfigError;
use crate::model::WindowInfo;

// Windowing-related types live here to keep main focused.

/// How the caller selected the report window on the command line.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WindowSpec {
  Dates { start: String, end: String },
  Month { ym: String },
  ForPhrase { phrase: String },
}

/// Inclusive calendar-day window `[start, end]`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ReportWindow {
  start: NaiveDate,
  end: NaiveDate,
}

impl ReportWindow {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
    if end < start {
      return Err(ConfigError::InvertedRange {
        start: start.to_string(),
        end: end.to_string(),
      });
    }
    Ok(Self { start, end })
  }

  pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
    Self::new(parse_date(start)?, parse_date(end)?)
  }

  pub fn start(&self) -> NaiveDate {
    self.start
  }

  pub fn end(&self) -> NaiveDate {
    self.end
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date >= self.start && date <= self.end
  }

  pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
    let end = self.end;
    self.start.iter_days().take_while(move |d| *d <= end)
  }

  pub fn calendar_days(&self) -> u32 {
    ((self.end - self.start).num_days() + 1) as u32
  }

  /// Weekdays (Mon-Fri) inside the window.
  pub fn working_days(&self) -> u32 {
    self.days().filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)).count() as u32
  }

  /// Monday of every ISO week the window touches, chronological.
  pub fn week_starts(&self) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut cursor = week_start(self.start);
    while cursor <= self.end {
      out.push(cursor);
      cursor += Duration::days(7);
    }
    out
  }

  pub fn info(&self) -> WindowInfo {
    WindowInfo {
      start: self.start,
      end: self.end,
      calendar_days: self.calendar_days(),
      working_days: self.working_days(),
    }
  }

  /// Lower bound for `git log --since`, widened by a day so zone offsets never drop commits.
  /// git compares committer dates, which are never earlier than author dates, so there is no
  /// upper bound; callers re-filter on the commit's local author date.
  pub fn git_since(&self) -> String {
    format!("{}T00:00:00", self.start.pred_opt().unwrap_or(self.start))
  }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ConfigError> {
  NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate(s.to_string()))
}

/// Monday of the ISO week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
  d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

pub fn week_label(d: NaiveDate) -> String {
  let iso = d.iso_week();
  format!("{}-W{:02}", iso.year(), iso.week())
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
  let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
  NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

pub fn month_bounds(year_month: &str) -> Result<ReportWindow, ConfigError> {
  let invalid = || ConfigError::InvalidMonth(year_month.to_string());
  let (y, m) = year_month.trim().split_once('-').ok_or_else(invalid)?;
  let y: i32 = y.parse().map_err(|_| invalid())?;
  let m: u32 = m.parse().map_err(|_| invalid())?;

  let first = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(invalid)?;
  let last = last_day_of_month(y, m).ok_or_else(invalid)?;
  ReportWindow::new(first, last)
}

fn subtract_months(d: NaiveDate, n: i32) -> Option<NaiveDate> {
  let total = d.year().checked_mul(12)?.checked_add(d.month() as i32 - 1)?.checked_sub(n)?;
  let y = total.div_euclid(12);
  let m = (total.rem_euclid(12) + 1) as u32;
  let day = d.day().min(last_day_of_month(y, m)?.day());
  NaiveDate::from_ymd_opt(y, m, day)
}

fn days_before(d: NaiveDate, days: i64) -> Option<NaiveDate> {
  d.checked_sub_signed(Duration::try_days(days)?)
}

static RE_LAST_N: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(?:last|past)\s+(\d+)\s+(day|week|month)s?$").expect("static regex"));

/// Resolve a natural-language phrase into an inclusive window ending no later than `today`.
fn for_phrase_bounds(input: &str, today: NaiveDate) -> Result<ReportWindow, ConfigError> {
  let phrase = input.trim().to_lowercase();
  let unresolved = || ConfigError::UnresolvedPhrase(input.to_string());

  match phrase.as_str() {
    "today" => return ReportWindow::new(today, today),
    "yesterday" => {
      let y = today.pred_opt().ok_or_else(unresolved)?;
      return ReportWindow::new(y, y);
    }
    "this week" => return ReportWindow::new(week_start(today), today),
    "last week" => {
      let this_monday = week_start(today);
      return ReportWindow::new(this_monday - Duration::days(7), this_monday - Duration::days(1));
    }
    "this month" => {
      let first = today.with_day(1).ok_or_else(unresolved)?;
      return ReportWindow::new(first, today);
    }
    "last month" => {
      let first_this = today.with_day(1).ok_or_else(unresolved)?;
      let last_prev = first_this.pred_opt().ok_or_else(unresolved)?;
      let first_prev = last_prev.with_day(1).ok_or_else(unresolved)?;
      return ReportWindow::new(first_prev, last_prev);
    }
    _ => {}
  }

  // "last 3 weeks": the N units ending today, inclusive of today
  if let Some(caps) = RE_LAST_N.captures(&phrase) {
    let n: i64 = caps[1].parse().map_err(|_| unresolved())?;
    if n == 0 {
      return Err(unresolved());
    }
    let start = match &caps[2] {
      "day" => days_before(today, n - 1),
      "week" => n.checked_mul(7).and_then(|days| days_before(today, days - 1)),
      _ => i32::try_from(n).ok().and_then(|m| subtract_months(today, m)).and_then(|d| d.succ_opt()),
    }
    .ok_or_else(unresolved)?;
    return ReportWindow::new(start, today);
  }

  // Durations ("2 weeks ago", "10 days") always look backwards from today.
  if let Ok(interval) = parse_duration(&phrase) {
    let start = match interval {
      Interval::Seconds(secs) => days_before(today, i64::from(secs.unsigned_abs() / 86_400)),
      Interval::Days(days) => days_before(today, i64::from(days.unsigned_abs())),
      Interval::Months(months) => i32::try_from(months.unsigned_abs()).ok().and_then(|m| subtract_months(today, m)),
    }
    .ok_or_else(unresolved)?;
    return ReportWindow::new(start, today);
  }

  // Natural ranges via two_timer ("last year", "june 2025", ...); its end bound is exclusive.
  let anchor = today.and_hms_opt(12, 0, 0).ok_or_else(unresolved)?;
  if let Ok((start, end, _)) = parse_natural(&phrase, Some(NaturalConfig::new().now(anchor))) {
    let start_day = start.date();
    let end_day = (end - Duration::seconds(1)).date().min(today);
    return ReportWindow::new(start_day, end_day);
  }

  Err(unresolved())
}

pub fn resolve_window(spec: &WindowSpec, today: NaiveDate) -> Result<ReportWindow, ConfigError> {
  match spec {
    WindowSpec::Dates { start, end } => ReportWindow::parse(start, end),
    WindowSpec::Month { ym } => month_bounds(ym),
    WindowSpec::ForPhrase { phrase } => for_phrase_bounds(phrase, today),
  }
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive local timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}

/// Zone used to turn commit instants into calendar days.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ReportTz {
  Local,
  Utc,
  Named(chrono_tz::Tz),
}

impl ReportTz {
  pub fn parse(s: &str) -> Result<Self, ConfigError> {
    if s.eq_ignore_ascii_case("local") {
      return Ok(ReportTz::Local);
    }
    if s.eq_ignore_ascii_case("utc") {
      return Ok(ReportTz::Utc);
    }
    s.parse::<chrono_tz::Tz>()
      .map(ReportTz::Named)
      .map_err(|_| ConfigError::UnknownTimeZone(s.to_string()))
  }

  pub fn label(&self) -> String {
    match self {
      ReportTz::Local => "local".into(),
      ReportTz::Utc => "utc".into(),
      ReportTz::Named(tz) => tz.name().to_string(),
    }
  }

  /// Calendar day and RFC3339 rendering of a unix timestamp in this zone.
  pub fn localize(&self, epoch: i64) -> Option<(NaiveDate, String)> {
    let utc = Utc.timestamp_opt(epoch, 0).single()?;
    let out = match self {
      ReportTz::Local => {
        let dt = utc.with_timezone(&Local);
        (dt.date_naive(), dt.to_rfc3339_opts(SecondsFormat::Secs, true))
      }
      ReportTz::Utc => (utc.date_naive(), utc.to_rfc3339_opts(SecondsFormat::Secs, true)),
      ReportTz::Named(tz) => {
        let dt = utc.with_timezone(tz);
        (dt.date_naive(), dt.to_rfc3339_opts(SecondsFormat::Secs, true))
      }
    };
    Some(out)
  }
}
