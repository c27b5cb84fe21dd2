use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

// Date windows for analytics requests and week-stamp filtering.

/// Unparsable week stamps logged per filter before going quiet.
pub const WEEK_WARNING_LIMIT: usize = 3;

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateRange {
  /// Parse inclusive `YYYY-MM-DD` bounds; `start` must not come after `end`.
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    let s = NaiveDate::parse_from_str(start.trim(), DATE_FMT)
      .with_context(|| format!("invalid start date {:?}, expected YYYY-MM-DD", start))?;
    let e = NaiveDate::parse_from_str(end.trim(), DATE_FMT)
      .with_context(|| format!("invalid end date {:?}, expected YYYY-MM-DD", end))?;

    if s > e {
      bail!("start date {} is after end date {}", s, e);
    }

    Ok(Self { start: s, end: e })
  }

  pub fn start_str(&self) -> String {
    self.start.format(DATE_FMT).to_string()
  }

  pub fn end_str(&self) -> String {
    self.end.format(DATE_FMT).to_string()
  }

  pub fn contains(&self, day: NaiveDate) -> bool {
    self.start <= day && day <= self.end
  }

  /// `Some(inside)` for a readable week stamp, `None` when it is missing or unparsable.
  pub fn check_week(&self, week: Option<&str>) -> Option<bool> {
    week
      .map(str::trim)
      .filter(|w| !w.is_empty())
      .and_then(parse_week)
      .map(|day| self.contains(day))
  }
}

/// Parse a week stamp: a calendar date, or an RFC 3339 timestamp whose date part is used.
pub fn parse_week(raw: &str) -> Option<NaiveDate> {
  let t = raw.trim();

  NaiveDate::parse_from_str(t, DATE_FMT)
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(t).ok().map(|dt| dt.date_naive()))
}

/// Per-report filter: keeps records inside the range, and keeps records whose
/// week cannot be read (logging the first few) rather than dropping them.
#[derive(Debug)]
pub struct WeekFilter<'a> {
  range: Option<&'a DateRange>,
  report: &'a str,
  unparsed: usize,
}

impl<'a> WeekFilter<'a> {
  pub fn new(range: Option<&'a DateRange>, report: &'a str) -> Self {
    Self {
      range,
      report,
      unparsed: 0,
    }
  }

  pub fn includes(&mut self, week: Option<&str>) -> bool {
    let Some(range) = self.range else {
      return true;
    };

    match range.check_week(week) {
      Some(inside) => inside,
      None => {
        self.unparsed += 1;

        if self.unparsed <= WEEK_WARNING_LIMIT {
          warn!(
            report = self.report,
            week = week.unwrap_or("<missing>"),
            "unparsable week; keeping record"
          );
        }
        true
      }
    }
  }

  /// Records kept only because their week could not be read.
  pub fn unparsed(&self) -> usize {
    self.unparsed
  }
}
