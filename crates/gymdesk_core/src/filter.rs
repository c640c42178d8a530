//! Client-side list filters used around attendance screens.
//!
//! # Responsibility
//! - Case-insensitive roster search.
//! - Trainee attendance history bucketing by calendar month.
//!
//! # Invariants
//! - Filters never reorder their input.
//! - An empty query matches everything.

use crate::model::attendance::ClassStatus;
use crate::model::person::Subject;
use crate::session::summary::SummaryCounts;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Subjects whose name, code or category contains `query`, ignoring case.
pub fn search_subjects<'a>(subjects: &'a [Subject], query: &str) -> Vec<&'a Subject> {
    let needle = query.trim().to_lowercase();
    subjects
        .iter()
        .filter(|subject| {
            needle.is_empty()
                || [&subject.name, &subject.code, &subject.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str()))
        })
        .collect()
}

/// Calendar month bucket, rendered `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year = year.parse().ok()?;
        let month = month.parse().ok()?;
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One past class in a trainee's attendance history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub class_id: String,
    pub class_name: String,
    pub date: NaiveDate,
    pub status: ClassStatus,
}

/// Trainee history filter: class-name search plus optional month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub query: String,
    /// `None` means all months.
    pub month: Option<YearMonth>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let needle = self.query.trim().to_lowercase();
        let matches_query = entry.class_name.to_lowercase().contains(needle.as_str());
        let matches_month = self
            .month
            .map_or(true, |month| YearMonth::of(entry.date) == month);
        matches_query && matches_month
    }

    pub fn apply<'a>(&self, entries: &'a [HistoryEntry]) -> Vec<&'a HistoryEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}

/// Months present in `entries`, in first-seen order.
pub fn distinct_months(entries: &[HistoryEntry]) -> Vec<YearMonth> {
    let mut months: Vec<YearMonth> = Vec::new();
    for entry in entries {
        let month = YearMonth::of(entry.date);
        if !months.contains(&month) {
            months.push(month);
        }
    }
    months
}

/// Present/absent tally over a history slice.
pub fn history_summary<'a>(
    entries: impl IntoIterator<Item = &'a HistoryEntry>,
) -> SummaryCounts<ClassStatus> {
    SummaryCounts::tally(entries.into_iter().map(|entry| entry.status))
}
