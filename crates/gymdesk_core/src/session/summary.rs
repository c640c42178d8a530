//! Derived attendance tallies and rates.
//!
//! # Invariants
//! - Counts are recomputed from entries on every call; nothing is cached.
//! - A rate over zero subjects is `Unavailable`, never NaN.

use crate::model::attendance::AttendanceStatus;
use crate::session::edit_session::EditSession;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Text shown in place of a rate that cannot be computed.
pub const RATE_PLACEHOLDER: &str = "—";

/// Present-over-total percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceRate {
    /// Whole percent, rounded half-up.
    Percent(u8),
    /// No subjects to divide by.
    Unavailable,
}

impl AttendanceRate {
    /// Computes `present / total` as a rounded-half-up integer percent.
    pub fn from_counts(present: usize, total: usize) -> Self {
        if total == 0 {
            return Self::Unavailable;
        }
        let present = present.min(total) as u64;
        let total = total as u64;
        let percent = (present * 200 + total) / (total * 2);
        Self::Percent(percent as u8)
    }

    pub fn percent(self) -> Option<u8> {
        match self {
            Self::Percent(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

impl Display for AttendanceRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "{value}%"),
            Self::Unavailable => f.write_str(RATE_PLACEHOLDER),
        }
    }
}

/// Number of subjects per status value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCounts<S: AttendanceStatus> {
    counts: BTreeMap<S, usize>,
    total: usize,
}

impl<S: AttendanceStatus> SummaryCounts<S> {
    /// Tallies any sequence of statuses. Every status value gets a slot.
    pub fn tally(statuses: impl IntoIterator<Item = S>) -> Self {
        let mut counts: BTreeMap<S, usize> = S::all().iter().map(|status| (*status, 0)).collect();
        let mut total = 0;
        for status in statuses {
            *counts.entry(status).or_insert(0) += 1;
            total += 1;
        }
        Self { counts, total }
    }

    pub fn count(&self, status: S) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn present(&self) -> usize {
        self.count(S::PRESENT)
    }

    /// Everything that is not the positive status.
    pub fn not_present(&self) -> usize {
        self.total - self.present()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn rate(&self) -> AttendanceRate {
        AttendanceRate::from_counts(self.present(), self.total)
    }

    /// `(status, count)` pairs in status order.
    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        self.counts.iter().map(|(status, count)| (*status, *count))
    }
}

impl<S: AttendanceStatus> EditSession<S> {
    /// Counts entries per status.
    pub fn summary(&self) -> SummaryCounts<S> {
        SummaryCounts::tally(self.iter().map(|(_, entry)| entry.status))
    }

    /// Share of subjects currently marked present.
    pub fn attendance_rate(&self) -> AttendanceRate {
        self.summary().rate()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceRate, RATE_PLACEHOLDER};

    #[test]
    fn rate_rounds_half_up() {
        assert_eq!(AttendanceRate::from_counts(1, 8), AttendanceRate::Percent(13));
        assert_eq!(AttendanceRate::from_counts(1, 3), AttendanceRate::Percent(33));
        assert_eq!(AttendanceRate::from_counts(2, 3), AttendanceRate::Percent(67));
        assert_eq!(AttendanceRate::from_counts(1, 200), AttendanceRate::Percent(1));
        assert_eq!(AttendanceRate::from_counts(5, 5), AttendanceRate::Percent(100));
    }

    #[test]
    fn rate_over_nothing_is_placeholder() {
        let rate = AttendanceRate::from_counts(0, 0);
        assert_eq!(rate, AttendanceRate::Unavailable);
        assert_eq!(rate.to_string(), RATE_PLACEHOLDER);
        assert_eq!(rate.percent(), None);
    }
}
