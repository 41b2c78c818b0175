//! Attendance reconciliation.
//!
//! Turns per-session attendance records for one subject into a per-day
//! timeline and a summary for a year/month window.
//!
//! # Algorithm Summary
//!
//! 1. Group records by calendar date into AM, PM and unlabelled slots
//!    (the last record seen for a slot wins)
//! 2. Resolve each date to a [`PresentCredit`]: dual-session days get
//!    half credit when exactly one session is present, single-session days
//!    are all or nothing
//! 3. Keep dates inside the [`AttendanceFilter`] and total them up

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::filter::AttendanceFilter;
use crate::record::{AttendanceSessionRecord, RawAttendanceRecord, ingest};
use crate::status::{AttendanceStatus, Session};

/// How much of a working day counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PresentCredit {
    Zero,
    Half,
    Full,
}

impl PresentCredit {
    /// Credit in half-day units (0, 1 or 2).
    #[must_use]
    pub const fn half_days(self) -> u32 {
        match self {
            Self::Zero => 0,
            Self::Half => 1,
            Self::Full => 2,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.half_days()) / 2.0
    }

    /// The complementary absent credit.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Zero => Self::Full,
            Self::Half => Self::Half,
            Self::Full => Self::Zero,
        }
    }
}

impl Serialize for PresentCredit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Reconciled attendance for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyStatus {
    pub date: NaiveDate,
    pub present_credit: PresentCredit,
}

impl DailyStatus {
    #[must_use]
    pub const fn absent_credit(&self) -> PresentCredit {
        self.present_credit.complement()
    }
}

impl Serialize for DailyStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DailyStatus", 3)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("present_credit", &self.present_credit)?;
        state.serialize_field("absent_credit", &self.absent_credit())?;
        state.end()
    }
}

/// Totals over a filtered set of days.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AttendanceSummary {
    pub total_present: f64,
    pub total_absent: f64,
    pub total_working_days: usize,
    /// Rounded to one decimal; 0 when there are no working days.
    pub attendance_percentage: f64,
}

impl AttendanceSummary {
    /// Aggregates reconciled days. Every entry counts as one working day.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_days(days: &[DailyStatus]) -> Self {
        let working_days = days.len();
        if working_days == 0 {
            return Self::default();
        }

        let present_half_days: u64 = days
            .iter()
            .map(|d| u64::from(d.present_credit.half_days()))
            .sum();
        let total_half_days = 2 * working_days as u64;

        let total_present = present_half_days as f64 / 2.0;
        let total_absent = (total_half_days - present_half_days) as f64 / 2.0;
        // present / days * 100, scaled by 10 for one-decimal rounding
        let attendance_percentage =
            (present_half_days as f64 * 500.0 / working_days as f64).round() / 10.0;

        Self {
            total_present,
            total_absent,
            total_working_days: working_days,
            attendance_percentage,
        }
    }
}

/// Output of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Reconciliation {
    /// Days inside the filter window, ascending by date.
    pub days: Vec<DailyStatus>,
    pub summary: AttendanceSummary,
    /// Raw records dropped because they had no usable date.
    pub skipped: usize,
}

/// Session slots recorded for one date.
#[derive(Debug, Default)]
struct DaySlots {
    am: Option<AttendanceStatus>,
    pm: Option<AttendanceStatus>,
    single: Option<AttendanceStatus>,
}

impl DaySlots {
    fn record(&mut self, session: Option<Session>, status: AttendanceStatus) {
        let slot = match session {
            Some(Session::Am) => &mut self.am,
            Some(Session::Pm) => &mut self.pm,
            None => &mut self.single,
        };
        *slot = Some(status);
    }

    fn credit(&self) -> PresentCredit {
        if self.am.is_some() || self.pm.is_some() {
            // A labelled day ignores any unlabelled entry.
            let present = [self.am, self.pm]
                .into_iter()
                .flatten()
                .filter(|s| s.is_present())
                .count();
            match present {
                2 => PresentCredit::Full,
                1 => PresentCredit::Half,
                _ => PresentCredit::Zero,
            }
        } else if self.single.is_some_and(AttendanceStatus::is_present) {
            PresentCredit::Full
        } else {
            PresentCredit::Zero
        }
    }
}

/// Reconciles one subject's session records into daily statuses and a
/// summary for `filter`.
///
/// Records are expected to belong to a single subject; the subject ID is not
/// inspected. Records outside the window are ignored. The result does not
/// depend on input order except for duplicate (date, session) pairs, where
/// the later record wins.
pub fn reconcile<'a, I>(records: I, filter: AttendanceFilter) -> Reconciliation
where
    I: IntoIterator<Item = &'a AttendanceSessionRecord>,
{
    let mut by_date: BTreeMap<NaiveDate, DaySlots> = BTreeMap::new();
    for record in records {
        if !filter.contains(record.date) {
            continue;
        }
        by_date
            .entry(record.date)
            .or_default()
            .record(record.session, record.status);
    }

    let days: Vec<DailyStatus> = by_date
        .into_iter()
        .map(|(date, slots)| DailyStatus {
            date,
            present_credit: slots.credit(),
        })
        .collect();
    let summary = AttendanceSummary::from_days(&days);

    Reconciliation {
        days,
        summary,
        skipped: 0,
    }
}

/// Normalizes raw backend records and reconciles them.
pub fn reconcile_raw<'a, I>(raw: I, filter: AttendanceFilter) -> Reconciliation
where
    I: IntoIterator<Item = &'a RawAttendanceRecord>,
{
    let ingested = ingest(raw);
    Reconciliation {
        skipped: ingested.skipped,
        ..reconcile(&ingested.records, filter)
    }
}
