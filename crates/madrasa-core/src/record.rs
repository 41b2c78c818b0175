//! Attendance session records and their ingestion from backend exports.
//!
//! The backend hands out loosely typed rows: status strings in any case,
//! optional session labels, dates as plain days or full timestamps. These
//! are normalized here, once, into [`AttendanceSessionRecord`] so the
//! reconciler only ever sees typed values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::status::{AttendanceStatus, Session};
use crate::types::SubjectId;

/// One observation of one subject's presence in one session of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSessionRecord {
    /// `None` when the export was already scoped to one subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    pub date: NaiveDate,
    /// `None` for screens that record a single status per day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl AttendanceSessionRecord {
    pub const fn new(
        subject_id: SubjectId,
        date: NaiveDate,
        session: Option<Session>,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            subject_id: Some(subject_id),
            date,
            session,
            status,
            remarks: None,
        }
    }
}

/// A record as exported by the attendance endpoints, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendanceRecord {
    #[serde(
        default,
        alias = "subjectId",
        alias = "student_id",
        alias = "teacher_id",
        deserialize_with = "deserialize_raw_id"
    )]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Backend IDs arrive as strings or as numeric primary keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

fn deserialize_raw_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|id| match id {
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}

/// Why a raw record could not be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingDate,
    InvalidDate,
}

impl RawAttendanceRecord {
    /// Converts into a typed record.
    ///
    /// Unknown session labels fall back to an unlabelled session and unknown
    /// status strings to absent. A blank or missing subject ID is kept as
    /// `None`; only an unusable date rejects the record.
    pub fn normalize(&self) -> Result<AttendanceSessionRecord, SkipReason> {
        let raw_date = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(SkipReason::MissingDate)?;
        let date = parse_record_date(raw_date).ok_or(SkipReason::InvalidDate)?;

        let subject_id = self
            .subject_id
            .as_deref()
            .and_then(|id| SubjectId::new(id.trim()).ok());

        let session = self
            .session
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match s.parse::<Session>() {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::debug!(error = %err, %date, "treating record as single-session");
                    None
                }
            });

        let status = self
            .status
            .as_deref()
            .map_or(AttendanceStatus::Absent, AttendanceStatus::parse_lenient);

        Ok(AttendanceSessionRecord {
            subject_id,
            date,
            session,
            status,
            remarks: self.remarks.clone(),
        })
    }
}

/// Parses a record date given either as `YYYY-MM-DD` or as a timestamp.
///
/// Timestamps keep the calendar date they were written in, not UTC.
pub fn parse_record_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Result of normalizing a batch of raw records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingested {
    pub records: Vec<AttendanceSessionRecord>,
    /// Number of raw records dropped because they could not be grouped.
    pub skipped: usize,
}

/// Normalizes raw records, dropping the ones without a usable date.
pub fn ingest<'a, I>(raw: I) -> Ingested
where
    I: IntoIterator<Item = &'a RawAttendanceRecord>,
{
    let mut ingested = Ingested::default();
    for (idx, record) in raw.into_iter().enumerate() {
        match record.normalize() {
            Ok(typed) => ingested.records.push(typed),
            Err(reason) => {
                tracing::debug!(index = idx, ?reason, date = ?record.date, "skipping attendance record");
                ingested.skipped += 1;
            }
        }
    }
    ingested
}
