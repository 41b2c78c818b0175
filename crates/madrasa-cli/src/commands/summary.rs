//! Summary command for one student's or teacher's attendance.
//!
//! This module implements `madrasa summary` with an optional per-day
//! timeline and two output formats (human-readable, JSON).

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use madrasa_core::{
    AttendanceFilter, AttendanceSummary, DailyStatus, MonthFilter, PresentCredit,
    RawAttendanceRecord, Reconciliation, SubjectId, ingest, reconcile,
};
use serde::Serialize;

use crate::Config;
use crate::cli::WindowArgs;
use crate::commands::input;

/// Computed summary for one subject.
#[derive(Debug)]
pub struct SummaryReport {
    /// `None` when the input held no usable records at all.
    pub subject_id: Option<SubjectId>,
    pub filter: AttendanceFilter,
    pub reconciliation: Reconciliation,
}

// ========== Report Generation ==========

/// Reconciles raw records for a single subject.
///
/// With `subject` set, other subjects' records are dropped and records
/// without a subject ID are counted as skipped. Without it the input must
/// not name more than one subject; records without an ID are kept.
pub fn build_report(
    raw: &[RawAttendanceRecord],
    subject: Option<&str>,
    filter: AttendanceFilter,
) -> Result<SummaryReport> {
    let mut ingested = ingest(raw);

    let subject_id = if let Some(subject) = subject {
        let subject_id = SubjectId::new(subject)?;
        ingested.skipped += ingested
            .records
            .iter()
            .filter(|r| r.subject_id.is_none())
            .count();
        ingested
            .records
            .retain(|r| r.subject_id.as_ref() == Some(&subject_id));
        Some(subject_id)
    } else {
        let subjects: BTreeSet<&SubjectId> = ingested
            .records
            .iter()
            .filter_map(|r| r.subject_id.as_ref())
            .collect();
        if subjects.len() > 1 {
            bail!(
                "input holds records for {} subjects; pass --subject to pick one",
                subjects.len()
            );
        }
        subjects.into_iter().next().cloned()
    };

    let reconciliation = Reconciliation {
        skipped: ingested.skipped,
        ..reconcile(&ingested.records, filter)
    };
    tracing::debug!(
        subject = ?subject_id,
        %filter,
        days = reconciliation.days.len(),
        skipped = reconciliation.skipped,
        "reconciled attendance"
    );

    Ok(SummaryReport {
        subject_id,
        filter,
        reconciliation,
    })
}

// ========== Text Output ==========

const fn day_label(credit: PresentCredit) -> &'static str {
    match credit {
        PresentCredit::Full => "present",
        PresentCredit::Half => "half day",
        PresentCredit::Zero => "absent",
    }
}

/// Formats the human-readable summary.
pub fn format_report(report: &SummaryReport, show_days: bool) -> String {
    let mut output = String::new();
    let subject = report
        .subject_id
        .as_ref()
        .map_or("(no subject)", SubjectId::as_str);
    let summary = &report.reconciliation.summary;

    writeln!(output, "ATTENDANCE: {subject} ({})", report.filter).unwrap();
    writeln!(output).unwrap();

    if summary.total_working_days == 0 {
        writeln!(output, "No attendance recorded for {}.", report.filter).unwrap();
    } else {
        writeln!(output, "Working days:  {}", summary.total_working_days).unwrap();
        writeln!(output, "Present:       {:.1}", summary.total_present).unwrap();
        writeln!(output, "Absent:        {:.1}", summary.total_absent).unwrap();
        writeln!(
            output,
            "Attendance:    {:.1}%",
            summary.attendance_percentage
        )
        .unwrap();

        if show_days {
            writeln!(output).unwrap();
            writeln!(output, "DAYS").unwrap();
            writeln!(output, "────").unwrap();
            for day in &report.reconciliation.days {
                writeln!(
                    output,
                    "{}  {:<8}  {:.1}",
                    day.date,
                    day_label(day.present_credit),
                    day.present_credit.as_f64()
                )
                .unwrap();
            }
        }
    }

    if report.reconciliation.skipped > 0 {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Skipped {} record(s) without a usable date or subject.",
            report.reconciliation.skipped
        )
        .unwrap();
    }

    output
}

// ========== JSON Output ==========

/// JSON summary structure.
#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    subject_id: Option<&'a SubjectId>,
    year: i32,
    month: MonthFilter,
    days: &'a [DailyStatus],
    summary: &'a AttendanceSummary,
    skipped: usize,
}

/// Formats the summary as JSON.
pub fn format_report_json(report: &SummaryReport) -> Result<String> {
    let json = JsonSummary {
        subject_id: report.subject_id.as_ref(),
        year: report.filter.year,
        month: report.filter.month,
        days: &report.reconciliation.days,
        summary: &report.reconciliation.summary,
        skipped: report.reconciliation.skipped,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

// ========== Public Interface ==========

/// Runs the summary command.
pub fn run<W: Write>(
    writer: &mut W,
    window: &WindowArgs,
    subject: Option<&str>,
    show_days: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let filter = input::resolve_filter(window, config)?;
    let raw = input::load_for(window, config)?;
    let report = build_report(&raw, subject, filter)?;

    if json {
        writeln!(writer, "{}", format_report_json(&report)?)?;
    } else {
        write!(writer, "{}", format_report(&report, show_days))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn raw(subject: &str, date: &str, session: Option<&str>, status: &str) -> RawAttendanceRecord {
        RawAttendanceRecord {
            subject_id: Some(subject.to_string()),
            date: Some(date.to_string()),
            session: session.map(str::to_string),
            status: Some(status.to_string()),
            remarks: None,
        }
    }

    fn march_records() -> Vec<RawAttendanceRecord> {
        vec![
            raw("stu-1", "2024-03-04", Some("AM"), "present"),
            raw("stu-1", "2024-03-04", Some("PM"), "present"),
            raw("stu-1", "2024-03-05", Some("AM"), "Present"),
            raw("stu-1", "2024-03-05", Some("PM"), "absent"),
            raw("stu-1", "2024-03-06", Some("AM"), "absent"),
            raw("stu-1", "2024-03-06", Some("PM"), "ABSENT"),
            raw("stu-1", "2024-03-07", Some("AM"), "PRESENT"),
            raw("stu-1", "2024-03-07", Some("PM"), "present"),
            raw("stu-1", "2023-03-07", Some("AM"), "present"),
        ]
    }

    fn march_2024() -> AttendanceFilter {
        AttendanceFilter::new(2024, MonthFilter::Month(3)).unwrap()
    }

    #[test]
    fn test_build_report_single_subject() {
        let report = build_report(&march_records(), None, march_2024()).unwrap();
        assert_eq!(report.subject_id.unwrap().as_str(), "stu-1");
        assert_eq!(report.reconciliation.summary.total_working_days, 4);
        assert_eq!(report.reconciliation.days.len(), 4);
    }

    #[test]
    fn test_build_report_rejects_mixed_subjects() {
        let mut records = march_records();
        records.push(raw("stu-2", "2024-03-04", Some("AM"), "present"));
        let err = build_report(&records, None, march_2024()).unwrap_err();
        assert!(err.to_string().contains("2 subjects"));
    }

    #[test]
    fn test_build_report_filters_by_subject() {
        let mut records = march_records();
        records.push(raw("stu-2", "2024-03-08", Some("AM"), "present"));
        let report = build_report(&records, Some("stu-2"), march_2024()).unwrap();
        assert_eq!(report.reconciliation.summary.total_working_days, 1);
        assert_eq!(report.reconciliation.days[0].present_credit, PresentCredit::Half);
    }

    #[test]
    fn test_build_report_keeps_records_without_subject() {
        let mut records = march_records();
        for record in &mut records {
            record.subject_id = None;
        }
        let report = build_report(&records, None, march_2024()).unwrap();
        assert_eq!(report.subject_id, None);
        assert_eq!(report.reconciliation.summary.total_working_days, 4);
        assert_eq!(report.reconciliation.skipped, 0);

        let report = build_report(&records, Some("stu-1"), march_2024()).unwrap();
        assert_eq!(report.reconciliation.summary.total_working_days, 0);
        assert_eq!(report.reconciliation.skipped, records.len());
    }

    #[test]
    fn test_build_report_rejects_empty_subject() {
        assert!(build_report(&march_records(), Some(""), march_2024()).is_err());
    }

    #[test]
    fn summary_text_with_days() {
        let report = build_report(&march_records(), None, march_2024()).unwrap();
        assert_snapshot!(format_report(&report, true));
    }

    #[test]
    fn summary_text_empty_window() {
        let filter = AttendanceFilter::new(2024, MonthFilter::Month(6)).unwrap();
        let report = build_report(&march_records(), None, filter).unwrap();
        assert_snapshot!(format_report(&report, false));
    }

    #[test]
    fn summary_text_reports_skipped() {
        let mut records = march_records();
        records.push(RawAttendanceRecord {
            subject_id: Some("stu-1".to_string()),
            date: None,
            session: Some("AM".to_string()),
            status: Some("present".to_string()),
            remarks: None,
        });
        let report = build_report(&records, None, AttendanceFilter::year(2023)).unwrap();
        assert_snapshot!(format_report(&report, false));
    }

    #[test]
    fn summary_json_output() {
        let records = vec![
            raw("t-9", "2024-03-05", Some("AM"), "present"),
            raw("t-9", "2024-03-05", Some("PM"), "absent"),
            raw("t-9", "2024-03-04", None, "present"),
        ];
        let report = build_report(&records, None, march_2024()).unwrap();
        assert_snapshot!(format_report_json(&report).unwrap());
    }
}
