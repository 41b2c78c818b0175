//! Class command: attendance for every subject in the input, side by side.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use madrasa_core::{
    AttendanceFilter, ClassSummary, MonthFilter, RawAttendanceRecord, SubjectSummary, ingest,
    summarize_class,
};
use serde::Serialize;

use crate::Config;
use crate::cli::WindowArgs;
use crate::commands::input;

/// Reconciles every subject found in `raw`.
pub fn build_class_summary(raw: &[RawAttendanceRecord], filter: AttendanceFilter) -> ClassSummary {
    let ingested = ingest(raw);
    let mut summary = summarize_class(&ingested.records, filter);
    summary.skipped += ingested.skipped;
    summary
}

/// Formats the class table.
pub fn format_class(summary: &ClassSummary, filter: AttendanceFilter) -> String {
    let mut output = String::new();
    writeln!(output, "CLASS ATTENDANCE ({filter})").unwrap();
    writeln!(output).unwrap();

    if summary.subjects.is_empty() {
        writeln!(output, "No attendance records found.").unwrap();
    } else {
        writeln!(
            output,
            "{:<14}{:>6}{:>9}{:>8}{:>8}",
            "SUBJECT", "DAYS", "PRESENT", "ABSENT", "%"
        )
        .unwrap();
        for SubjectSummary {
            subject_id,
            summary: s,
        } in &summary.subjects
        {
            writeln!(
                output,
                "{:<14}{:>6}{:>9.1}{:>8.1}{:>8.1}",
                subject_id.as_str(),
                s.total_working_days,
                s.total_present,
                s.total_absent,
                s.attendance_percentage
            )
            .unwrap();
        }
        writeln!(output).unwrap();
        writeln!(output, "Class average: {:.1}%", summary.average_percentage).unwrap();
    }

    if summary.skipped > 0 {
        writeln!(output).unwrap();
        writeln!(
            output,
            "Skipped {} record(s) without a usable date or subject.",
            summary.skipped
        )
        .unwrap();
    }

    output
}

#[derive(Debug, Serialize)]
struct JsonClass<'a> {
    year: i32,
    month: MonthFilter,
    #[serde(flatten)]
    summary: &'a ClassSummary,
}

/// Formats the class summary as JSON.
pub fn format_class_json(summary: &ClassSummary, filter: AttendanceFilter) -> Result<String> {
    let json = JsonClass {
        year: filter.year,
        month: filter.month,
        summary,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Runs the class command.
pub fn run<W: Write>(writer: &mut W, window: &WindowArgs, json: bool, config: &Config) -> Result<()> {
    let filter = input::resolve_filter(window, config)?;
    let raw = input::load_for(window, config)?;
    let summary = build_class_summary(&raw, filter);

    if json {
        writeln!(writer, "{}", format_class_json(&summary, filter)?)?;
    } else {
        write!(writer, "{}", format_class(&summary, filter))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn raw(subject: &str, date: &str, session: &str, status: &str) -> RawAttendanceRecord {
        RawAttendanceRecord {
            subject_id: Some(subject.to_string()),
            date: Some(date.to_string()),
            session: Some(session.to_string()),
            status: Some(status.to_string()),
            remarks: None,
        }
    }

    fn class_records() -> Vec<RawAttendanceRecord> {
        vec![
            raw("stu-b", "2024-02-01", "AM", "present"),
            raw("stu-b", "2024-02-01", "PM", "absent"),
            raw("stu-a", "2024-02-01", "AM", "present"),
            raw("stu-a", "2024-02-01", "PM", "present"),
            raw("stu-a", "2024-02-02", "AM", "absent"),
            raw("stu-a", "2024-02-02", "PM", "absent"),
            raw("stu-c", "2023-11-20", "AM", "present"),
            raw("stu-c", "2023-11-20", "PM", "present"),
        ]
    }

    #[test]
    fn class_text_table() {
        let summary = build_class_summary(&class_records(), AttendanceFilter::year(2024));
        assert_snapshot!(format_class(&summary, AttendanceFilter::year(2024)));
    }

    #[test]
    fn test_empty_class_text() {
        let summary = build_class_summary(&[], AttendanceFilter::year(2024));
        let output = format_class(&summary, AttendanceFilter::year(2024));
        assert!(output.contains("No attendance records found."));
        assert!(!output.contains("Class average"));
    }

    #[test]
    fn test_class_counts_skipped_records() {
        let mut records = class_records();
        records.push(RawAttendanceRecord {
            subject_id: None,
            date: Some("2024-02-01".to_string()),
            ..RawAttendanceRecord::default()
        });
        records.push(RawAttendanceRecord {
            subject_id: Some("stu-a".to_string()),
            date: None,
            ..RawAttendanceRecord::default()
        });
        let summary = build_class_summary(&records, AttendanceFilter::year(2024));
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.subjects.len(), 3);
    }

    #[test]
    fn test_class_json_flattens_summary() {
        let filter = AttendanceFilter::new(2024, MonthFilter::Month(2)).unwrap();
        let summary = build_class_summary(&class_records(), filter);
        let json: serde_json::Value =
            serde_json::from_str(&format_class_json(&summary, filter).unwrap()).unwrap();

        assert_eq!(json["year"], 2024);
        assert_eq!(json["month"], 2);
        assert_eq!(json["subjects"][0]["subject_id"], "stu-a");
        assert_eq!(json["subjects"][0]["summary"]["total_working_days"], 2);
        assert_eq!(json["subjects"][1]["summary"]["total_present"], 0.5);
        assert_eq!(json["average_percentage"], 50.0);
        assert_eq!(json["skipped"], 0);
    }
}
