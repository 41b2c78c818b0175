//! Class-wide attendance roll-up.
//!
//! The class summary screen reconciles every student of a class separately
//! and lists the results side by side.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::filter::AttendanceFilter;
use crate::reconcile::{AttendanceSummary, reconcile};
use crate::record::AttendanceSessionRecord;
use crate::types::SubjectId;

/// One row of a class summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub subject_id: SubjectId,
    pub summary: AttendanceSummary,
}

/// Per-subject summaries for a mixed batch of records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClassSummary {
    /// Sorted by subject ID.
    pub subjects: Vec<SubjectSummary>,
    /// Mean of the percentages of subjects with at least one working day in
    /// the window, rounded to one decimal. 0 when no subject has one.
    pub average_percentage: f64,
    /// Records without a subject ID, plus any raw records the caller dropped
    /// during ingestion.
    pub skipped: usize,
}

/// Reconciles each subject in `records` and aggregates the results.
///
/// Subjects with no days inside `filter` are still listed with a zero
/// summary but are left out of the average. Records without a subject ID
/// cannot be attributed and are counted in `skipped`.
#[allow(clippy::cast_precision_loss)]
pub fn summarize_class(
    records: &[AttendanceSessionRecord],
    filter: AttendanceFilter,
) -> ClassSummary {
    let mut by_subject: BTreeMap<&SubjectId, Vec<&AttendanceSessionRecord>> = BTreeMap::new();
    let mut unattributed = 0;
    for record in records {
        match &record.subject_id {
            Some(subject_id) => by_subject.entry(subject_id).or_default().push(record),
            None => unattributed += 1,
        }
    }
    if unattributed > 0 {
        tracing::debug!(count = unattributed, "skipping records without a subject");
    }

    let groups: Vec<_> = by_subject.into_iter().collect();
    let subjects: Vec<SubjectSummary> = groups
        .into_par_iter()
        .map(|(subject_id, subject_records)| SubjectSummary {
            subject_id: subject_id.clone(),
            summary: reconcile(subject_records, filter).summary,
        })
        .collect();

    let percentages: Vec<f64> = subjects
        .iter()
        .filter(|s| s.summary.total_working_days > 0)
        .map(|s| s.summary.attendance_percentage)
        .collect();
    let average_percentage = if percentages.is_empty() {
        0.0
    } else {
        let total: f64 = percentages.iter().sum();
        (total / percentages.len() as f64 * 10.0).round() / 10.0
    };

    tracing::debug!(
        subjects = subjects.len(),
        %filter,
        average_percentage,
        "summarized class attendance"
    );

    ClassSummary {
        subjects,
        average_percentage,
        skipped: unattributed,
    }
}
