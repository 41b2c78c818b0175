//! Reading exported attendance records and resolving the report window.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use madrasa_core::{AttendanceFilter, RawAttendanceRecord};

use crate::Config;
use crate::cli::WindowArgs;

/// Reads raw records from `path`, or from stdin when the path is absent or `-`.
pub fn read_records(path: Option<&Path>) -> Result<Vec<RawAttendanceRecord>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let records = parse_records(BufReader::new(file))
                .with_context(|| format!("failed to read records from {}", path.display()))?;
            tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
            Ok(records)
        }
        _ => {
            let stdin = io::stdin();
            let records = parse_records(stdin.lock()).context("failed to read records from stdin")?;
            tracing::debug!(count = records.len(), "loaded records from stdin");
            Ok(records)
        }
    }
}

/// Parses either a JSON array of records or one JSON record per line.
pub fn parse_records<R: Read>(mut reader: R) -> Result<Vec<RawAttendanceRecord>> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("failed to read input")?;

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content).context("invalid JSON array");
    }

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: RawAttendanceRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Resolves the year/month window from flags, then config, then today.
pub fn resolve_filter(window: &WindowArgs, config: &Config) -> Result<AttendanceFilter> {
    let year = window
        .year
        .or(config.default_year)
        .unwrap_or_else(|| Local::now().year());
    let month = window.month.unwrap_or(config.default_month);
    Ok(AttendanceFilter::new(year, month)?)
}

/// Resolves and reads the records file for a report command.
pub fn load_for(window: &WindowArgs, config: &Config) -> Result<Vec<RawAttendanceRecord>> {
    let path = window.input.as_deref().or(config.records_path.as_deref());
    read_records(path)
}
