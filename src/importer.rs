// src/importer.rs
//! Reads a weekly schedule from delimited text.
//!
//! The header row names the columns: `Week` plus the seven day labels in any
//! order. Quoting is not supported, so a cell containing the delimiter changes
//! the row's column count and that row is skipped.
use std::collections::BTreeMap;
use std::io;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::dates::{DayColumn, DAY_COLUMNS};
use crate::error::ImportError;
use crate::plan::ScheduleRow;

pub const WEEK_COLUMN: &str = "Week";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Week,
    Day(DayColumn),
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleImport {
    pub rows: Vec<ScheduleRow>,
    /// 1-based line numbers of rows that were skipped.
    pub skipped_lines: Vec<u64>,
}

/// Parses a schedule, returning an empty vector instead of an error.
pub fn parse_schedule(text: &str) -> Vec<ScheduleRow> {
    match read_schedule(text) {
        Ok(import) => import.rows,
        Err(e) => {
            log::debug!("Schedule parse produced no rows: {e}");
            Vec::new()
        }
    }
}

/// Parses a schedule and classifies why it failed, if it did.
/// # Errors
/// - `ImportError::EmptyFile` if there are no non-blank lines.
/// - `ImportError::HeaderOnly` if only the header is present.
/// - `ImportError::InvalidHeader` if the header is not `Week` + the seven day labels.
/// - `ImportError::NoValidRows` if every data row was skipped.
pub fn read_schedule(text: &str) -> Result<ScheduleImport, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader
        .records()
        .filter_map(|result| match result {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Unreadable schedule line skipped: {e}");
                None
            }
        })
        .filter(|record| record.iter().any(|cell| !cell.is_empty()));

    let header = records.next().ok_or(ImportError::EmptyFile)?;
    let columns = parse_header(&header)?;

    let mut rows = Vec::new();
    let mut skipped_lines = Vec::new();
    let mut saw_data = false;
    for record in records {
        saw_data = true;
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() != columns.len() {
            log::warn!(
                "Skipping schedule line {line}: expected {} columns, found {}",
                columns.len(),
                record.len()
            );
            skipped_lines.push(line);
            continue;
        }
        rows.push(build_row(&columns, &record));
    }

    if !saw_data {
        return Err(ImportError::HeaderOnly);
    }
    if rows.is_empty() {
        return Err(ImportError::NoValidRows);
    }
    Ok(ScheduleImport {
        rows,
        skipped_lines,
    })
}

fn parse_header(header: &StringRecord) -> Result<Vec<Column>, ImportError> {
    let mut columns = Vec::with_capacity(header.len());
    for name in header {
        let column = if name == WEEK_COLUMN {
            Column::Week
        } else {
            DayColumn::from_str(name)
                .map(Column::Day)
                .map_err(|_| ImportError::InvalidHeader(format!("unknown column '{name}'")))?
        };
        if columns.contains(&column) {
            return Err(ImportError::InvalidHeader(format!("duplicate column '{name}'")));
        }
        columns.push(column);
    }

    if !columns.contains(&Column::Week) {
        return Err(ImportError::InvalidHeader(format!(
            "missing '{WEEK_COLUMN}' column"
        )));
    }
    if let Some(missing) = DAY_COLUMNS
        .iter()
        .find(|day| !columns.contains(&Column::Day(**day)))
    {
        return Err(ImportError::InvalidHeader(format!(
            "missing '{missing}' column"
        )));
    }
    Ok(columns)
}

fn build_row(columns: &[Column], record: &StringRecord) -> ScheduleRow {
    let mut week_label = String::new();
    let mut activities = BTreeMap::new();
    for (column, cell) in columns.iter().zip(record.iter()) {
        match column {
            Column::Week => week_label = cell.to_string(),
            Column::Day(day) => {
                activities.insert(*day, cell.to_string());
            }
        }
    }
    ScheduleRow {
        week_label,
        activities,
    }
}

/// Writes a schedule in the import format, canonical column order.
/// # Errors
/// Returns `csv::Error` if writing fails.
pub fn write_schedule<W: io::Write>(weeks: &[ScheduleRow], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    let mut header = vec![WEEK_COLUMN];
    header.extend(DAY_COLUMNS.iter().map(|day| day.label()));
    writer.write_record(&header)?;
    for row in weeks {
        let mut record = vec![row.week_label.as_str()];
        record.extend(DAY_COLUMNS.iter().map(|day| row.activity(*day)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
