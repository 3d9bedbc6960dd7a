// src/store.rs
//! Key-value persistence of the schedule, its start date and the workout logs.
use chrono::Datelike;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dates::{format_date, parse_date};
use crate::error::FormatError;
use crate::plan::{LoggedWorkoutEntry, ScheduleRow, TrainingPlan, WorkoutLogs};

pub const PLAN_KEY: &str = "marathon_plan";
pub const START_DATE_KEY: &str = "marathon_start_date";
pub const LOGS_KEY: &str = "marathon_logs";

const DB_FILE_NAME: &str = "coach.sqlite";
const APP_DATA_DIR: &str = "marathon-coach";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed: {0}")]
    WriteFailed(rusqlite::Error),
    #[error("Failed to serialize record '{key}': {source}")]
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// Everything `load` could recover, plus what it had to discard.
#[derive(Debug, Default)]
pub struct LoadedRecords {
    pub plan: Option<TrainingPlan>,
    pub logs: WorkoutLogs,
    pub problems: Vec<FormatError>,
}

/// Gets the path to the SQLite database file within the app's data directory.
/// # Errors
/// Returns `StoreError::DataDir` or `StoreError::Io` if the directory is unavailable.
pub fn get_store_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir().ok_or(StoreError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
/// # Errors
/// Returns `StoreError::Connection` if the file cannot be opened.
pub fn open_store<P: AsRef<Path>>(path: P) -> Result<Connection, StoreError> {
    Connection::open(path).map_err(StoreError::Connection)
}

/// Creates the records table if it doesn't exist.
/// # Errors
/// Returns `StoreError::Connection` if the statement fails.
pub fn init_store(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS records (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(StoreError::Connection)?;
    Ok(())
}

// --- Raw key-value access ---

/// Reads a raw record.
/// # Errors
/// Returns `StoreError::QueryFailed` on database errors.
pub fn get_record(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    conn.query_row(
        "SELECT value FROM records WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(StoreError::QueryFailed)
}

/// Inserts or replaces a raw record.
/// # Errors
/// Returns `StoreError::WriteFailed` on database errors.
pub fn put_record(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO records (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(StoreError::WriteFailed)?;
    Ok(())
}

// --- Gateway ---

/// Loads the three records, discarding any that cannot be understood.
///
/// A schedule without a start date (or the reverse) is discarded as a whole.
/// A missing log record is an empty map.
/// # Errors
/// Returns `StoreError` only if the database itself cannot be read.
pub fn load(conn: &Connection) -> Result<LoadedRecords, StoreError> {
    let mut problems = Vec::new();

    let weeks = get_record(conn, PLAN_KEY)?.and_then(|raw| {
        decode_schedule(&raw)
            .map_err(|e| problems.push(e))
            .ok()
    });
    let start_date = get_record(conn, START_DATE_KEY)?.and_then(|raw| {
        parse_date(raw.trim())
            .map_err(|e| problems.push(e))
            .ok()
    });

    let plan = match (weeks, start_date) {
        (Some(weeks), Some(start_date)) if !weeks.is_empty() => {
            if start_date.weekday() != chrono::Weekday::Mon {
                log::warn!("Stored plan start {start_date} is not a Monday");
            }
            Some(TrainingPlan { start_date, weeks })
        }
        (None, None) => None,
        (Some(weeks), None) if weeks.is_empty() => None,
        (Some(_), Some(_)) => None,
        _ => {
            problems.push(FormatError::IncompletePlan);
            None
        }
    };

    let logs = match get_record(conn, LOGS_KEY)? {
        Some(raw) => decode_logs(&raw, &mut problems),
        None => WorkoutLogs::new(),
    };

    for problem in &problems {
        log::warn!("Discarded stored data: {problem}");
    }
    Ok(LoadedRecords {
        plan,
        logs,
        problems,
    })
}

/// Saves the schedule, its start date and the log map.
/// The log map is always rewritten so a fresh store ends up with an empty record.
/// # Errors
/// Returns `StoreError` if serialization or any write fails; nothing is written then.
pub fn save_schedule(
    conn: &mut Connection,
    plan: &TrainingPlan,
    logs: &WorkoutLogs,
) -> Result<(), StoreError> {
    let schedule = serde_json::to_string(&plan.weeks).map_err(|source| StoreError::Serialize {
        key: PLAN_KEY,
        source,
    })?;
    let logs = encode_logs(logs)?;

    let tx = conn.transaction().map_err(StoreError::WriteFailed)?;
    put_record(&tx, PLAN_KEY, &schedule)?;
    put_record(&tx, START_DATE_KEY, &format_date(plan.start_date))?;
    put_record(&tx, LOGS_KEY, &logs)?;
    tx.commit().map_err(StoreError::WriteFailed)?;
    log::info!(
        "Saved {} week plan starting {}",
        plan.weeks.len(),
        plan.start_date
    );
    Ok(())
}

/// Saves only the log map.
/// # Errors
/// Returns `StoreError` if serialization or the write fails.
pub fn save_logs(conn: &Connection, logs: &WorkoutLogs) -> Result<(), StoreError> {
    put_record(conn, LOGS_KEY, &encode_logs(logs)?)?;
    log::debug!("Saved {} workout log(s)", logs.len());
    Ok(())
}

fn decode_schedule(raw: &str) -> Result<Vec<ScheduleRow>, FormatError> {
    let corrupt = |reason: String| FormatError::CorruptRecord {
        key: PLAN_KEY.to_string(),
        reason,
    };
    let weeks: Vec<ScheduleRow> = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    if let Some(row) = weeks.iter().find(|row| !row.is_complete()) {
        return Err(corrupt(format!("'{}' is missing a day", row.week_label)));
    }
    Ok(weeks)
}

/// Decodes the log map, dropping entries whose key is not a valid date.
fn decode_logs(raw: &str, problems: &mut Vec<FormatError>) -> WorkoutLogs {
    let entries: BTreeMap<String, LoggedWorkoutEntry> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            problems.push(FormatError::CorruptRecord {
                key: LOGS_KEY.to_string(),
                reason: e.to_string(),
            });
            return WorkoutLogs::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|(key, entry)| match parse_date(&key) {
            Ok(date) => Some((date, entry)),
            Err(e) => {
                problems.push(e);
                None
            }
        })
        .collect()
}

fn encode_logs(logs: &WorkoutLogs) -> Result<String, StoreError> {
    let keyed: BTreeMap<String, &LoggedWorkoutEntry> = logs
        .iter()
        .map(|(date, entry)| (format_date(*date), entry))
        .collect();
    serde_json::to_string(&keyed).map_err(|source| StoreError::Serialize {
        key: LOGS_KEY,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::WorkoutLog;
    use chrono::NaiveDate;

    fn delete_record(conn: &Connection, key: &str) -> bool {
        conn.execute("DELETE FROM records WHERE key = ?1", params![key])
            .unwrap()
            > 0
    }

    fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_store(&conn).unwrap();
        conn
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan() -> TrainingPlan {
        TrainingPlan {
            start_date: ymd(2024, 1, 1),
            weeks: vec![ScheduleRow::new(
                "Week 1",
                ["Rest", "5k", "Rest", "8k", "Rest", "10k", "Cross"],
            )],
        }
    }

    fn entry() -> LoggedWorkoutEntry {
        LoggedWorkoutEntry {
            planned_activity: "5k".into(),
            log: WorkoutLog {
                distance: 5.2,
                duration: "00:28:00".into(),
                pace: "5:23".into(),
                avg_heart_rate: None,
                external_link: Some("https://example.com/run".into()),
            },
        }
    }

    #[test]
    fn empty_store_loads_nothing() {
        let conn = memory_store();
        let loaded = load(&conn).unwrap();
        assert!(loaded.plan.is_none());
        assert!(loaded.logs.is_empty());
        assert!(loaded.problems.is_empty());
    }

    #[test]
    fn saving_a_schedule_also_writes_an_empty_log_record() {
        let mut conn = memory_store();
        save_schedule(&mut conn, &plan(), &WorkoutLogs::new()).unwrap();
        assert_eq!(get_record(&conn, LOGS_KEY).unwrap().as_deref(), Some("{}"));
        assert_eq!(
            get_record(&conn, START_DATE_KEY).unwrap().as_deref(),
            Some("2024-01-01")
        );
        let loaded = load(&conn).unwrap();
        assert_eq!(loaded.plan, Some(plan()));
        assert!(loaded.problems.is_empty());
    }

    #[test]
    fn logs_are_keyed_by_canonical_date() {
        let conn = memory_store();
        let mut logs = WorkoutLogs::new();
        logs.insert(ymd(2024, 1, 2), entry());
        save_logs(&conn, &logs).unwrap();
        let raw = get_record(&conn, LOGS_KEY).unwrap().unwrap();
        assert!(raw.starts_with(r#"{"2024-01-02":{"plan":"5k","log":{"distance":5.2"#));
        assert_eq!(load(&conn).unwrap().logs, logs);
    }

    #[test]
    fn corrupt_schedule_is_discarded_but_logs_survive() {
        let mut conn = memory_store();
        let mut logs = WorkoutLogs::new();
        logs.insert(ymd(2024, 1, 2), entry());
        save_schedule(&mut conn, &plan(), &logs).unwrap();
        put_record(&conn, PLAN_KEY, "[{not json").unwrap();

        let loaded = load(&conn).unwrap();
        assert!(loaded.plan.is_none());
        assert_eq!(loaded.logs, logs);
        assert!(matches!(
            loaded.problems.as_slice(),
            [FormatError::CorruptRecord { key, .. }, FormatError::IncompletePlan] if key == PLAN_KEY
        ));
    }

    #[test]
    fn rows_missing_days_are_corrupt() {
        let conn = memory_store();
        put_record(&conn, PLAN_KEY, r#"[{"week":"Week 1","activities":{"Mon":"Rest"}}]"#).unwrap();
        put_record(&conn, START_DATE_KEY, "2024-01-01").unwrap();
        let loaded = load(&conn).unwrap();
        assert!(loaded.plan.is_none());
        assert!(!loaded.problems.is_empty());
    }

    #[test]
    fn bad_start_date_discards_the_plan() {
        let mut conn = memory_store();
        save_schedule(&mut conn, &plan(), &WorkoutLogs::new()).unwrap();
        put_record(&conn, START_DATE_KEY, "01/01/2024").unwrap();
        let loaded = load(&conn).unwrap();
        assert!(loaded.plan.is_none());
        assert!(loaded
            .problems
            .contains(&FormatError::InvalidDate("01/01/2024".into())));
    }

    #[test]
    fn missing_start_date_is_an_incomplete_plan() {
        let mut conn = memory_store();
        save_schedule(&mut conn, &plan(), &WorkoutLogs::new()).unwrap();
        assert!(delete_record(&conn, START_DATE_KEY));
        let loaded = load(&conn).unwrap();
        assert!(loaded.plan.is_none());
        assert_eq!(loaded.problems, vec![FormatError::IncompletePlan]);
    }

    #[test]
    fn missing_log_record_is_empty_not_an_error() {
        let mut conn = memory_store();
        save_schedule(&mut conn, &plan(), &WorkoutLogs::new()).unwrap();
        delete_record(&conn, LOGS_KEY);
        let loaded = load(&conn).unwrap();
        assert!(loaded.plan.is_some());
        assert!(loaded.logs.is_empty());
        assert!(loaded.problems.is_empty());
    }

    #[test]
    fn invalid_log_keys_are_dropped() {
        let conn = memory_store();
        let good = serde_json::to_string(&entry()).unwrap();
        put_record(
            &conn,
            LOGS_KEY,
            &format!(r#"{{"2024-01-02":{good},"yesterday":{good}}}"#),
        )
        .unwrap();
        let loaded = load(&conn).unwrap();
        assert_eq!(loaded.logs.len(), 1);
        assert!(loaded.logs.contains_key(&ymd(2024, 1, 2)));
        assert_eq!(
            loaded.problems,
            vec![FormatError::InvalidDate("yesterday".into())]
        );
    }
}
