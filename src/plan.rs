// src/plan.rs
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dates::{DayColumn, DAY_COLUMNS};

/// One imported week of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "week")]
    pub week_label: String,
    pub activities: BTreeMap<DayColumn, String>,
}

impl ScheduleRow {
    pub fn new(week_label: impl Into<String>, activities: [&str; 7]) -> Self {
        Self {
            week_label: week_label.into(),
            activities: DAY_COLUMNS
                .iter()
                .zip(activities)
                .map(|(day, text)| (*day, text.to_string()))
                .collect(),
        }
    }

    pub fn activity(&self, day: DayColumn) -> &str {
        self.activities.get(&day).map_or("", String::as_str)
    }

    /// A row is complete when all seven day columns are present.
    pub fn is_complete(&self) -> bool {
        DAY_COLUMNS.iter().all(|day| self.activities.contains_key(day))
    }
}

/// An imported schedule anchored on its first Monday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingPlan {
    pub start_date: NaiveDate,
    pub weeks: Vec<ScheduleRow>,
}

impl TrainingPlan {
    /// Last day (a Sunday) covered by the plan.
    pub fn end_date(&self) -> NaiveDate {
        let week_count = self.weeks.len().max(1);
        cell_date(self.start_date, week_count - 1, 6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        !self.weeks.is_empty() && date >= self.start_date && date <= self.end_date()
    }

}

/// Week label shown once a plan of `week_count` weeks is over, e.g. "Week 25+".
pub fn finished_week_label(week_count: usize) -> String {
    format!("Week {}+", week_count + 1)
}

/// Calendar date of the cell at `week_index`/`day_index` (0 = Mon).
#[allow(clippy::cast_possible_wrap)]
pub fn cell_date(start: NaiveDate, week_index: usize, day_index: usize) -> NaiveDate {
    start + Duration::days((week_index * 7 + day_index) as i64)
}

/// The actual result of a workout as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    /// Always kilometres.
    pub distance: f64,
    pub duration: String,
    pub pace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedWorkoutEntry {
    /// Planned activity at the time of logging, kept even if the plan changes later.
    #[serde(rename = "plan")]
    pub planned_activity: String,
    pub log: WorkoutLog,
}

pub type WorkoutLogs = BTreeMap<NaiveDate, LoggedWorkoutEntry>;
