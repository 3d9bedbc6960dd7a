// src/indexer.rs
use chrono::NaiveDate;

use crate::dates::{day_column, days_between, DayColumn, DAY_COLUMNS};
use crate::plan::{finished_week_label, ScheduleRow, WorkoutLog, WorkoutLogs};

pub const BEFORE_PLAN_LABEL: &str = "Before Plan";
pub const PLAN_NOT_STARTED: &str = "Plan Not Started";
pub const PLAN_FINISHED: &str = "Plan Finished";

/// Where a calendar date falls relative to the imported plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanPosition {
    NotLoaded,
    BeforePlan {
        day: DayColumn,
    },
    Finished {
        week_label: String,
        day: DayColumn,
    },
    Scheduled {
        week_index: usize,
        week_label: String,
        day: DayColumn,
        activity: String,
        log: Option<WorkoutLog>,
    },
}

impl PlanPosition {
    pub const fn is_loaded(&self) -> bool {
        !matches!(self, Self::NotLoaded)
    }

    pub fn week_label(&self) -> Option<&str> {
        match self {
            Self::NotLoaded => None,
            Self::BeforePlan { .. } => Some(BEFORE_PLAN_LABEL),
            Self::Finished { week_label, .. } | Self::Scheduled { week_label, .. } => {
                Some(week_label)
            }
        }
    }

    pub const fn day(&self) -> Option<DayColumn> {
        match self {
            Self::NotLoaded => None,
            Self::BeforePlan { day } | Self::Finished { day, .. } | Self::Scheduled { day, .. } => {
                Some(*day)
            }
        }
    }

    pub fn activity(&self) -> Option<&str> {
        match self {
            Self::NotLoaded => None,
            Self::BeforePlan { .. } => Some(PLAN_NOT_STARTED),
            Self::Finished { .. } => Some(PLAN_FINISHED),
            Self::Scheduled { activity, .. } => Some(activity),
        }
    }

    pub const fn log(&self) -> Option<&WorkoutLog> {
        match self {
            Self::Scheduled { log, .. } => log.as_ref(),
            _ => None,
        }
    }
}

/// Maps `target` onto the week/day cell of a plan starting on `start`.
///
/// Uses calendar-day differences only, so any date strictly before `start`
/// is "Before Plan" and a date `7 * weeks.len()` or more days after it is
/// past the end, independent of month, year or daylight-saving boundaries.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn locate(
    target: NaiveDate,
    start: Option<NaiveDate>,
    weeks: &[ScheduleRow],
    logs: &WorkoutLogs,
) -> PlanPosition {
    let Some(start) = start.filter(|_| !weeks.is_empty()) else {
        return PlanPosition::NotLoaded;
    };

    let day_offset = days_between(start, target);
    if day_offset < 0 {
        return PlanPosition::BeforePlan {
            day: day_column(target),
        };
    }

    let week_index = (day_offset / 7) as usize;
    let day_index = (day_offset % 7) as usize;

    let Some(row) = weeks.get(week_index) else {
        return PlanPosition::Finished {
            week_label: finished_week_label(weeks.len()),
            day: day_column(target),
        };
    };

    let day = DAY_COLUMNS[day_index];
    PlanPosition::Scheduled {
        week_index,
        week_label: row.week_label.clone(),
        day,
        activity: row.activity(day).to_string(),
        log: logs.get(&target).map(|entry| entry.log.clone()),
    }
}
