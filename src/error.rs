// src/error.rs
use chrono::NaiveDate;
use thiserror::Error;

/// Unparsable date or malformed persisted record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Stored record '{key}' is corrupt: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("Stored schedule and start date are incomplete, one of them is missing")]
    IncompletePlan,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("The schedule file is empty.")]
    EmptyFile,
    #[error("The schedule file only contains a header row.")]
    HeaderOnly,
    #[error("Invalid header: {0}. Expected Week,Mon,Tue,Wed,Thu,Fri,Sat,Sun (any order).")]
    InvalidHeader(String),
    #[error("The schedule file contains no valid week rows.")]
    NoValidRows,
    #[error("Plan start date {0} is not a Monday.")]
    StartNotMonday(NaiveDate),
    #[error("The plan would run past year 9999 (starting {0}).")]
    DateOutOfRange(NaiveDate),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Cannot {action} from the {from} view.")]
    InvalidTransition { from: String, action: &'static str },
    #[error("No training plan loaded. Import a schedule first.")]
    NoPlanLoaded,
    #[error("{0} is outside the training plan.")]
    OutsidePlan(NaiveDate),
    #[error("A dialog is open, dismiss it first.")]
    DialogOpen,
    #[error("No dialog is open.")]
    NoDialog,
    #[error("No workout logged for {0}.")]
    NotLogged(NaiveDate),
}

/// Errors returned to the presentation layer by user actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoachError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    View(#[from] ViewError),
}
