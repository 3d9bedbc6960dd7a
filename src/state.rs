// src/state.rs
//! Application state and the view state machine.
use chrono::{Datelike, NaiveDate, Weekday};
use rusqlite::Connection;
use std::fmt;

use crate::confirm::{ConfirmAction, ConfirmationFlow, Notice, Outcome, PendingConfirmation};
use crate::dates::{format_date, is_storable};
use crate::error::{CoachError, ImportError, ValidationError, ViewError};
use crate::importer::read_schedule;
use crate::indexer::{locate, PlanPosition};
use crate::log_form::LogForm;
use crate::plan::{LoggedWorkoutEntry, TrainingPlan, WorkoutLogs};
use crate::store::{self, StoreError};

const DATA_ERROR_MESSAGE: &str =
    "Could not load saved data from storage. It might be corrupted.";

/// The screen currently shown. Dated views carry their date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    FullPlan,
    Import,
    LogEntry { date: NaiveDate },
    Detail { date: NaiveDate },
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::FullPlan => write!(f, "full plan"),
            Self::Import => write!(f, "import"),
            Self::LogEntry { date } => write!(f, "log entry ({date})"),
            Self::Detail { date } => write!(f, "detail ({date})"),
        }
    }
}

/// Process-wide application state. Every mutation is written through to the store.
pub struct AppState {
    conn: Connection,
    plan: Option<TrainingPlan>,
    logs: WorkoutLogs,
    view: View,
    today: NaiveDate,
    dialog: ConfirmationFlow,
}

impl AppState {
    /// Builds the state from whatever the store holds.
    ///
    /// Unreadable or corrupt data never fails startup: it is treated as
    /// absent and a single "Data Error" notice is raised.
    pub fn load(conn: Connection, today: NaiveDate) -> Self {
        let (records, data_error) = match store::load(&conn) {
            Ok(records) => {
                let corrupt = !records.problems.is_empty();
                (records, corrupt)
            }
            Err(e) => {
                log::error!("Error loading state from store: {e}");
                (store::LoadedRecords::default(), true)
            }
        };

        let view = if records.plan.is_some() {
            View::Dashboard
        } else {
            View::Import
        };
        let mut state = Self {
            conn,
            plan: records.plan,
            logs: records.logs,
            view,
            today,
            dialog: ConfirmationFlow::default(),
        };
        if data_error {
            state.dialog.notify(Notice::new("Data Error", DATA_ERROR_MESSAGE));
        }
        log::debug!(
            "State loaded: plan={}, {} log(s), view={}",
            state.plan.is_some(),
            state.logs.len(),
            state.view
        );
        state
    }

    // --- Accessors ---

    /// The view to render. A dashboard without a plan renders as the import view.
    pub const fn view(&self) -> View {
        match self.view {
            View::Dashboard if self.plan.is_none() => View::Import,
            view => view,
        }
    }

    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    pub const fn plan(&self) -> Option<&TrainingPlan> {
        self.plan.as_ref()
    }

    pub const fn logs(&self) -> &WorkoutLogs {
        &self.logs
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&LoggedWorkoutEntry> {
        self.logs.get(&date)
    }

    pub fn is_logged(&self, date: NaiveDate) -> bool {
        self.logs.contains_key(&date)
    }

    pub const fn dialog(&self) -> &ConfirmationFlow {
        &self.dialog
    }

    pub fn locate(&self, date: NaiveDate) -> PlanPosition {
        match &self.plan {
            Some(plan) => locate(date, Some(plan.start_date), &plan.weeks, &self.logs),
            None => PlanPosition::NotLoaded,
        }
    }

    /// Where the back action of a dated view leads.
    pub fn return_view(&self, date: NaiveDate) -> View {
        if date == self.today {
            View::Dashboard
        } else {
            View::FullPlan
        }
    }

    // --- Navigation ---

    /// Dashboard: open today's log form, or its details if already logged.
    /// # Errors
    /// `ViewError` if not on the dashboard, no plan is loaded, or a dialog is open.
    pub fn open_today(&mut self) -> Result<View, ViewError> {
        self.ensure_no_dialog()?;
        self.ensure_plan()?;
        self.expect_view(View::Dashboard, "open today's workout")?;
        let today = self.today;
        Ok(self.go(self.dated_view(today)))
    }

    /// Dashboard or import: show the full plan grid.
    /// # Errors
    /// `ViewError` if no plan is loaded, a dialog is open, or from another view.
    pub fn show_full_plan(&mut self) -> Result<View, ViewError> {
        self.ensure_no_dialog()?;
        self.ensure_plan()?;
        match self.view() {
            View::Dashboard | View::Import | View::FullPlan => Ok(self.go(View::FullPlan)),
            from => Err(invalid(from, "show the full plan")),
        }
    }

    /// Dashboard or full plan: switch to the import view to replace the plan.
    /// # Errors
    /// `ViewError` if a dialog is open or from a dated view.
    pub fn open_import(&mut self) -> Result<View, ViewError> {
        self.ensure_no_dialog()?;
        match self.view() {
            View::Dashboard | View::FullPlan | View::Import => Ok(self.go(View::Import)),
            from => Err(invalid(from, "open the import view")),
        }
    }

    /// Full plan: open a day's log form, or its details if logged.
    /// # Errors
    /// `ViewError::OutsidePlan` for dates outside the plan's span, or other `ViewError`s.
    pub fn select_day(&mut self, date: NaiveDate) -> Result<View, ViewError> {
        self.ensure_no_dialog()?;
        let plan = self.plan.as_ref().ok_or(ViewError::NoPlanLoaded)?;
        if !plan.contains(date) {
            return Err(ViewError::OutsidePlan(date));
        }
        self.expect_view(View::FullPlan, "select a day")?;
        Ok(self.go(self.dated_view(date)))
    }

    /// Detail: switch to the log form for the same date.
    /// # Errors
    /// `ViewError` if not on a detail view or a dialog is open.
    pub fn edit(&mut self) -> Result<View, ViewError> {
        self.ensure_no_dialog()?;
        match self.view() {
            View::Detail { date } => Ok(self.go(View::LogEntry { date })),
            from => Err(invalid(from, "edit a workout")),
        }
    }

    /// Back navigation from the current view.
    /// # Errors
    /// `ViewError` if the view has nowhere to go back to or a dialog is open.
    pub fn back(&mut self) -> Result<View, ViewError> {
        self.ensure_no_dialog()?;
        let target = match self.view() {
            View::LogEntry { date } | View::Detail { date } => self.return_view(date),
            View::FullPlan => View::Dashboard,
            View::Import if self.plan.is_some() => View::Dashboard,
            from => return Err(invalid(from, "go back")),
        };
        Ok(self.go(target))
    }

    // --- Mutations ---

    /// Replaces the training plan with a parsed schedule starting on `start_date`.
    ///
    /// Existing logs are kept. Returns the number of imported weeks.
    /// # Errors
    /// - `ImportError` if the start is not a Monday, the plan would end past
    ///   year 9999, or the text has no valid rows.
    /// - `ViewError` if not on the import view or a dialog is open.
    pub fn import_plan(&mut self, start_date: NaiveDate, text: &str) -> Result<usize, CoachError> {
        self.ensure_no_dialog()?;
        self.expect_view(View::Import, "import a plan")?;
        if start_date.weekday() != Weekday::Mon {
            return Err(ImportError::StartNotMonday(start_date).into());
        }
        let import = read_schedule(text)?;
        if !import.skipped_lines.is_empty() {
            log::warn!(
                "Import skipped {} malformed row(s) at line(s) {:?}",
                import.skipped_lines.len(),
                import.skipped_lines
            );
        }

        let plan = TrainingPlan {
            start_date,
            weeks: import.rows,
        };
        if !is_storable(start_date) || !is_storable(plan.end_date()) {
            return Err(ImportError::DateOutOfRange(start_date).into());
        }
        let week_count = plan.weeks.len();
        let saved = store::save_schedule(&mut self.conn, &plan, &self.logs);
        self.plan = Some(plan);
        log::info!("Imported {week_count} week(s) starting {start_date}");

        let start = format_date(start_date);
        self.acknowledge(
            saved,
            Notice::new(
                "Success",
                format!(
                    "Successfully imported {week_count} weeks of training data, starting {start}."
                ),
            ),
        );
        self.go(View::Dashboard);
        Ok(week_count)
    }

    /// Saves the log form for the date being edited.
    ///
    /// Navigation back happens only once the acknowledgement is dismissed.
    /// # Errors
    /// - `ValidationError` if a field is missing or malformed; nothing changes then.
    /// - `ViewError` if not on a log entry view or a dialog is open.
    pub fn submit_log(&mut self, form: &LogForm) -> Result<(), CoachError> {
        self.ensure_no_dialog()?;
        let View::LogEntry { date } = self.view() else {
            return Err(invalid(self.view(), "submit a workout log").into());
        };
        if !is_storable(date) {
            return Err(ValidationError::InvalidField {
                field: "date",
                reason: format!("{date} is past year 9999"),
            }
            .into());
        }
        let log = form.validate()?;

        let planned_activity = self
            .locate(date)
            .activity()
            .unwrap_or_default()
            .to_string();
        let previous = self.logs.insert(
            date,
            LoggedWorkoutEntry {
                planned_activity,
                log,
            },
        );
        let verb = if previous.is_some() { "updated" } else { "logged" };
        log::info!("Workout for {date} {verb}");

        let saved = store::save_logs(&self.conn, &self.logs);
        let back_to = self.return_view(date);
        let date = format_date(date);
        self.acknowledge(
            saved,
            Notice::new(
                "Success",
                format!("Workout for {date} has been successfully {verb}!"),
            )
            .then(back_to),
        );
        Ok(())
    }

    /// Detail: asks for confirmation before deleting the log.
    /// # Errors
    /// `ViewError` if not on a detail view, the date has no log, or a dialog is open.
    pub fn request_delete(&mut self) -> Result<(), ViewError> {
        self.ensure_no_dialog()?;
        let View::Detail { date } = self.view() else {
            return Err(invalid(self.view(), "delete a workout log"));
        };
        if !self.is_logged(date) {
            return Err(ViewError::NotLogged(date));
        }
        self.dialog.raise(PendingConfirmation {
            title: "Confirm Delete".to_string(),
            message: format!(
                "Are you sure you want to delete the workout log for {}?",
                format_date(date)
            ),
            action: ConfirmAction::DeleteLog { date },
            on_cancel: View::Detail { date },
        });
        Ok(())
    }

    /// Presses the dialog's primary button: dismisses a notice (performing its
    /// follow-up navigation) or confirms the pending action.
    /// # Errors
    /// `ViewError::NoDialog` if no dialog is open.
    pub fn dismiss_dialog(&mut self) -> Result<View, ViewError> {
        match self.dialog.press_primary().ok_or(ViewError::NoDialog)? {
            Outcome::Dismissed { then } => {
                if let Some(view) = then {
                    self.go(view);
                }
            }
            Outcome::Confirmed(ConfirmAction::DeleteLog { date }) => self.delete_log(date),
        }
        Ok(self.view())
    }

    /// Presses the dialog's cancel button, returning to the view the
    /// confirmation was raised from.
    /// # Errors
    /// `ViewError::NoDialog` if no confirmation is pending.
    pub fn cancel_dialog(&mut self) -> Result<View, ViewError> {
        let view = self.dialog.press_cancel().ok_or(ViewError::NoDialog)?;
        Ok(self.go(view))
    }

    fn delete_log(&mut self, date: NaiveDate) {
        if self.logs.remove(&date).is_some() {
            log::info!("Deleted workout log for {date}");
        }
        let saved = store::save_logs(&self.conn, &self.logs);
        self.go(self.return_view(date));
        self.acknowledge(
            saved,
            Notice::new(
                "Deleted",
                format!("The log for {} has been removed.", format_date(date)),
            ),
        );
    }

    // --- Helpers ---

    fn go(&mut self, view: View) -> View {
        if self.view != view {
            log::debug!("View {} -> {}", self.view, view);
        }
        self.view = view;
        view
    }

    fn dated_view(&self, date: NaiveDate) -> View {
        if self.is_logged(date) {
            View::Detail { date }
        } else {
            View::LogEntry { date }
        }
    }

    /// Shows `notice`, or a storage error carrying the same follow-up if the save failed.
    fn acknowledge(&mut self, saved: Result<(), StoreError>, notice: Notice) {
        match saved {
            Ok(()) => self.dialog.notify(notice),
            Err(e) => {
                log::error!("Failed to persist change: {e}");
                self.dialog.notify(Notice {
                    title: "Storage Error".to_string(),
                    message: format!(
                        "{} It could not be saved and will be lost when the app closes.",
                        notice.message
                    ),
                    then: notice.then,
                });
            }
        }
    }

    fn ensure_no_dialog(&self) -> Result<(), ViewError> {
        if self.dialog.is_open() {
            Err(ViewError::DialogOpen)
        } else {
            Ok(())
        }
    }

    const fn ensure_plan(&self) -> Result<(), ViewError> {
        if self.plan.is_some() {
            Ok(())
        } else {
            Err(ViewError::NoPlanLoaded)
        }
    }

    fn expect_view(&self, expected: View, action: &'static str) -> Result<(), ViewError> {
        let current = self.view();
        if current == expected {
            Ok(())
        } else {
            Err(invalid(current, action))
        }
    }
}

fn invalid(from: View, action: &'static str) -> ViewError {
    ViewError::InvalidTransition {
        from: from.to_string(),
        action,
    }
}
