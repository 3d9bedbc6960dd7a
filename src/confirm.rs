// src/confirm.rs
//! The single dialog slot shared by acknowledgements and delete confirmations.
use chrono::NaiveDate;

use crate::state::View;

pub const DISMISS_LABEL: &str = "Close";
pub const CONFIRM_DELETE_LABEL: &str = "Yes, Delete";
pub const CANCEL_LABEL: &str = "Cancel";

/// A one-button acknowledgement, optionally navigating once dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub then: Option<View>,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            then: None,
        }
    }

    #[must_use]
    pub fn then(mut self, view: View) -> Self {
        self.then = Some(view);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteLog { date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
    pub on_cancel: View,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Dialog {
    #[default]
    Closed,
    Notice(Notice),
    Confirm(PendingConfirmation),
}

/// What pressing the primary button resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Dismissed { then: Option<View> },
    Confirmed(ConfirmAction),
}

#[derive(Debug, Default)]
pub struct ConfirmationFlow {
    dialog: Dialog,
}

impl ConfirmationFlow {
    pub const fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub const fn is_open(&self) -> bool {
        !matches!(self.dialog, Dialog::Closed)
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self.dialog, Dialog::Confirm(_))
    }

    /// Label of the primary (dismiss or confirm) button.
    pub const fn primary_label(&self) -> &'static str {
        match self.dialog {
            Dialog::Confirm(_) => CONFIRM_DELETE_LABEL,
            _ => DISMISS_LABEL,
        }
    }

    /// Label of the cancel button, present only while a confirmation is pending.
    pub const fn cancel_label(&self) -> Option<&'static str> {
        match self.dialog {
            Dialog::Confirm(_) => Some(CANCEL_LABEL),
            _ => None,
        }
    }

    /// Shows an acknowledgement, replacing whatever the slot held.
    pub fn notify(&mut self, notice: Notice) {
        self.restore();
        log::debug!("Notice raised: {}", notice.title);
        self.dialog = Dialog::Notice(notice);
    }

    /// Raises a confirmation. A previously pending one is dropped first,
    /// so only one confirm action exists at a time.
    pub fn raise(&mut self, pending: PendingConfirmation) {
        self.restore();
        log::debug!("Confirmation raised: {:?}", pending.action);
        self.dialog = Dialog::Confirm(pending);
    }

    /// Primary button: dismisses a notice or confirms a pending action.
    /// Returns `None` when no dialog is open.
    pub fn press_primary(&mut self) -> Option<Outcome> {
        match std::mem::take(&mut self.dialog) {
            Dialog::Closed => None,
            Dialog::Notice(notice) => Some(Outcome::Dismissed { then: notice.then }),
            Dialog::Confirm(pending) => Some(Outcome::Confirmed(pending.action)),
        }
    }

    /// Cancel button: drops a pending confirmation and returns its cancel target.
    /// Any other dialog is left untouched.
    pub fn press_cancel(&mut self) -> Option<View> {
        if !self.is_pending() {
            return None;
        }
        match std::mem::take(&mut self.dialog) {
            Dialog::Confirm(pending) => Some(pending.on_cancel),
            _ => None,
        }
    }

    /// Returns the slot to its plain state.
    fn restore(&mut self) {
        if let Dialog::Confirm(previous) = &self.dialog {
            log::debug!("Dropping pending confirmation {:?}", previous.action);
        }
        self.dialog = Dialog::Closed;
    }
}
