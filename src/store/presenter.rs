use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLevel::Success => write!(f, "success"),
            StatusLevel::Info => write!(f, "info"),
            StatusLevel::Warning => write!(f, "warning"),
            StatusLevel::Danger => write!(f, "danger"),
        }
    }
}

/// Notifications the store sends to whatever is showing its state.
///
/// All calls are fire-and-forget.
pub trait Presenter {
    /// Redraw the todo and project lists
    fn render(&mut self);
    /// Show a transient message
    fn status(&mut self, message: &str, level: StatusLevel);
    /// The set of known tags or active filters changed
    fn refresh_tag_filters(&mut self);
    /// The number of archived todos may have changed
    fn refresh_archive_badge(&mut self);
    /// The bound file was written automatically
    fn autosaved(&mut self, at: DateTime<Utc>);
}

/// Presenter that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render(&mut self) {}
    fn status(&mut self, _message: &str, _level: StatusLevel) {}
    fn refresh_tag_filters(&mut self) {}
    fn refresh_archive_badge(&mut self) {}
    fn autosaved(&mut self, _at: DateTime<Utc>) {}
}

/// One recorded presenter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Render,
    Status(String, StatusLevel),
    RefreshTagFilters,
    RefreshArchiveBadge,
    Autosaved,
}

/// Presenter that records every call. Clones share one log, so a test can
/// hand one clone to the store and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Rc<RefCell<Vec<PresenterEvent>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        RecordingPresenter::default()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<PresenterEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Status messages recorded so far, without draining
    pub fn statuses(&self) -> Vec<(String, StatusLevel)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Status(msg, level) => Some((msg.clone(), *level)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PresenterEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self) {
        self.push(PresenterEvent::Render);
    }

    fn status(&mut self, message: &str, level: StatusLevel) {
        self.push(PresenterEvent::Status(message.to_string(), level));
    }

    fn refresh_tag_filters(&mut self) {
        self.push(PresenterEvent::RefreshTagFilters);
    }

    fn refresh_archive_badge(&mut self) {
        self.push(PresenterEvent::RefreshArchiveBadge);
    }

    fn autosaved(&mut self, _at: DateTime<Utc>) {
        self.push(PresenterEvent::Autosaved);
    }
}
