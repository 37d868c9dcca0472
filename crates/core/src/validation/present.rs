//! Error-presentation capability.
//!
//! After a pass with presentation enabled, the session hands every violation
//! to an [`ErrorPresenter`]. How a field gets marked is up to the
//! implementation; the returned violation list is never affected.

use std::cell::RefCell;

use super::rules::FieldViolation;

/// Marks invalid fields in some UI.
pub trait ErrorPresenter {
    /// Remove marks left by a previous pass. Called once before any
    /// [`present`](Self::present) call of a pass.
    fn clear(&self) {}

    /// Mark the field of `violation`, tagging the mark with `error_class`.
    fn present(&self, violation: &FieldViolation, error_class: &str);
}

/// One mark placed by [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedError {
    /// Id of the marked element (field name when the source has no ids).
    pub target: String,
    pub message: String,
    pub label: String,
    pub class: String,
}

/// Keeps the marks in memory, like error labels injected next to inputs.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    marks: RefCell<Vec<PresentedError>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks currently shown.
    pub fn presented(&self) -> Vec<PresentedError> {
        self.marks.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.marks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.borrow().is_empty()
    }
}

impl ErrorPresenter for RecordingPresenter {
    fn clear(&self) {
        self.marks.borrow_mut().clear();
    }

    fn present(&self, violation: &FieldViolation, error_class: &str) {
        self.marks.borrow_mut().push(PresentedError {
            target: violation.id.clone(),
            message: violation.message.clone(),
            label: violation.label.clone(),
            class: error_class.to_string(),
        });
    }
}

/// Emits one `tracing` warning per violation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl ErrorPresenter for TracingPresenter {
    fn present(&self, violation: &FieldViolation, error_class: &str) {
        tracing::warn!(
            field = %violation.name,
            id = %violation.id,
            rule = %violation.rule,
            class = error_class,
            "{}",
            violation.message
        );
    }
}
