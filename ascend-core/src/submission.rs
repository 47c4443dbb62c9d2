//! Admin form session and the submission workflow.
//!
//! Per attempt:
//!
//! ```text
//! Idle -> Validating -> Idle                      (rule failed, message set, no call)
//!                    -> Submitting -> Idle        (one call; success resets the form)
//! ```
//!
//! The network is reached only through [`TaskSink`]. A session is built on view
//! entry and dropped on exit; nothing outlives it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::form::TaskForm;
use crate::gate::AccessGate;
use crate::task::TaskSubmission;
use crate::validation::{validate, ValidationError};

pub const CREATED_MESSAGE: &str = "Task created successfully.";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Why a remote call did not succeed. Display strings are the operator-facing
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The backend answered with a non-success status.
    #[error("Error: {message}")]
    Rejected { status: u16, message: String },

    /// The call itself failed (connect, timeout, unreadable response).
    #[error("Network error: {0}")]
    Transport(String),
}

/// Destination for validated tasks.
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn create_task(&self, task: &TaskSubmission) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Invalid(ValidationError),
    Rejected { status: u16, message: String },
    NetworkError(String),
    /// Gate closed or a call already in flight; nothing happened.
    Ignored,
}

impl SubmitOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created)
    }
}

#[derive(Debug, Default)]
pub struct AdminSession {
    gate: AccessGate,
    form: TaskForm,
    phase: SubmitPhase,
    message: Option<String>,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self) -> bool {
        self.gate.is_open()
    }

    pub fn attempt_unlock(&mut self, candidate: &str) -> bool {
        if self.gate.is_open() {
            return true;
        }
        let open = self.gate.attempt_unlock(candidate);
        self.message = self.gate.message().map(str::to_string);
        if !open {
            info!("admin gate: wrong password");
        }
        open
    }

    /// The form, once the gate is open.
    pub fn form(&self) -> Option<&TaskForm> {
        self.gate.is_open().then_some(&self.form)
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        if self.gate.is_open() {
            Some(&mut self.form)
        } else {
            None
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    /// Label for the submit control.
    pub fn submit_label(&self) -> &'static str {
        if self.is_busy() {
            "Submitting..."
        } else {
            "Create task"
        }
    }

    /// First half of an attempt: clear the message and validate.
    ///
    /// Returns the submission to send and enters `Submitting`, or `Err` with
    /// the outcome to report when nothing should be sent.
    pub fn begin_submit(&mut self) -> Result<TaskSubmission, SubmitOutcome> {
        if !self.gate.is_open() || self.is_busy() {
            return Err(SubmitOutcome::Ignored);
        }
        self.message = None;

        match validate(&self.form) {
            Ok(task) => {
                self.phase = SubmitPhase::Submitting;
                Ok(task)
            }
            Err(e) => {
                self.message = Some(e.to_string());
                Err(SubmitOutcome::Invalid(e))
            }
        }
    }

    /// Second half of an attempt: record the call result and return to `Idle`.
    pub fn finish_submit(&mut self, result: Result<(), SinkError>) -> SubmitOutcome {
        self.phase = SubmitPhase::Idle;
        match result {
            Ok(()) => {
                info!("task created");
                self.message = Some(CREATED_MESSAGE.to_string());
                self.form.reset_after_success();
                SubmitOutcome::Created
            }
            Err(e) => {
                self.message = Some(e.to_string());
                match e {
                    SinkError::Rejected { status, message } => {
                        warn!(status, error = %message, "task rejected by backend");
                        SubmitOutcome::Rejected { status, message }
                    }
                    SinkError::Transport(cause) => {
                        error!(error = %cause, "task submission failed");
                        SubmitOutcome::NetworkError(cause)
                    }
                }
            }
        }
    }

    /// Validate and, when every rule passes, make exactly one call to `sink`.
    pub async fn submit(&mut self, sink: &dyn TaskSink) -> SubmitOutcome {
        let task = match self.begin_submit() {
            Ok(task) => task,
            Err(outcome) => return outcome,
        };
        let result = sink.create_task(&task).await;
        self.finish_submit(result)
    }
}
