//! Password gate in front of the admin form.
//!
//! This is a novelty gate, not authentication: one fixed code, no lockout,
//! no attempt counting. Write access is authorized server-side by the admin key.

/// The gate code.
pub const GATE_CODE: &str = "187";

pub const WRONG_PASSWORD: &str = "Wrong password.";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccessGate {
    open: bool,
    message: Option<String>,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns whether the gate is open afterwards.
    /// An open gate stays open and ignores further attempts.
    pub fn attempt_unlock(&mut self, candidate: &str) -> bool {
        if self.open {
            return true;
        }
        if candidate == GATE_CODE {
            self.open = true;
            self.message = None;
        } else {
            self.message = Some(WRONG_PASSWORD.to_string());
        }
        self.open
    }
}
