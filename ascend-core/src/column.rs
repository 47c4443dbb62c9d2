//! Life columns: the attribute tracks an XP reward credits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the seven recognized life columns.
///
/// `Other` holds a raw value that was assigned without a membership check
/// (see `TaskForm::update_reward`). It serializes as that raw string, so a
/// submission carries exactly what the operator typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifeColumn {
    #[default]
    Knowledge,
    Fitness,
    Wealth,
    Social,
    Career,
    InnerBalance,
    Environment,
    Other(String),
}

impl LifeColumn {
    /// Recognized columns, in menu order.
    pub const ALL: [LifeColumn; 7] = [
        LifeColumn::Knowledge,
        LifeColumn::Fitness,
        LifeColumn::Wealth,
        LifeColumn::Social,
        LifeColumn::Career,
        LifeColumn::InnerBalance,
        LifeColumn::Environment,
    ];

    /// Wire value.
    pub fn as_str(&self) -> &str {
        match self {
            LifeColumn::Knowledge => "knowledge",
            LifeColumn::Fitness => "fitness",
            LifeColumn::Wealth => "wealth",
            LifeColumn::Social => "social",
            LifeColumn::Career => "career",
            LifeColumn::InnerBalance => "inner_balance",
            LifeColumn::Environment => "environment",
            LifeColumn::Other(raw) => raw,
        }
    }

    /// Human label for menus.
    pub fn label(&self) -> &str {
        match self {
            LifeColumn::Knowledge => "Knowledge",
            LifeColumn::Fitness => "Fitness",
            LifeColumn::Wealth => "Wealth",
            LifeColumn::Social => "Social",
            LifeColumn::Career => "Career",
            LifeColumn::InnerBalance => "Inner balance",
            LifeColumn::Environment => "Environment",
            LifeColumn::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, LifeColumn::Other(_))
    }

    /// Next recognized column in menu order, wrapping. `Other` cycles back to
    /// the first column.
    pub fn next(&self) -> LifeColumn {
        let pos = Self::ALL.iter().position(|c| c == self);
        match pos {
            Some(i) => Self::ALL[(i + 1) % Self::ALL.len()].clone(),
            None => Self::ALL[0].clone(),
        }
    }

    /// Previous recognized column in menu order, wrapping.
    pub fn prev(&self) -> LifeColumn {
        let pos = Self::ALL.iter().position(|c| c == self);
        match pos {
            Some(0) | None => Self::ALL[Self::ALL.len() - 1].clone(),
            Some(i) => Self::ALL[i - 1].clone(),
        }
    }
}

impl From<&str> for LifeColumn {
    fn from(raw: &str) -> Self {
        match raw {
            "knowledge" => LifeColumn::Knowledge,
            "fitness" => LifeColumn::Fitness,
            "wealth" => LifeColumn::Wealth,
            "social" => LifeColumn::Social,
            "career" => LifeColumn::Career,
            "inner_balance" => LifeColumn::InnerBalance,
            "environment" => LifeColumn::Environment,
            other => LifeColumn::Other(other.to_string()),
        }
    }
}

impl From<String> for LifeColumn {
    fn from(raw: String) -> Self {
        LifeColumn::from(raw.as_str())
    }
}

impl From<LifeColumn> for String {
    fn from(column: LifeColumn) -> Self {
        column.as_str().to_string()
    }
}

impl fmt::Display for LifeColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
