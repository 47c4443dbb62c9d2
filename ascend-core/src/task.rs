//! Task template model posted to the backend.
//!
//! A `TaskSubmission` is the validated, trimmed snapshot of a form. It can only
//! be produced by `validation::validate`, so holding one means every submit-time
//! rule has passed.

use serde::{Deserialize, Serialize};

use crate::column::LifeColumn;

/// XP granted for a fresh reward row.
pub const DEFAULT_REWARD_XP: i64 = 10;

/// UI bounds for a single reward amount. Enforced at input capture only.
pub const MIN_REWARD_XP: i64 = 1;
pub const MAX_REWARD_XP: i64 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
}

impl Frequency {
    /// Normalize a raw selector value; anything but "weekly" is daily.
    pub fn from_input(raw: &str) -> Self {
        if raw == "weekly" {
            Frequency::Weekly
        } else {
            Frequency::Daily
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Daily,
        }
    }
}

/// An (attribute, amount) pair granted for completing a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpReward {
    pub column: LifeColumn,
    pub xp: i64,
}

impl XpReward {
    pub fn new(column: impl Into<LifeColumn>, xp: i64) -> Self {
        Self {
            column: column.into(),
            xp,
        }
    }
}

impl Default for XpReward {
    fn default() -> Self {
        Self {
            column: LifeColumn::Knowledge,
            xp: DEFAULT_REWARD_XP,
        }
    }
}

/// Request body for the task-template endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSubmission {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) frequency: Frequency,
    pub(crate) cover_prompt: String,
    pub(crate) xp_rewards: Vec<XpReward>,
}

impl TaskSubmission {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn cover_prompt(&self) -> &str {
        &self.cover_prompt
    }

    pub fn xp_rewards(&self) -> &[XpReward] {
        &self.xp_rewards
    }

    /// Wire JSON, as posted.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "frequency": self.frequency,
            "cover_prompt": self.cover_prompt,
            "xp_rewards": self.xp_rewards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_normalization() {
        assert_eq!(Frequency::from_input("weekly"), Frequency::Weekly);
        assert_eq!(Frequency::from_input("daily"), Frequency::Daily);
        assert_eq!(Frequency::from_input("monthly"), Frequency::Daily);
        assert_eq!(Frequency::from_input("Weekly"), Frequency::Daily);
        assert_eq!(Frequency::from_input(""), Frequency::Daily);
    }

    #[test]
    fn test_default_reward() {
        let r = XpReward::default();
        assert_eq!(r.column, LifeColumn::Knowledge);
        assert_eq!(r.xp, 10);
    }

    #[test]
    fn test_submission_wire_shape() {
        let s = TaskSubmission {
            title: "Read".to_string(),
            description: "Read 10 pages".to_string(),
            frequency: Frequency::Weekly,
            cover_prompt: "Cozy study nook at sunrise".to_string(),
            xp_rewards: vec![XpReward::new("knowledge", 15), XpReward::new("inner_balance", 5)],
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, s.to_json());
        assert_eq!(v["frequency"], "weekly");
        assert_eq!(v["cover_prompt"], "Cozy study nook at sunrise");
        assert_eq!(v["xp_rewards"][1]["column"], "inner_balance");
        assert_eq!(v["xp_rewards"][1]["xp"], 5);
    }
}
