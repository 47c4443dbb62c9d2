//! In-progress form state for one task template.
//!
//! Setters apply the capture-time limits (text truncation, frequency
//! normalization, reward list bounds). Submit-time rules live in
//! `validation`.

use crate::column::LifeColumn;
use crate::task::{Frequency, XpReward};
use crate::validation::{COVER_PROMPT_MAX_CHARS, DESCRIPTION_MAX_CHARS, MAX_REWARDS, MIN_REWARDS, TITLE_MAX_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardField {
    Column,
    Xp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) cover_prompt: String,
    pub(crate) frequency: Frequency,
    pub(crate) rewards: Vec<XpReward>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            cover_prompt: String::new(),
            frequency: Frequency::Daily,
            rewards: vec![XpReward::default()],
        }
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Number coercion for the xp field: unparseable input becomes 0.
///
/// Accepts what a JS `Number()` conversion accepts and an `i64` can hold:
/// decimal integers, floats (truncated), and `0x`/`0o`/`0b` literals.
pub fn coerce_xp(value: &str) -> i64 {
    let v = value.trim();
    if let Ok(n) = v.parse::<i64>() {
        return n;
    }
    if let Some(n) = radix_literal(v) {
        return n;
    }
    match v.parse::<f64>() {
        Ok(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}

fn radix_literal(v: &str) -> Option<i64> {
    let (radix, digits) = match v.get(..2)? {
        "0x" | "0X" => (16, &v[2..]),
        "0o" | "0O" => (8, &v[2..]),
        "0b" | "0B" => (2, &v[2..]),
        _ => return None,
    };
    // from_str_radix would accept a sign here; Number() does not.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cover_prompt(&self) -> &str {
        &self.cover_prompt
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn rewards(&self) -> &[XpReward] {
        &self.rewards
    }

    pub fn set_title(&mut self, value: &str) {
        self.title = truncate_chars(value, TITLE_MAX_CHARS);
    }

    pub fn set_description(&mut self, value: &str) {
        self.description = truncate_chars(value, DESCRIPTION_MAX_CHARS);
    }

    pub fn set_cover_prompt(&mut self, value: &str) {
        self.cover_prompt = truncate_chars(value, COVER_PROMPT_MAX_CHARS);
    }

    pub fn set_frequency(&mut self, raw: &str) {
        self.frequency = Frequency::from_input(raw);
    }

    /// Appends a default reward unless the list is full.
    pub fn add_reward(&mut self) {
        if self.rewards.len() >= MAX_REWARDS {
            return;
        }
        self.rewards.push(XpReward::default());
    }

    /// Removes the reward at `index` unless it is the last one left.
    pub fn remove_reward(&mut self, index: usize) {
        if self.rewards.len() <= MIN_REWARDS || index >= self.rewards.len() {
            return;
        }
        self.rewards.remove(index);
    }

    /// Column values are taken as-is, without checking them against the
    /// recognized columns.
    pub fn update_reward(&mut self, index: usize, field: RewardField, value: &str) {
        let Some(reward) = self.rewards.get_mut(index) else {
            return;
        };
        match field {
            RewardField::Xp => reward.xp = coerce_xp(value),
            RewardField::Column => reward.column = LifeColumn::from(value),
        }
    }

    /// Post-success reset. Frequency and cover prompt carry over to the next task.
    pub fn reset_after_success(&mut self) {
        self.title.clear();
        self.description.clear();
        self.rewards = vec![XpReward::default()];
    }

    pub fn can_add_reward(&self) -> bool {
        self.rewards.len() < MAX_REWARDS
    }

    pub fn can_remove_reward(&self) -> bool {
        self.rewards.len() > MIN_REWARDS
    }

    /// "n/80" style counter for the title label.
    pub fn title_counter(&self) -> String {
        format!("{}/{}", self.title.chars().count(), TITLE_MAX_CHARS)
    }

    pub fn description_counter(&self) -> String {
        format!("{}/{}", self.description.chars().count(), DESCRIPTION_MAX_CHARS)
    }
}
