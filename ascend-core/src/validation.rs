//! Submit-time validation.
//!
//! Rules run in a fixed order and the first failure wins:
//! 1. title
//! 2. cover prompt
//! 3. description
//! 4. reward count
//!
//! Per-reward bounds (column membership, xp range) are input-level only and are
//! not re-checked here.

use thiserror::Error;
use tracing::debug;

use crate::form::TaskForm;
use crate::task::TaskSubmission;

pub const TITLE_MAX_CHARS: usize = 80;
pub const DESCRIPTION_MAX_CHARS: usize = 220;
pub const COVER_PROMPT_MAX_CHARS: usize = 120;
pub const MIN_REWARDS: usize = 1;
pub const MAX_REWARDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required and must be <= 80 characters.")]
    Title,
    #[error("Please provide a cover prompt.")]
    CoverPrompt,
    #[error("Description is required and must be <= 220 characters.")]
    Description,
    #[error("You must have 1–3 XP rewards.")]
    RewardCount,
}

fn bounded(text: &str, max_chars: usize) -> bool {
    let n = text.chars().count();
    n >= 1 && n <= max_chars
}

/// Build the submission for `form`, or report the first failing rule.
pub fn validate(form: &TaskForm) -> Result<TaskSubmission, ValidationError> {
    let title = form.title().trim();
    if !bounded(title, TITLE_MAX_CHARS) {
        return Err(ValidationError::Title);
    }

    let cover_prompt = form.cover_prompt().trim();
    if cover_prompt.is_empty() {
        return Err(ValidationError::CoverPrompt);
    }

    let description = form.description().trim();
    if !bounded(description, DESCRIPTION_MAX_CHARS) {
        return Err(ValidationError::Description);
    }

    let rewards = form.rewards();
    if !(MIN_REWARDS..=MAX_REWARDS).contains(&rewards.len()) {
        return Err(ValidationError::RewardCount);
    }

    debug!(rewards = rewards.len(), frequency = form.frequency().as_str(), "form passed validation");

    Ok(TaskSubmission {
        title: title.to_string(),
        description: description.to_string(),
        frequency: form.frequency(),
        cover_prompt: cover_prompt.to_string(),
        xp_rewards: rewards.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::XpReward;

    fn filled() -> TaskForm {
        let mut f = TaskForm::new();
        f.set_title("Morning Run");
        f.set_cover_prompt("Sunrise trail");
        f.set_description("Run 3km before 8am");
        f
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let mut f = filled();
        f.set_title("  Morning Run  ");
        f.set_description("\tRun 3km before 8am\n");
        f.set_cover_prompt(" Sunrise trail ");
        let s = validate(&f).unwrap();
        assert_eq!(s.title(), "Morning Run");
        assert_eq!(s.description(), "Run 3km before 8am");
        assert_eq!(s.cover_prompt(), "Sunrise trail");
        assert_eq!(s.xp_rewards(), &[XpReward::default()]);
    }

    #[test]
    fn test_title_rules() {
        for bad in ["", "   ", "\n\t"] {
            let mut f = filled();
            f.set_title(bad);
            assert_eq!(validate(&f), Err(ValidationError::Title));
        }

        let mut f = filled();
        f.title = "x".repeat(81);
        assert_eq!(validate(&f), Err(ValidationError::Title));

        f.title = "x".repeat(80);
        assert!(validate(&f).is_ok());

        // padding that trims away does not count against the limit
        f.title = format!("  {}  ", "x".repeat(80));
        assert!(validate(&f).is_ok());
    }

    #[test]
    fn test_title_limit_counts_chars_not_bytes() {
        let mut f = filled();
        f.title = "é".repeat(80);
        assert!(validate(&f).is_ok());
    }

    #[test]
    fn test_description_rules() {
        let mut f = filled();
        f.set_description("   ");
        assert_eq!(validate(&f), Err(ValidationError::Description));

        f.description = "d".repeat(221);
        assert_eq!(validate(&f), Err(ValidationError::Description));

        f.description = "d".repeat(220);
        assert!(validate(&f).is_ok());
    }

    #[test]
    fn test_cover_prompt_required() {
        let mut f = filled();
        f.set_cover_prompt("  ");
        assert_eq!(validate(&f), Err(ValidationError::CoverPrompt));
    }

    #[test]
    fn test_reward_count_rules() {
        let mut f = filled();
        f.rewards.clear();
        assert_eq!(validate(&f), Err(ValidationError::RewardCount));

        f.rewards = vec![XpReward::default(); 4];
        assert_eq!(validate(&f), Err(ValidationError::RewardCount));

        f.rewards = vec![XpReward::default(); 3];
        assert!(validate(&f).is_ok());
    }

    #[test]
    fn test_rule_order_first_failure_wins() {
        let mut f = TaskForm::new();
        f.rewards.clear();
        assert_eq!(validate(&f), Err(ValidationError::Title));

        f.set_title("ok");
        assert_eq!(validate(&f), Err(ValidationError::CoverPrompt));

        f.set_cover_prompt("ok");
        assert_eq!(validate(&f), Err(ValidationError::Description));

        f.set_description("ok");
        assert_eq!(validate(&f), Err(ValidationError::RewardCount));
    }

    #[test]
    fn test_reward_contents_not_rechecked() {
        let mut f = filled();
        f.update_reward(0, crate::form::RewardField::Column, "not_a_column");
        f.update_reward(0, crate::form::RewardField::Xp, "9999");
        let s = validate(&f).unwrap();
        assert_eq!(s.xp_rewards()[0].column.as_str(), "not_a_column");
        assert_eq!(s.xp_rewards()[0].xp, 9999);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::Title.to_string(),
            "Title is required and must be <= 80 characters."
        );
        assert_eq!(ValidationError::RewardCount.to_string(), "You must have 1–3 XP rewards.");
    }
}
