use anyhow::{bail, Context, Result};
use ascend_core::{validate, AdminSession, RewardField, TaskForm, MAX_REWARDS};
use clap::Args;
use tracing::warn;

use crate::config::load_config;
use crate::edge::EdgeClient;

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Admin gate code
    #[arg(long, env = "ASCEND_GATE_CODE")]
    pub code: String,

    /// Task title (1-80 characters)
    #[arg(long)]
    pub title: String,

    /// Task description (1-220 characters)
    #[arg(long)]
    pub description: String,

    /// Prompt for the generated cover image
    #[arg(long)]
    pub cover_prompt: String,

    /// daily or weekly; anything else is treated as daily
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// XP reward as <column>:<xp>, repeatable up to 3 times (default: knowledge:10)
    #[arg(long = "reward", value_name = "COLUMN:XP")]
    pub rewards: Vec<String>,

    /// Validate and print the request body without sending it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

fn parse_reward(raw: &str) -> Result<(&str, &str)> {
    let Some((column, xp)) = raw.split_once(':') else {
        bail!("invalid --reward {raw:?}; expected <column>:<xp>, e.g. fitness:20");
    };
    Ok((column.trim(), xp.trim()))
}

/// Fill `form` the same way an operator would through the form controls.
pub fn fill_form(form: &mut TaskForm, args: &SubmitArgs) -> Result<()> {
    form.set_frequency(&args.frequency);
    form.set_title(&args.title);
    form.set_cover_prompt(&args.cover_prompt);
    form.set_description(&args.description);

    for (i, raw) in args.rewards.iter().enumerate() {
        let (column, xp) = parse_reward(raw)?;
        if i > 0 {
            form.add_reward();
        }
        if i >= form.rewards().len() {
            warn!(reward = %raw, max = MAX_REWARDS, "ignoring reward beyond the cap");
            continue;
        }
        form.update_reward(i, RewardField::Column, column);
        form.update_reward(i, RewardField::Xp, xp);
    }
    Ok(())
}

pub async fn run_submit(args: SubmitArgs) -> Result<()> {
    let mut session = AdminSession::new();
    if !session.attempt_unlock(&args.code) {
        bail!("{}", session.message().unwrap_or("Wrong password."));
    }

    let form = session.form_mut().context("form unavailable")?;
    fill_form(form, &args)?;

    for r in form.rewards() {
        if !r.column.is_recognized() {
            warn!(column = %r.column, "reward column is not one of the recognized life columns");
        }
    }

    if args.dry_run {
        let task = validate(form).map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("{}", serde_json::to_string_pretty(&task.to_json())?);
        return Ok(());
    }

    let cfg = load_config()?;
    let client = EdgeClient::from_config(&cfg)?;
    println!("Submitting...");
    let outcome = session.submit(&client).await;
    let message = session.message().unwrap_or_default().to_string();

    if outcome.is_created() {
        println!("{message}");
        Ok(())
    } else {
        bail!("{message}")
    }
}
