use anyhow::{Context, Result};
use ascend_core::LifeColumn;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod admin;
mod config;
mod edge;
mod state;
mod submit_cmd;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("ASCEND_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "ascend", version = VERSION, about = "Ascend admin tools: create task templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive admin form (password gate, then the task form)
    Admin,

    /// Create a task template from flags
    Submit(submit_cmd::SubmitArgs),

    /// Manage ~/.ascend/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// List the recognized life columns for XP rewards
    Columns,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective config (secrets masked)
    Show,
    /// Print the config file path
    Path,
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ascend=info,ascend_core=info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The TUI owns the terminal, so admin sessions log to a file instead.
fn init_file_logging() -> Result<()> {
    let path = state::admin_log_path()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Admin => {
            init_file_logging()?;
            let cfg = config::load_config()?;
            let client = edge::EdgeClient::from_config(&cfg)?;
            tracing::info!(endpoint = client.url(), "starting admin form");
            admin::run_admin(&client)?;
        }

        Command::Submit(args) => {
            init_stderr_logging();
            submit_cmd::run_submit(args).await?;
        }

        Command::Config { command } => {
            init_stderr_logging();
            match command {
                ConfigCommand::Init => config::init_config()?,
                ConfigCommand::Show => config::show_config()?,
                ConfigCommand::Path => println!("{}", config::config_path()?.display()),
            }
        }

        Command::Columns => {
            for c in LifeColumn::ALL {
                println!("{:<14} {}", c.as_str(), c.label());
            }
        }
    }

    Ok(())
}
