use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::ensure_ascend_home;

pub const DEFAULT_ENDPOINT: &str =
    "https://hfjmhunhwkijoldoqhuo.supabase.co/functions/v1/manual-task-template";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointSection,
    #[serde(default)]
    pub credentials: CredentialsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSection {
    pub url: String,

    /// Request timeout in seconds; 0 disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for EndpointSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialsSection {
    /// Sent as `x-ascend-admin-key`.
    pub admin_key: Option<String>,
    /// Backend API key, sent as `apikey` and as the bearer token.
    pub api_key: Option<String>,
}

impl fmt::Debug for CredentialsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsSection")
            .field("admin_key", &self.admin_key.as_deref().map(mask))
            .field("api_key", &self.api_key.as_deref().map(mask))
            .finish()
    }
}

/// Resolved credentials for the task endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub admin_key: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("admin_key", &mask(&self.admin_key))
            .field("api_key", &mask(&self.api_key))
            .finish()
    }
}

/// Keep the first four characters, hide the rest.
pub fn mask(secret: &str) -> String {
    let head: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{head}****")
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    /// Overlay `ASCEND_ENDPOINT`, `ASCEND_ADMIN_KEY` and `ASCEND_API_KEY`.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = non_empty(lookup("ASCEND_ENDPOINT")) {
            self.endpoint.url = url;
        }
        if let Some(key) = non_empty(lookup("ASCEND_ADMIN_KEY")) {
            self.credentials.admin_key = Some(key);
        }
        if let Some(key) = non_empty(lookup("ASCEND_API_KEY")) {
            self.credentials.api_key = Some(key);
        }
        self
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let Some(admin_key) = non_empty(self.credentials.admin_key.clone()) else {
            bail!("missing admin key; set credentials.admin_key in config.toml or ASCEND_ADMIN_KEY");
        };
        let Some(api_key) = non_empty(self.credentials.api_key.clone()) else {
            bail!("missing API key; set credentials.api_key in config.toml or ASCEND_API_KEY");
        };
        Ok(Credentials { admin_key, api_key })
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.endpoint.timeout_secs > 0).then(|| Duration::from_secs(self.endpoint.timeout_secs))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ascend_home()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Config file plus environment overrides.
pub fn load_config() -> Result<Config> {
    let cfg = read_config(&config_path()?)?;
    Ok(cfg.apply_env(|k| std::env::var(k).ok()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    println!("Next: add credentials.admin_key and credentials.api_key (or export ASCEND_ADMIN_KEY / ASCEND_API_KEY)");
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("endpoint.url          = {}", cfg.endpoint.url);
    println!("endpoint.timeout_secs = {}", cfg.endpoint.timeout_secs);
    let show = |v: &Option<String>| v.as_deref().map(mask).unwrap_or_else(|| "(not set)".to_string());
    println!("credentials.admin_key = {}", show(&cfg.credentials.admin_key));
    println!("credentials.api_key   = {}", show(&cfg.credentials.api_key));
    Ok(())
}
