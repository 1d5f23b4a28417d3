use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub timezone: String,
    /// Where the bearer token is kept between runs.
    pub state_path: String,
    pub log_file: String,
    pub log_level: String,
    /// Publish `accounts:update` on this interval; disabled when unset.
    pub refresh_interval_secs: Option<u64>,
    /// Pull distance credited per terminal row dragged.
    pub pull_row_units: f32,
    /// Overrides the stored access token.
    pub token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            timezone: "UTC".to_string(),
            state_path: "config/tui_state.json".to_string(),
            log_file: "finance_tui.log".to_string(),
            log_level: "info".to_string(),
            refresh_interval_secs: None,
            pull_row_units: 16.0,
            token: None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "finance_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8000/).
    #[arg(long)]
    base_url: Option<String>,
    /// Override timezone used for dates (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override the local state file holding the access token.
    #[arg(long)]
    state_path: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FINANCE_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok(settings)
}
