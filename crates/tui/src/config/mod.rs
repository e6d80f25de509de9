use std::{path::PathBuf, time::Duration};

use admin_core::{GatewayConfig, LiveConfig};
use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/admin.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub state_path: String,
    pub export_dir: String,
    pub log_file: String,
    pub log_level: String,
    pub toast_ttl_ms: u64,
    pub auto_refresh_secs: u64,
    pub live_reconnect_attempts: u32,
    pub username: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: admin_core::gateway::DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            state_path: "config/admin_state.json".to_string(),
            export_dir: "exports".to_string(),
            log_file: "logs/bingo_admin.log".to_string(),
            log_level: "info".to_string(),
            toast_ttl_ms: 3_000,
            auto_refresh_secs: 10,
            live_reconnect_attempts: 5,
            username: String::new(),
        }
    }
}

impl AppConfig {
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn live(&self) -> LiveConfig {
        LiveConfig {
            base_url: self.base_url.clone(),
            reconnect_attempts: self.live_reconnect_attempts,
            ..LiveConfig::default()
        }
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    pub fn auto_refresh(&self) -> Duration {
        Duration::from_secs(self.auto_refresh_secs.max(1))
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }
}

#[derive(Debug, Parser)]
#[command(name = "bingo-admin", about = "Back-office console for the bingo platform")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://localhost:5000).
    #[arg(long)]
    base_url: Option<String>,
    /// Prefill the login username (password is never read from CLI).
    #[arg(long)]
    username: Option<String>,
    /// Override the file holding the session token.
    #[arg(long)]
    state_path: Option<String>,
    /// Override the report export directory.
    #[arg(long)]
    export_dir: Option<String>,
    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("BINGO_ADMIN"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(state_path) = args.state_path {
        settings.state_path = state_path;
    }
    if let Some(export_dir) = args.export_dir {
        settings.export_dir = export_dir;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok(settings)
}
