// src/config.rs
//! Service configuration read from the environment (`.env` is loaded by the
//! binaries before this runs).

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context};

// --- env defaults & names ---
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_KNOWLEDGE_PATH: &str = "config/knowledge.toml";

pub const ENV_BIND_ADDR: &str = "SUPPORT_BIND_ADDR";
pub const ENV_KNOWLEDGE_PATH: &str = "SUPPORT_KNOWLEDGE_PATH";
pub const ENV_HOT_RELOAD: &str = "SUPPORT_HOT_RELOAD";
pub const ENV_LOG_FORMAT: &str = "SUPPORT_LOG_FORMAT";
pub const ENV_METRICS: &str = "SUPPORT_METRICS";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub knowledge_path: PathBuf,
    pub hot_reload: bool,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            knowledge_path: PathBuf::from(DEFAULT_KNOWLEDGE_PATH),
            hot_reload: false,
            log_format: LogFormat::Compact,
            metrics_enabled: false,
        }
    }
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary variable source (tests pass a map).
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = non_empty(var(ENV_BIND_ADDR)) {
            cfg.bind_addr = raw
                .parse()
                .with_context(|| format!("invalid {ENV_BIND_ADDR} `{raw}`"))?;
        }
        if let Some(raw) = non_empty(var(ENV_KNOWLEDGE_PATH)) {
            cfg.knowledge_path = PathBuf::from(raw);
        }
        if let Some(raw) = non_empty(var(ENV_LOG_FORMAT)) {
            cfg.log_format = raw.parse()?;
        }
        cfg.hot_reload = flag(var(ENV_HOT_RELOAD));
        cfg.metrics_enabled = flag(var(ENV_METRICS));

        Ok(cfg)
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn flag(raw: Option<String>) -> bool {
    matches!(
        raw.unwrap_or_default().trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
