//! Service configuration: `config/sentify.toml` plus environment overrides.
//!
//! A missing config file is fine (all fields have defaults); a present but
//! malformed one is a startup error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/sentify.toml";
pub const ENV_CONFIG_PATH: &str = "SENTIFY_CONFIG_PATH";
pub const ENV_PORT: &str = "PORT";

fn default_port() -> u16 {
    8000
}
fn default_history_capacity() -> usize {
    2000
}
fn default_ingest_cache_ttl_secs() -> u64 {
    300
}
fn default_max_posts() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_ingest_cache_ttl_secs")]
    pub ingest_cache_ttl_secs: u64,
    #[serde(default = "default_max_posts")]
    pub default_max_posts: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            history_capacity: default_history_capacity(),
            ingest_cache_ttl_secs: default_ingest_cache_ttl_secs(),
            default_max_posts: default_max_posts(),
        }
    }
}

impl ServiceConfig {
    /// Load from `SENTIFY_CONFIG_PATH` (or the default path), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        } else {
            info!(path = %path.display(), "no config file; using defaults");
            Self::default()
        };

        if let Ok(port) = std::env::var(ENV_PORT) {
            cfg.port = port.trim().parse().context("parsing PORT")?;
        }

        Ok(cfg)
    }
}
