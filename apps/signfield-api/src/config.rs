//! Environment configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use signfield_core::geometry::DEFAULT_DATE_FORMAT;

pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Remote rendering backend; the in-process renderer is used when unset
    pub render_backend_url: Option<String>,
    pub signed_output_dir: Option<PathBuf>,
    pub date_format: String,
    pub render_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            render_backend_url: None,
            signed_output_dir: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(p) => p.trim().parse().context("PORT must be a port number")?,
            None => defaults.port,
        };
        let render_timeout = match get("RENDER_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(
                s.trim()
                    .parse()
                    .context("RENDER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.render_timeout,
        };

        Ok(Self {
            port,
            render_backend_url: get("RENDER_BACKEND_URL"),
            signed_output_dir: get("SIGNED_OUTPUT_DIR").map(PathBuf::from),
            date_format: get("DATE_FORMAT").unwrap_or(defaults.date_format),
            render_timeout,
        })
    }
}
