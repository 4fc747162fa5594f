//! Runtime configuration.
//!
//! Everything comes from environment variables, optionally seeded from a
//! `.env` file by the binary:
//!
//! - `EMAIL`, `PASSWORD` (required): login identity
//! - `SUNVOY_BASE_URL`: site root
//! - `SUNVOY_SESSION_FILE`: where the session cookie is kept between runs
//! - `SUNVOY_OUTPUT_FILE`: where the extracted users are written
//! - `SUNVOY_RENDERER`: `chromium` or `http`
//! - `SUNVOY_CHROME_PATH`: Chromium executable, auto-detected when unset
//! - `SUNVOY_RENDER_TIMEOUT_SECS`: bounded wait for scraped pages
//! - `SUNVOY_LOG_FILE`: optional log file in addition to stderr

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::auth::Identity;

/// Application name used for the session directory
const APP_NAME: &str = "sunvoy";

const DEFAULT_BASE_URL: &str = "https://challenge.sunvoy.com";

/// Session file name in the session directory
const SESSION_FILE: &str = "session.json";

const DEFAULT_OUTPUT_FILE: &str = "users.json";

/// Default bound on a scraped page render, in seconds
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Headless Chromium; runs page scripts
    Chromium,
    /// Plain HTTP fetch; server-rendered markup only
    Http,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown renderer {:?} (expected chromium or http)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub identity: Identity,
    pub base_url: Url,
    pub session_file: PathBuf,
    pub output_file: PathBuf,
    pub renderer: RendererKind,
    pub chrome_path: Option<PathBuf>,
    pub render_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let username = get("EMAIL").ok_or(ConfigError::Missing("EMAIL"))?;
        let password = get("PASSWORD").ok_or(ConfigError::Missing("PASSWORD"))?;

        let base_url = get("SUNVOY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: "SUNVOY_BASE_URL",
            reason: e.to_string(),
        })?;

        let renderer = match get("SUNVOY_RENDERER") {
            Some(value) => value.parse::<RendererKind>().map_err(|reason| ConfigError::Invalid {
                name: "SUNVOY_RENDERER",
                reason,
            })?,
            None => RendererKind::Chromium,
        };

        let render_timeout = match get("SUNVOY_RENDER_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "SUNVOY_RENDER_TIMEOUT_SECS",
                    reason: format!("{:?} is not a whole number of seconds", value),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
        };

        Ok(Self {
            identity: Identity::new(username, password),
            base_url,
            session_file: get("SUNVOY_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_session_file),
            output_file: get("SUNVOY_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            renderer,
            chrome_path: get("SUNVOY_CHROME_PATH").map(PathBuf::from),
            render_timeout,
            log_file: get("SUNVOY_LOG_FILE").map(PathBuf::from),
        })
    }
}

/// `<cache dir>/sunvoy/session.json`, or `./sessions/session.json` when the
/// platform has no cache directory
fn default_session_file() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("./sessions"))
        .join(SESSION_FILE)
}
