//! Client configuration.
//!
//! Defaults point at the public tutorial backend. `from_env` lets tests and
//! tools redirect the client without code changes.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://phplaravel-574671-2962113.cloudwaysapps.com";
pub const DEFAULT_API_VERSION: &str = "v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host, optionally with a port. No trailing path.
    pub base_url: String,
    /// Version segment placed after `/api/`.
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Read `TODOS_API_BASE_URL`, `TODOS_API_VERSION` and
    /// `TODOS_API_TIMEOUT_SECS`, keeping defaults for anything unset or
    /// unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup("TODOS_API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(version) = lookup("TODOS_API_VERSION") {
            config.api_version = version;
        }
        match lookup("TODOS_API_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) => config.timeout_secs = secs,
            Some(Err(e)) => log::warn!("ignoring TODOS_API_TIMEOUT_SECS: {e}"),
            None => {}
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `{base_url}/api/{api_version}` with any trailing slash removed.
    pub fn api_root(&self) -> String {
        format!(
            "{}/api/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }
}
