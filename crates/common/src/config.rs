//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Top-level harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root URL of the CI server under test
    pub base_url: String,

    /// Lifecycle wait budgets
    pub wait: WaitConfig,

    /// HTTP client settings
    pub http: HttpConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".to_string(),
            wait: WaitConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Wait budgets used when a caller does not pass one explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Budget for "has it started" waits (0 = probe once, never block)
    pub start_timeout_secs: u64,

    /// Budget for "has it finished" waits; sized for real build durations
    pub finish_timeout_secs: u64,

    /// Sleep between predicate evaluations
    pub poll_interval_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            start_timeout_secs: 0,
            finish_timeout_secs: 120,
            poll_interval_secs: 1,
        }
    }
}

impl WaitConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn finish_timeout(&self) -> Duration {
        Duration::from_secs(self.finish_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,

    /// Whole-request timeout; must stay below the poll interval
    pub request_timeout_ms: u64,

    pub username: Option<String>,

    pub api_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 500,
            request_timeout_ms: 900,
            username: None,
            api_token: None,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults if it is absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".into()));
        }
        if self.wait.poll_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "wait.poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.http.connect_timeout_ms == 0 || self.http.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig("http timeouts must be non-zero".into()));
        }
        // A single slow request must not eat a whole poll interval.
        if self.http.request_timeout() >= self.wait.poll_interval() {
            return Err(Error::InvalidConfig(format!(
                "http.request_timeout_ms ({}) must be shorter than the poll interval ({}s)",
                self.http.request_timeout_ms, self.wait.poll_interval_secs
            )));
        }
        if self.http.api_token.is_some() && self.http.username.is_none() {
            return Err(Error::InvalidConfig(
                "http.api_token requires http.username".into(),
            ));
        }
        Ok(())
    }
}
