// ⚙️ Configuration - remote service location, debounce window, logging
//
// Resolution order (highest first):
// 1. Command-line flags (applied by the binaries through `apply_overrides`)
// 2. Environment variables (NUMEROLOGY_SERVICE_URL, NUMEROLOGY_DEBOUNCE_MS, NUMEROLOGY_LOG)
// 3. TOML file
// 4. Compiled defaults

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "numerology.toml";

pub const ENV_SERVICE_URL: &str = "NUMEROLOGY_SERVICE_URL";
pub const ENV_DEBOUNCE_MS: &str = "NUMEROLOGY_DEBOUNCE_MS";
pub const ENV_LOG: &str = "NUMEROLOGY_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the analysis/validation service
    pub service_url: String,

    /// Quiet window before a name edit is sent for validation
    pub debounce_ms: u64,

    pub request_timeout_secs: u64,

    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            service_url: "http://localhost:8000".to_string(),
            debounce_ms: 500,
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

/// Flag values from the command line; `None` leaves the lower layer in place
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub log_filter: Option<String>,
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Full resolution: explicit file (must exist) or `numerology.toml` if present,
    /// then environment, then flags
    pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Environment layer; `lookup` is injectable so tests don't touch the process env
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.service_url = url;
        }
        if let Some(ms) = lookup(ENV_DEBOUNCE_MS) {
            self.debounce_ms = ms
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be an integer, got {:?}", ENV_DEBOUNCE_MS, ms)))?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.service_url {
            self.service_url = url.clone();
        }
        if let Some(ms) = overrides.debounce_ms {
            self.debounce_ms = ms;
        }
        if let Some(filter) = &overrides.log_filter {
            self.log_filter = filter.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.service_url.starts_with("http://") || self.service_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "service_url must be an http(s) URL, got {:?}",
                self.service_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
