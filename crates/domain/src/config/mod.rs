mod backend;
mod downloads;
mod observability;

pub use backend::*;
pub use downloads::*;
pub use observability::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.backend.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        } else if !has_scheme(&self.backend.base_url) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.base_url".into(),
                message: "base_url must start with http:// or https://".into(),
            });
        }

        if !self.backend.default_api_prefix.is_empty()
            && !self.backend.default_api_prefix.starts_with('/')
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.default_api_prefix".into(),
                message: "prefix must be empty or start with '/'".into(),
            });
        }

        if let Some(prefix) = &self.backend.api_prefix {
            if !prefix.is_empty() && !prefix.starts_with('/') {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "backend.api_prefix".into(),
                    message: "prefix must be empty or start with '/'".into(),
                });
            }
        }

        if self.backend.request_timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "backend.request_timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        // A call timeout shorter than a single request can never succeed
        // through the queue.
        if self.backend.call_timeout_ms < self.backend.request_timeout_ms {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "backend.call_timeout_ms".into(),
                message: "call timeout is shorter than request_timeout_ms".into(),
            });
        }

        if self.downloads.dir.as_os_str().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "downloads.dir".into(),
                message: "download directory must not be empty".into(),
            });
        }

        errors
    }
}

fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
