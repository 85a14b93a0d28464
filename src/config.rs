//! Keysentry configuration management
//!
//! Configuration is layered: built-in defaults, then an optional YAML
//! config file, then environment overrides for credentials.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable consulted for the backend API key when the
/// config file leaves it empty.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main keysentry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysentryConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Analysis backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Audit log configuration
    #[serde(default)]
    pub audit_log: AuditLogConfig,
}

impl KeysentryConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from an optional file path, then apply
    /// environment overrides. A missing path yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                Self::from_yaml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Fill in credentials from the environment when the file left them empty.
    fn apply_env(&mut self) {
        if self.backend.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.backend.api_key = key;
            }
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Analysis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API key for the reasoning backend. Empty disables the primary
    /// classifier and the engine runs fallback-only.
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Base URL of the Generative Language API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLogConfig {
    /// Path of the analysis log file
    pub path: PathBuf,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("keylogger_analysis.txt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeysentryConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.backend.model, "gemini-1.5-flash");
        assert!(config.backend.api_key.is_empty());
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.audit_log.path, PathBuf::from("keylogger_analysis.txt"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  port: 8080
backend:
  model: gemini-1.5-pro
"#;
        let config = KeysentryConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backend.model, "gemini-1.5-pro");
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = KeysentryConfig::from_yaml("server: [not a map").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    // Single test for both env cases: the variable is process-global, so
    // splitting these would race under the parallel test runner.
    #[test]
    fn test_env_var_only_fills_empty_api_key() {
        std::env::set_var(API_KEY_ENV, "env-key");

        let config = KeysentryConfig::load(None).unwrap();
        assert_eq!(config.backend.api_key, "env-key");

        let mut config = KeysentryConfig::default();
        config.backend.api_key = "file-key".to_string();
        config.apply_env();
        assert_eq!(config.backend.api_key, "file-key");

        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    fn test_audit_log_path_override() {
        let yaml = "audit_log:\n  path: /var/log/keysentry/analysis.txt\n";
        let config = KeysentryConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.audit_log.path,
            PathBuf::from("/var/log/keysentry/analysis.txt")
        );
    }
}
