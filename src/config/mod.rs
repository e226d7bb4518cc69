//! Configuration loading and management

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind (e.g. "127.0.0.1:3000")
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Relational store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; `None` selects the in-memory store
    pub url: Option<String>,

    /// Upper bound of pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

/// Paths the actions revalidate and navigate to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Invoice listing; create/edit/delete routes hang off it
    pub invoices: String,

    /// Where sign-out navigates
    pub home: String,

    /// Where sign-in navigates when the form names no target
    pub after_sign_in: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            invoices: "/dashboard/invoices".to_string(),
            home: "/".to_string(),
            after_sign_in: "/dashboard".to_string(),
        }
    }
}

/// A user allowed to sign in with credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: String,
    pub name: String,
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

/// Longest session lifetime accepted in configuration (one year)
pub const MAX_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 365;

/// Credentials sign-in settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime in seconds
    pub session_ttl_secs: i64,

    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 60 * 60 * 24 * 30,
            users: Vec::new(),
        }
    }
}

/// Complete application configuration
///
/// Every section is optional in YAML and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub routes: RoutesConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path.display(), e),
        })?;
        let config = serde_yaml::from_str::<Self>(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override file values with `DATABASE_URL` and `BIND_ADDR` when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with an explicit lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(addr) = lookup("BIND_ADDR").filter(|v| !v.is_empty()) {
            self.server.bind_addr = addr;
        }
        self
    }

    /// Reject values the actions cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("routes.invoices", &self.routes.invoices),
            ("routes.home", &self.routes.home),
            ("routes.after_sign_in", &self.routes.after_sign_in),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                    message: "must be an absolute path".to_string(),
                });
            }
        }

        if self.routes.invoices.len() > 1 && self.routes.invoices.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "routes.invoices".to_string(),
                value: self.routes.invoices.clone(),
                message: "must not end with '/'".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.auth.session_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.session_ttl_secs".to_string(),
                value: self.auth.session_ttl_secs.to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.auth.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "auth.session_ttl_secs".to_string(),
                value: self.auth.session_ttl_secs.to_string(),
                message: format!("must be at most {} (one year)", MAX_SESSION_TTL_SECS),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.routes.invoices, "/dashboard/invoices");
        assert_eq!(config.routes.home, "/");
        assert!(config.database.url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
server:
  bind_addr: "0.0.0.0:8080"
"#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.routes, RoutesConfig::default());
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_yaml_serialization() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = AppConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_relative_route_rejected() {
        let err = AppConfig::from_yaml_str("routes:\n  invoices: dashboard/invoices\n").unwrap_err();
        assert!(err.to_string().contains("routes.invoices"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = AppConfig::default().with_overrides(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/invoices".to_string()),
            "BIND_ADDR" => Some(String::new()),
            _ => None,
        });

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/invoices")
        );
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
    }
}
