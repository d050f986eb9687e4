//! Layered application configuration.
//!
//! Sources, lowest to highest priority: built-in defaults, YAML file,
//! `APP__*` environment variables (`__` separates nesting levels), CLI flags.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use profiles::ProfilesConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "APP__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Hard cap on request bodies. Defaults to the profile form cap derived
    /// from `profiles.validation.max_avatar_size_mb`.
    #[serde(default)]
    pub body_limit_bytes: Option<usize>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Serve files of the local storage backend under `/media`.
    #[serde(default)]
    pub serve_media: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            body_limit_bytes: None,
            request_timeout_secs: default_request_timeout_secs(),
            serve_media: false,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8087".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    /// # Errors
    /// Returns an error when `bind_addr` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_addr))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `profiles=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_dsn")]
    pub dsn: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: default_dsn(),
            max_connections: default_max_connections(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_dsn() -> String {
    "sqlite://profiles.db?mode=rwc".to_owned()
}

fn default_max_connections() -> u32 {
    10
}

fn default_run_migrations() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from the optional YAML file and the environment.
    ///
    /// # Errors
    /// Fails when the file is missing or malformed, or when a value has the
    /// wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .context("failed to parse configuration (yaml/env)")
    }

    /// Replace the port of `server.bind_addr`.
    ///
    /// # Errors
    /// Returns an error when the current bind address cannot be parsed.
    pub fn apply_port_override(&mut self, port: u16) -> Result<()> {
        let mut addr = self.server.socket_addr()?;
        addr.set_port(port);
        self.server.bind_addr = addr.to_string();
        Ok(())
    }

    /// Body limit applied by the HTTP host.
    #[must_use]
    pub fn body_limit_bytes(&self) -> usize {
        self.server
            .body_limit_bytes
            .unwrap_or_else(|| self.profiles.validation.max_request_body_bytes())
    }

    /// Effective configuration as YAML with secrets redacted.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use profiles::config::ObjectStorageConfig;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg.server.bind_addr, "127.0.0.1:8087");
            assert_eq!(cfg.logging.format, LogFormat::Pretty);
            assert!(cfg.database.run_migrations);
            assert!(cfg.profiles.jwt.secret_key_access.is_none());
            Ok(())
        });
    }

    #[test]
    fn yaml_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
server:
  bind_addr: "0.0.0.0:9000"
logging:
  level: debug
  format: json
profiles:
  jwt:
    secret_key_access: from-yaml
  storage:
    backend: s3
    endpoint_url: "http://minio:9000"
    bucket: theater-storage
    access_key: minioadmin
    secret_key: minioadmin
"#,
            )?;
            jail.set_env("APP__SERVER__BIND_ADDR", "0.0.0.0:9100");
            jail.set_env("APP__PROFILES__JWT__SECRET_KEY_ACCESS", "from-env");

            let cfg = AppConfig::load(Some(Path::new("config.yaml"))).unwrap();
            assert_eq!(cfg.server.bind_addr, "0.0.0.0:9100");
            assert_eq!(cfg.logging.level, "debug");
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(
                cfg.profiles.jwt.secret_key_access.unwrap().expose(),
                "from-env"
            );
            assert!(matches!(cfg.profiles.storage, ObjectStorageConfig::S3(_)));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "server:\n  bind: x\n")?;
            assert!(AppConfig::load(Some(Path::new("config.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn port_override_keeps_host() {
        let mut cfg = AppConfig::default();
        cfg.apply_port_override(9999).unwrap();
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:9999");
    }

    #[test]
    fn body_limit_follows_avatar_limit_unless_set() {
        let mut cfg = AppConfig::default();
        assert_eq!(cfg.body_limit_bytes(), 3 * 1024 * 1024);

        cfg.profiles.validation.max_avatar_size_mb = 4;
        assert_eq!(cfg.body_limit_bytes(), 9 * 1024 * 1024);

        cfg.server.body_limit_bytes = Some(1024);
        assert_eq!(cfg.body_limit_bytes(), 1024);
    }

    #[test]
    fn yaml_dump_redacts_secrets() {
        let mut cfg = AppConfig::default();
        cfg.profiles.jwt.secret_key_access = Some(profiles::config::SecretString::new("hunter2"));
        let yaml = cfg.to_yaml().unwrap();
        assert!(yaml.contains("***REDACTED***"));
        assert!(!yaml.contains("hunter2"));
    }
}
