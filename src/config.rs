use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_JWT_SECRET: &str = "STOCKROOM_JWT_SECRET";
pub const ENV_DATABASE_URL: &str = "STOCKROOM_DATABASE_URL";
pub const ENV_PORT: &str = "STOCKROOM_PORT";

/// Upper bound on `auth.leeway_seconds`.
pub const MAX_LEEWAY_SECONDS: u64 = 3600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,

    /// Insert the fixed sample products and accounts into empty tables at startup.
    pub seed_sample_data: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/stockroom.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            seed_sample_data: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// `"*"` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. When absent a random one is generated per process.
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,

    /// Retired secrets still accepted when verifying tokens.
    #[serde(skip_serializing)]
    pub previous_jwt_secrets: Vec<String>,

    pub token_ttl_hours: u64,

    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            previous_jwt_secrets: Vec::new(),
            token_ttl_hours: 24,
            leeway_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Install the Prometheus recorder and expose `GET /metrics`.
    pub metrics_enabled: bool,

    pub json_logs: bool,
}

impl Config {
    /// Loads from `explicit` if given, otherwise from the first config file
    /// found on the search path, then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                info!("Loading config from: {}", path.display());
                Self::load_from_path(path)?
            }
            None => Self::load_from_search_path()?,
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_from_search_path() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_JWT_SECRET) {
            self.auth.jwt_secret = Some(secret);
        }

        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.general.database_path = url;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .parse()
                .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("stockroom").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".stockroom").join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes the default config to `path` unless a file is already there.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.auth.token_ttl_hours == 0 {
            anyhow::bail!("Token TTL must be at least one hour");
        }

        if self.auth.leeway_seconds > MAX_LEEWAY_SECONDS {
            anyhow::bail!(
                "Token leeway ({}s) must be at most {MAX_LEEWAY_SECONDS}s",
                self.auth.leeway_seconds
            );
        }

        if self.general.max_db_connections < self.general.min_db_connections {
            anyhow::bail!(
                "max_db_connections ({}) must be >= min_db_connections ({})",
                self.general.max_db_connections,
                self.general.min_db_connections
            );
        }

        if self.auth.jwt_secret.as_deref().is_some_and(str::is_empty) {
            anyhow::bail!("JWT secret cannot be empty");
        }

        if self.auth.previous_jwt_secrets.iter().any(String::is_empty) {
            anyhow::bail!("Previous JWT secrets cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_allowed_origins, vec!["*"]);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.general.seed_sample_data);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_omits_secrets() {
        let mut config = Config::default();
        config.auth.jwt_secret = Some("s3cret".into());
        config.auth.previous_jwt_secrets = vec!["old".into()];

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[auth]"));
        assert!(!toml_str.contains("s3cret"));
        assert!(!toml_str.contains("old"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            jwt_secret = "abc"
            previous_jwt_secrets = ["older"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("abc"));
        assert_eq!(config.auth.previous_jwt_secrets, vec!["older"]);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config
            .apply_overrides(|key| match key {
                ENV_JWT_SECRET => Some("from-env".into()),
                ENV_DATABASE_URL => Some("sqlite::memory:".into()),
                ENV_PORT => Some("9090".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.auth.jwt_secret.as_deref(), Some("from-env"));
        assert_eq!(config.general.database_path, "sqlite::memory:");
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == ENV_PORT).then(|| "http".into()));
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.token_ttl_hours = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.min_db_connections = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.jwt_secret = Some(String::new());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.leeway_seconds = MAX_LEEWAY_SECONDS;
        assert!(config.validate().is_ok());
        config.auth.leeway_seconds = MAX_LEEWAY_SECONDS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn create_default_if_missing_writes_once() {
        let path = std::env::temp_dir()
            .join(format!("stockroom-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        assert!(Config::create_default_if_missing(&path).unwrap());
        assert!(!Config::create_default_if_missing(&path).unwrap());

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.port, 8080);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
