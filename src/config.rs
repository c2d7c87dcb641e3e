use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub shopping: ShoppingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShoppingConfig {
    /// Upper bound for one call to the semantic merge collaborator.
    #[serde(default = "default_semantic_merge_timeout_ms")]
    pub semantic_merge_timeout_ms: u64,
}

impl Default for ShoppingConfig {
    fn default() -> Self {
        Self {
            semantic_merge_timeout_ms: default_semantic_merge_timeout_ms(),
        }
    }
}

impl ShoppingConfig {
    pub fn semantic_merge_timeout(&self) -> Duration {
        Duration::from_millis(self.semantic_merge_timeout_ms)
    }
}

fn default_semantic_merge_timeout_ms() -> u64 {
    5000
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (VORRAT__DATABASE__URL, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("database.url", "sqlite:vorrat.db")?
            .set_default("database.max_connections", 5)?
            .set_default("observability.log_level", "info")?
            .set_default("shopping.semantic_merge_timeout_ms", 5000)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // The file is optional, defaults and env are enough to run.
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("VORRAT")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.shopping.semantic_merge_timeout_ms == 0 {
            return Err("Shopping semantic_merge_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_connections: u32, timeout_ms: u64) -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite:test.db".to_string(),
                max_connections,
            },
            observability: ObservabilityConfig::default(),
            shopping: ShoppingConfig {
                semantic_merge_timeout_ms: timeout_ms,
            },
        }
    }

    #[test]
    fn test_validation_zero_connections() {
        assert!(config(0, 5000).validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        assert!(config(5, 0).validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config(5, 5000).validate().is_ok());
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let dir = temp_dir::TempDir::new()?;
        let path = dir.child("vorrat.toml");
        std::fs::write(
            &path,
            "[database]\nurl = \"sqlite:other.db\"\nmax_connections = 2\n\n[shopping]\nsemantic_merge_timeout_ms = 250\n",
        )?;

        let config = Config::load(Some(path.to_string_lossy().into_owned()))?;

        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(
            config.shopping.semantic_merge_timeout(),
            Duration::from_millis(250)
        );

        Ok(())
    }
}
