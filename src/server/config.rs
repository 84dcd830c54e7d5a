use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_hash_cost: u32,
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    listen_addr: Option<String>,
    jwt_secret: Option<String>,
    token_ttl_hours: Option<i64>,
    password_hash_cost: Option<u32>,
    log_dir: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://recipes.db?mode=rwc".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl ServerConfig {
    /// Loads the configuration from an optional TOML file, with environment
    /// variables (and `.env`) taking precedence over the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path.map(Path::new) {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        Self::merge(env_config, file_config)
    }

    /// Environment overrides file; missing optional values fall back to defaults.
    fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> Result<Self, String> {
        let password_hash_cost = env_config
            .password_hash_cost
            .or(file_config.password_hash_cost)
            .unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&password_hash_cost) {
            return Err(format!("PASSWORD_HASH_COST must be between 4 and 31, got {password_hash_cost}"));
        }

        let token_ttl_hours = env_config
            .token_ttl_hours
            .or(file_config.token_ttl_hours)
            .unwrap_or_else(default_token_ttl_hours);
        if token_ttl_hours <= 0 {
            return Err("TOKEN_TTL_HOURS must be positive".to_string());
        }

        Ok(ServerConfig {
            database_url: env_config.database_url.or(file_config.database_url)
                .unwrap_or_else(default_database_url),
            listen_addr: env_config.listen_addr.or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            jwt_secret: env_config.jwt_secret.or(file_config.jwt_secret)
                .filter(|secret| !secret.is_empty())
                .ok_or("JWT_SECRET is required")?,
            token_ttl_hours,
            password_hash_cost,
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }
}
