use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `RECOMMEND__` and TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub recommend: FallbackConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_n")]
    pub default_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    #[serde(default = "default_positive_feedback_type")]
    pub positive_feedback_type: Vec<String>,
    #[serde(default)]
    pub auto_insert_user: bool,
    #[serde(default)]
    pub auto_insert_item: bool,
}

/// Names drawn from `{collaborative, item_based, user_based, latest, popular}`.
/// `Offline` is always run first and is never part of this list.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback")]
    pub fallback_recommend: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8087
}
fn default_metrics_port() -> u16 {
    9097
}
fn default_api_key() -> String {
    String::new()
}
fn default_n() -> usize {
    10
}
fn default_cache_size() -> usize {
    300
}
fn default_positive_feedback_type() -> Vec<String> {
    vec!["like".to_string(), "star".to_string(), "purchase".to_string()]
}
fn default_fallback() -> Vec<String> {
    vec![
        "collaborative".to_string(),
        "item_based".to_string(),
        "user_based".to_string(),
        "latest".to_string(),
        "popular".to_string(),
    ]
}
fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
            metrics_port: default_metrics_port(),
            api_key: default_api_key(),
            default_n: default_n(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            cache_size: default_cache_size(),
            positive_feedback_type: default_positive_feedback_type(),
            auto_insert_user: false,
            auto_insert_item: false,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            fallback_recommend: default_fallback(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            recommend: FallbackConfig::default(),
            redis: RedisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("RECOMMEND")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_five_stage_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.recommend.fallback_recommend.len(), 5);
        assert_eq!(config.server.default_n, 10);
        assert!(config.server.api_key.is_empty());
    }
}
