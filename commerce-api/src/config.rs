use std::path::Path;

use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub idle_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 静态 API Key, 未配置时所有受保护路由拒绝访问
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn load() -> Result<Self, ApiError> {
        let config_path =
            dotenvy::var("CONFIG_PATH").unwrap_or_else(|_| "./commerce-api/config".to_string());

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<Self, ApiError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(
                Path::new(config_path).join("application.toml"),
            ))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        let config: Config = config.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_load_config() {
        let config = Config::load_from("config").unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
    }
}
