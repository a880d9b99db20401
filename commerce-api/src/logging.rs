use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

use crate::config::Config;
use crate::error::ApiError;

pub fn init_logging(config: &Config) -> Result<(), ApiError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let formatting_layer = match config.logging.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().pretty().boxed(),
    };

    registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
        .map_err(|e| ApiError::Internal(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
