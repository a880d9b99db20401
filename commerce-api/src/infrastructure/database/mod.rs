use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use crate::config::Config;
use crate::error::ApiError;

pub async fn init_mysql(config: &Config) -> Result<MySqlPool, ApiError> {
    tracing::info!("Initializing MySQL connection pool");

    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .idle_timeout(Duration::from_secs(config.database.idle_timeout))
        .connect(&config.database.url)
        .await?;

    // 运行迁移
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
