use std::sync::Arc;

use commerce_api::config::Config;
use commerce_api::domain::repositories::{MySqlOrderRepository, MySqlProductRepository};
use commerce_api::infrastructure::database::init_mysql;
use commerce_api::logging::init_logging;
use commerce_api::server::{AppState, create_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_logging(&config)?;

    tracing::info!("Starting E-commerce API");

    // 初始化数据库连接
    let db_pool = init_mysql(&config).await?;

    // 仓储在启动时绑定唯一的 MySQL 实现
    let state = AppState {
        config: config.clone(),
        products: Arc::new(MySqlProductRepository::new(db_pool.clone())),
        orders: Arc::new(MySqlOrderRepository::new(db_pool)),
    };

    let app = create_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;

    Ok(())
}
