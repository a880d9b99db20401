use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::{docs, health, orders, products};
use crate::config::Config;
use crate::domain::repositories::{OrderRepository, ProductRepository};
use crate::middleware::{auth, request_logger};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// 商品/订单存储, 启动时绑定具体实现 (测试注入内存版)
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

pub fn create_app(state: AppState) -> Router {
    let app_state = Arc::new(state);

    // 业务路由, 全部经过 API Key 守卫
    let api_routes = Router::new()
        .nest("/product", products::routes())
        .nest("/order", orders::routes())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_api_key,
        ));

    // 公开路由 + 业务路由
    Router::new()
        .merge(health::routes())
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .merge(api_routes)
        .layer(middleware::from_fn(request_logger::log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(app_state)
}
