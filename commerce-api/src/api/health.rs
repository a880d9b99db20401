use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health))
}

/// 健康检查 (公开路由)
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "API está funcionando", body = String)
    )
)]
pub async fn health() -> &'static str {
    "Hello World!"
}
