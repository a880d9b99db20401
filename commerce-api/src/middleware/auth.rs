use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::AppState;

/// 静态 API Key 守卫, 支持 `Bearer` / `ApiKey` / `X-API-Key` 三种携带方式
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_api_key(&request)
        .ok_or_else(|| ApiError::Auth("API key is required".to_string()))?;

    let expected = state
        .config
        .auth
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Auth("API key not configured on server".to_string()))?;

    if token != expected {
        return Err(ApiError::Auth("Invalid API key".to_string()));
    }

    Ok(next.run(request).await)
}

fn extract_api_key(request: &Request) -> Option<String> {
    let headers = request.headers();

    // Authorization 头存在时不再回退到 X-API-Key
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ").filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }
        if let Some(token) = auth_header.strip_prefix("ApiKey ").filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }
        return None;
    }

    headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}
