use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

/// 日志中需要脱敏的字段
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "senha",
    "token",
    "authorization",
    "api_key",
    "apikey",
    "secret",
    "credit_card",
    "cvv",
    "cpf",
    "cnpj",
];

/// 不允许出现在日志里的请求头
const EXCLUDED_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key"];

pub async fn log_request(request: Request, next: Next) -> Result<Response, StatusCode> {
    let start_time = Instant::now();
    let request_id = format!("req_{}", Uuid::new_v4().simple());

    let method = request.method().clone();
    let uri = request.uri().clone();
    let query_params = uri.query().unwrap_or("").to_string();

    // 捕获并克隆请求体
    let (parts, body) = request.into_parts();
    let bytes = buffer_body(body).await;
    let body_display = render_body(&bytes);

    tracing::info!(
        target: "request_logger",
        "→ {} {} [{}] | Query: {} | Body: {}",
        method,
        uri,
        request_id,
        query_params,
        body_display
    );

    if cfg!(debug_assertions) {
        tracing::debug!(
            target: "request_logger",
            "Headers: {:#?}",
            sanitize_headers(&parts.headers)
        );
    }

    // 重新构建请求并交给下一个处理器
    let request = Request::from_parts(parts, Body::from(bytes));
    let mut response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    // 按状态码分级记录
    let message = format!(
        "← {} {} {} - {:?} [{}]",
        method,
        uri,
        status.as_u16(),
        duration,
        request_id
    );
    if status.is_server_error() {
        tracing::error!(target: "request_logger", "{message}");
    } else if status.is_client_error() {
        tracing::warn!(target: "request_logger", "{message}");
    } else {
        tracing::info!(target: "request_logger", "{message}");
    }

    Ok(response)
}

// 辅助函数: 缓冲请求体内容
async fn buffer_body(body: Body) -> Bytes {
    axum::body::to_bytes(body, usize::MAX).await.unwrap_or_else(|err| {
        tracing::warn!("Failed to buffer request body: {}", err);
        Bytes::new()
    })
}

/// 请求体按 JSON 解析后脱敏, 非 JSON 时截断原文
fn render_body(bytes: &Bytes) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let body_str = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&body_str) {
        Ok(json) => sanitize_json(json).to_string(),
        Err(_) => {
            if body_str.chars().count() > 1024 {
                format!("{} [truncated]", body_str.chars().take(1024).collect::<String>())
            } else {
                body_str.to_string()
            }
        }
    }
}

/// 递归脱敏嵌套对象
fn sanitize_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    let lower = key.to_lowercase();
                    if SENSITIVE_FIELDS.iter().any(|field| lower.contains(field)) {
                        (key, Value::String("[REDACTED]".to_string()))
                    } else {
                        (key, sanitize_json(val))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_json).collect()),
        other => other,
    }
}

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            if EXCLUDED_HEADERS.contains(&name.as_str()) {
                (name.to_string(), "[REDACTED]".to_string())
            } else {
                (
                    name.to_string(),
                    value.to_str().unwrap_or("<non-utf8>").to_string(),
                )
            }
        })
        .collect()
}
