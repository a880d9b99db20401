use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use commerce_api::config::{AuthConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig};
use commerce_api::domain::models::product::{NewProduct, Product};
use commerce_api::domain::repositories::{
    InMemoryOrderRepository, InMemoryProductRepository, ProductRepository,
};
use commerce_api::server::{AppState, create_app};

const API_KEY: &str = "test-api-key";

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "mysql://localhost:3306/unused".to_string(),
            max_connections: 1,
            idle_timeout: 60,
        },
        auth: AuthConfig {
            api_key: Some(API_KEY.to_string()),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

fn app_with(products: Arc<InMemoryProductRepository>) -> Router {
    create_app(AppState {
        config: test_config(),
        products,
        orders: Arc::new(InMemoryOrderRepository::new()),
    })
}

async fn seeded_app() -> (Router, Product) {
    let products = Arc::new(InMemoryProductRepository::new());
    let product = products
        .create(NewProduct {
            name: "Test Product".to_string(),
            category: "Electronics".to_string(),
            description: "A test product".to_string(),
            price: Decimal::new(9999, 2),
            quantity_stock: 50,
        })
        .await
        .unwrap();

    (app_with(products), product)
}

fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request.header("x-api-key", API_KEY)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_route_is_public() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Hello World!");
}

#[tokio::test]
async fn openapi_document_is_public() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["openapi"].as_str().unwrap().starts_with('3'));
    assert!(body["paths"]["/order/{id}"].is_object());
}

#[tokio::test]
async fn missing_api_key_is_rejected() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/product")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["details"], "Authentication error: API key is required");
}

#[tokio::test]
async fn invalid_api_key_is_rejected() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/product")
                .header("x-api-key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_scheme_is_accepted() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/product")
                .header(header::AUTHORIZATION, format!("Bearer {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert!(request_id.to_str().unwrap().starts_with("req_"));
}

#[tokio::test]
async fn create_order_returns_wire_shape() {
    let (app, product) = seeded_app().await;

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/order"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "products": [{ "productId": product.id, "quantity": 2 }] })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    assert_eq!(body["status"], "PENDENTE");
    assert_eq!(body["total_order"].as_f64().unwrap(), 199.98);
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());

    let line = &body["orderProducts"][0];
    assert_eq!(line["productId"], product.id.to_string());
    assert_eq!(line["orderId"], body["id"]);
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["price_at_purchase"].as_f64().unwrap(), 99.99);
}

#[tokio::test]
async fn create_order_with_unknown_product_returns_404() {
    let (app, _) = seeded_app().await;
    let missing = Uuid::new_v4();

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/order"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "products": [{ "productId": missing, "quantity": 1 }] }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(
        body["error"]["details"]
            .as_str()
            .unwrap()
            .contains(&missing.to_string())
    );
}

#[tokio::test]
async fn create_order_with_insufficient_stock_returns_400() {
    let (app, product) = seeded_app().await;

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/order"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "products": [{ "productId": product.id, "quantity": 51 }] })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let details = body["error"]["details"].as_str().unwrap();
    assert!(details.contains("Test Product"));
    assert!(details.contains("Available: 50"));
    assert!(details.contains("Requested: 51"));
}

#[tokio::test]
async fn create_order_with_zero_quantity_is_rejected() {
    let (app, product) = seeded_app().await;

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/order"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "products": [{ "productId": product.id, "quantity": 0 }] })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completing_and_cancelling_order_moves_stock() {
    let (app, product) = seeded_app().await;

    let created = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/order"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "products": [{ "productId": product.id, "quantity": 2 }] })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let order_id = body_json(created).await["id"].as_str().unwrap().to_string();

    // 完成单扣库存
    let completed = app
        .clone()
        .oneshot(
            authed(Request::builder().method("PATCH").uri(format!("/order/{order_id}")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "CONCLUIDO" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(completed.status(), StatusCode::OK);
    assert_eq!(body_json(completed).await["status"], "CONCLUIDO");

    let fetched = app
        .clone()
        .oneshot(
            authed(Request::builder().uri(format!("/product/{}", product.id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(fetched).await["quantity_stock"], 48);

    // 取消已完成单回补库存
    let cancelled = app
        .clone()
        .oneshot(
            authed(Request::builder().method("PATCH").uri(format!("/order/{order_id}")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "CANCELADO" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(cancelled).await["status"], "CANCELADO");

    let fetched = app
        .oneshot(
            authed(Request::builder().uri(format!("/product/{}", product.id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(fetched).await["quantity_stock"], 50);
}

#[tokio::test]
async fn delete_order_is_blocked_with_400() {
    let (app, product) = seeded_app().await;

    let created = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/order"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "products": [{ "productId": product.id, "quantity": 1 }] })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let order_id = body_json(created).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            authed(Request::builder().method("DELETE").uri(format!("/order/{order_id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"]["details"],
        "Order deletion is not allowed. Use cancel status instead."
    );
}

#[tokio::test]
async fn delete_unknown_order_returns_404() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(
            authed(Request::builder().method("DELETE").uri(format!("/order/{}", Uuid::new_v4())))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_unknown_order_returns_404() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(
            authed(Request::builder().uri(format!("/order/{}", Uuid::new_v4())))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_crud_round_trip() {
    let (app, _) = seeded_app().await;

    let created = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/product"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Camiseta Básica",
                        "category": "Vestuário",
                        "description": "Camiseta 100% algodão",
                        "price": 49.9,
                        "quantity_stock": 100
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await;
    assert_eq!(created["price"].as_f64().unwrap(), 49.9);
    let id = created["id"].as_str().unwrap().to_string();

    let updated = app
        .clone()
        .oneshot(
            authed(Request::builder().method("PATCH").uri(format!("/product/{id}")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "price": 59.9 }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await;
    assert_eq!(updated["price"].as_f64().unwrap(), 59.9);
    assert_eq!(updated["name"], "Camiseta Básica");

    let deleted = app
        .clone()
        .oneshot(
            authed(Request::builder().method("DELETE").uri(format!("/product/{id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = app
        .oneshot(
            authed(Request::builder().uri(format!("/product/{id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
