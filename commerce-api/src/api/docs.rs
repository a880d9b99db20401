use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::{health, orders, products};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "E-commerce API",
        description = "API REST para gerenciamento de produtos e pedidos de e-commerce. \
            Permite operações CRUD em produtos, criação e gerenciamento de pedidos com \
            controle de estoque.\n\n**Autenticação:** Use o header \
            `Authorization: Bearer <API_KEY>` ou `X-API-Key: <API_KEY>`"
    ),
    paths(
        health::health,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
    ),
    components(schemas(
        products::ProductResponse,
        products::CreateProductRequest,
        products::UpdateProductRequest,
        orders::OrderResponse,
        orders::OrderProductResponse,
        orders::CreateOrderRequest,
        orders::OrderProductRequest,
        orders::UpdateOrderRequest,
        crate::domain::models::order::OrderStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Verificação de saúde da API (pública)"),
        (name = "Products", description = "Gerenciamento de produtos (requer autenticação)"),
        (name = "Orders", description = "Gerenciamento de pedidos (requer autenticação)"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
            );
        }
    }
}

/// OpenAPI 文档 (公开路由)
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
