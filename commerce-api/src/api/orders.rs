use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::order::{OrderDetail, OrderItemInput, OrderStatus};
use crate::domain::services::order_service::OrderService;
use crate::error::ApiError;
use crate::server::AppState;
use crate::utils::decimal::to_f64;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/{id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderProductRequest {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 2, minimum = 1)]
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// 订单条目列表
    #[validate(length(min = 1, message = "Order must contain at least one product"), nested)]
    pub products: Vec<OrderProductRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    #[schema(example = "CONCLUIDO")]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderProductResponse {
    pub id: Uuid,
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    #[schema(example = 2)]
    pub quantity: u32,
    /// 下单时的快照价, 以普通数值输出
    #[schema(example = 49.9)]
    pub price_at_purchase: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    #[schema(example = 149.7)]
    pub total_order: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "orderProducts")]
    pub order_products: Vec<OrderProductResponse>,
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            id: detail.order.id,
            status: detail.order.status,
            total_order: to_f64(detail.total_order),
            created_at: detail.order.created_at,
            updated_at: detail.order.updated_at,
            order_products: detail
                .order_products
                .into_iter()
                .map(|op| OrderProductResponse {
                    id: op.id,
                    order_id: op.order_id,
                    product_id: op.product_id,
                    quantity: op.quantity,
                    price_at_purchase: to_f64(op.price_at_purchase),
                })
                .collect(),
        }
    }
}

/// 列出订单 (按创建时间倒序)
#[utoipa::path(
    get,
    path = "/order",
    tag = "Orders",
    responses(
        (status = 200, description = "Lista de pedidos", body = [OrderResponse])
    ),
    security(("api_key" = []))
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let service = OrderService::new(state.orders.clone(), state.products.clone());

    let orders = service.find_all().await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// 按 ID 查询订单
#[utoipa::path(
    get,
    path = "/order/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID único do pedido")),
    responses(
        (status = 200, description = "Pedido encontrado", body = OrderResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_key" = []))
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let service = OrderService::new(state.orders.clone(), state.products.clone());

    let order = service.find_one(id).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// 创建订单, 校验库存并快照价格, 不扣减库存
#[utoipa::path(
    post,
    path = "/order",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Pedido criado", body = OrderResponse),
        (status = 400, description = "Dados inválidos ou estoque insuficiente"),
        (status = 404, description = "Um ou mais produtos não foram encontrados")
    ),
    security(("api_key" = []))
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let service = OrderService::new(state.orders.clone(), state.products.clone());

    let items: Vec<OrderItemInput> = payload
        .products
        .iter()
        .map(|p| OrderItemInput {
            product_id: p.product_id,
            quantity: p.quantity,
        })
        .collect();

    let order = service.create(items).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// 更新订单状态
///
/// PENDENTE -> CONCLUIDO 扣库存; CONCLUIDO -> CANCELADO 回补库存;
/// PENDENTE -> CANCELADO 不动库存
#[utoipa::path(
    patch,
    path = "/order/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID único do pedido")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Pedido atualizado", body = OrderResponse),
        (status = 400, description = "Transição inválida ou estoque insuficiente"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_key" = []))
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let service = OrderService::new(state.orders.clone(), state.products.clone());

    let order = service.update(id, payload.status).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// 删除订单 (永久封禁, 取消是唯一的撤回路径)
#[utoipa::path(
    delete,
    path = "/order/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID único do pedido")),
    responses(
        (status = 400, description = "Operação bloqueada - use o status CANCELADO"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_key" = []))
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    let service = OrderService::new(state.orders.clone(), state.products.clone());

    service.remove(id).await?;

    Ok(())
}
