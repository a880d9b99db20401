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

use crate::domain::models::product::{NewProduct, Product, ProductChanges};
use crate::domain::services::product_service::ProductService;
use crate::error::ApiError;
use crate::server::AppState;
use crate::utils::decimal::{from_f64, to_f64};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    #[schema(example = "Camiseta Básica")]
    pub name: String,
    #[schema(example = "Vestuário")]
    pub category: String,
    pub description: String,
    /// 货币字段以普通数值输出
    #[schema(example = 49.9)]
    pub price: f64,
    #[schema(example = 100)]
    pub quantity_stock: u32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            description: product.description,
            price: to_f64(product.price),
            quantity_stock: product.quantity_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Camiseta Básica")]
    pub name: String,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    #[schema(example = "Vestuário")]
    pub category: String,
    #[schema(example = "Camiseta 100% algodão, disponível em várias cores")]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    #[schema(example = 49.9)]
    pub price: f64,
    #[schema(example = 100)]
    pub quantity_stock: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    pub quantity_stock: Option<u32>,
}

/// 列出商品
#[utoipa::path(
    get,
    path = "/product",
    tag = "Products",
    responses(
        (status = 200, description = "Lista de produtos", body = [ProductResponse])
    ),
    security(("api_key" = []))
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let service = ProductService::new(state.products.clone());

    let products = service.find_all().await?;

    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// 按 ID 查询商品
#[utoipa::path(
    get,
    path = "/product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID único do produto")),
    responses(
        (status = 200, description = "Produto encontrado", body = ProductResponse),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_key" = []))
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let service = ProductService::new(state.products.clone());

    let product = service.find_one(id).await?;

    Ok(Json(ProductResponse::from(product)))
}

/// 创建商品
#[utoipa::path(
    post,
    path = "/product",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Produto criado", body = ProductResponse),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_key" = []))
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let service = ProductService::new(state.products.clone());

    let product = service
        .create(NewProduct {
            name: payload.name,
            category: payload.category,
            description: payload.description,
            price: from_f64(payload.price),
            quantity_stock: payload.quantity_stock,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// 部分更新商品
#[utoipa::path(
    patch,
    path = "/product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID único do produto")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Produto atualizado", body = ProductResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_key" = []))
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let service = ProductService::new(state.products.clone());

    let product = service
        .update(
            id,
            ProductChanges {
                name: payload.name,
                category: payload.category,
                description: payload.description,
                price: payload.price.map(from_f64),
                quantity_stock: payload.quantity_stock,
            },
        )
        .await?;

    Ok(Json(ProductResponse::from(product)))
}

/// 删除商品
#[utoipa::path(
    delete,
    path = "/product/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID único do produto")),
    responses(
        (status = 200, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_key" = []))
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    let service = ProductService::new(state.products.clone());

    service.remove(id).await?;

    Ok(())
}
