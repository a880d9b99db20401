use std::sync::Arc;

use uuid::Uuid;

use crate::domain::models::product::{NewProduct, Product, ProductChanges};
use crate::domain::repositories::ProductRepository;
use crate::error::ApiError;

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn create(&self, data: NewProduct) -> Result<Product, ApiError> {
        self.products.create(data).await
    }

    pub async fn find_all(&self) -> Result<Vec<Product>, ApiError> {
        self.products.find_all().await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<Product, ApiError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))
    }

    pub async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ApiError> {
        // 先确认存在
        self.find_one(id).await?;

        self.products.update(id, changes).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        self.find_one(id).await?;

        self.products.delete(id).await
    }
}
