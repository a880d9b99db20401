use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::domain::models::product::{NewProduct, Product, ProductChanges};
use crate::error::ApiError;

/// 商品存储接口, 启动时绑定唯一的具体实现
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, data: NewProduct) -> Result<Product, ApiError>;

    async fn find_all(&self) -> Result<Vec<Product>, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError>;

    /// 批量查询, 未命中的 ID 直接缺席, 由调用方自行检测
    async fn find_many_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError>;

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ApiError>;

    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;

    /// 覆盖写库存, ID 不存在时失败
    async fn update_stock(&self, id: Uuid, quantity_stock: u32) -> Result<Product, ApiError>;

    /// 条件扣减, 下限由存储层保证; 库存不足或 ID 不存在时返回 Ok(false) 且不写入
    async fn deduct_stock(&self, id: Uuid, quantity: u32) -> Result<bool, ApiError>;
}

pub struct MySqlProductRepository {
    pool: MySqlPool,
}

impl MySqlProductRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn create(&self, data: NewProduct) -> Result<Product, ApiError> {
        let product = Product::new(data);

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, description, price, quantity_stock, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, ApiError> {
        let products =
            sqlx::query_as::<_, Product>(r#"SELECT * FROM products ORDER BY created_at DESC"#)
                .fetch_all(&self.pool)
                .await?;

        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(r#"SELECT * FROM products WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn find_many_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // MySQL 没有数组绑定, 按 ID 数量展开占位符
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM products WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ApiError> {
        let mut product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))?;

        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(category) = changes.category {
            product.category = category;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(quantity_stock) = changes.quantity_stock {
            product.quantity_stock = quantity_stock;
        }
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, category = ?, description = ?, price = ?, quantity_stock = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity_stock)
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        sqlx::query(r#"DELETE FROM products WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_stock(&self, id: Uuid, quantity_stock: u32) -> Result<Product, ApiError> {
        let result =
            sqlx::query(r#"UPDATE products SET quantity_stock = ?, updated_at = ? WHERE id = ?"#)
                .bind(quantity_stock)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Product with ID {id} not found")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))
    }

    async fn deduct_stock(&self, id: Uuid, quantity: u32) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity_stock = quantity_stock - ?, updated_at = ?
            WHERE id = ? AND quantity_stock >= ?
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
