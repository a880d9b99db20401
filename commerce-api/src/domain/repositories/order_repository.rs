use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::domain::models::order::{NewOrderProduct, Order, OrderProduct, OrderStatus};
use crate::error::ApiError;

/// 订单存储接口, 订单与订单行始终一起读写
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 原子创建订单与全部订单行
    async fn create(
        &self,
        status: OrderStatus,
        items: &[NewOrderProduct],
    ) -> Result<(Order, Vec<OrderProduct>), ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<(Order, Vec<OrderProduct>)>, ApiError>;

    /// 按创建时间倒序
    async fn find_all(&self) -> Result<Vec<(Order, Vec<OrderProduct>)>, ApiError>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ApiError>;

    /// Σ(price_at_purchase × quantity); 订单不存在或没有订单行时为 0
    async fn calculate_total(&self, id: Uuid) -> Result<Decimal, ApiError>;
}

pub struct MySqlOrderRepository {
    pool: MySqlPool,
}

impl MySqlOrderRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderProduct>, ApiError> {
        let items =
            sqlx::query_as::<_, OrderProduct>(r#"SELECT * FROM order_products WHERE order_id = ?"#)
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn create(
        &self,
        status: OrderStatus,
        items: &[NewOrderProduct],
    ) -> Result<(Order, Vec<OrderProduct>), ApiError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            status,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"INSERT INTO orders (id, status, created_at, updated_at) VALUES (?, ?, ?, ?)"#)
            .bind(order.id)
            .bind(order.status)
            .bind(order.created_at)
            .bind(order.updated_at)
            .execute(&mut *tx)
            .await?;

        let mut order_products = Vec::with_capacity(items.len());
        for item in items {
            let order_product = OrderProduct {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
            };

            sqlx::query(
                r#"
                INSERT INTO order_products (id, order_id, product_id, quantity, price_at_purchase)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(order_product.id)
            .bind(order_product.order_id)
            .bind(order_product.product_id)
            .bind(order_product.quantity)
            .bind(order_product.price_at_purchase)
            .execute(&mut *tx)
            .await?;

            order_products.push(order_product);
        }

        tx.commit().await?;

        Ok((order, order_products))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<(Order, Vec<OrderProduct>)>, ApiError> {
        let Some(order) = sqlx::query_as::<_, Order>(r#"SELECT * FROM orders WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.find_items(order.id).await?;

        Ok(Some((order, items)))
    }

    async fn find_all(&self) -> Result<Vec<(Order, Vec<OrderProduct>)>, ApiError> {
        let orders = sqlx::query_as::<_, Order>(r#"SELECT * FROM orders ORDER BY created_at DESC"#)
            .fetch_all(&self.pool)
            .await?;

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.find_items(order.id).await?;
            result.push((order, items));
        }

        Ok(result)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ApiError> {
        let result = sqlx::query(r#"UPDATE orders SET status = ?, updated_at = ? WHERE id = ?"#)
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Order with ID {id} not found")));
        }

        let order = sqlx::query_as::<_, Order>(r#"SELECT * FROM orders WHERE id = ?"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(order)
    }

    async fn calculate_total(&self, id: Uuid) -> Result<Decimal, ApiError> {
        let total: Option<Decimal> = sqlx::query_scalar(
            r#"SELECT SUM(price_at_purchase * quantity) FROM order_products WHERE order_id = ?"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
