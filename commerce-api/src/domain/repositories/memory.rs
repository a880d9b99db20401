//! 内存版存储实现, 与 MySQL 实现共用同一接口, 供测试与本地演示注入

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::models::order::{NewOrderProduct, Order, OrderProduct, OrderStatus};
use crate::domain::models::product::{NewProduct, Product, ProductChanges};
use crate::error::ApiError;
use crate::domain::repositories::order_repository::OrderRepository;
use crate::domain::repositories::product_repository::ProductRepository;

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, data: NewProduct) -> Result<Product, ApiError> {
        let product = Product::new(data);
        self.products
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>, ApiError> {
        let mut products: Vec<Product> = self.products.lock().unwrap().values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError> {
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn find_many_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
        let products = self.products.lock().unwrap();
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, ApiError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .get_mut(&id)
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

        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.products.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn update_stock(&self, id: Uuid, quantity_stock: u32) -> Result<Product, ApiError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))?;

        product.quantity_stock = quantity_stock;
        product.updated_at = Utc::now();

        Ok(product.clone())
    }

    async fn deduct_stock(&self, id: Uuid, quantity: u32) -> Result<bool, ApiError> {
        let mut products = self.products.lock().unwrap();
        let Some(product) = products.get_mut(&id) else {
            return Ok(false);
        };

        if product.quantity_stock < quantity {
            return Ok(false);
        }

        product.quantity_stock -= quantity;
        product.updated_at = Utc::now();

        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, (Order, Vec<OrderProduct>)>>,
    // 写入计数, 测试用来断言幂等路径没有副作用
    status_writes: AtomicUsize,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
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

        let order_products: Vec<OrderProduct> = items
            .iter()
            .map(|item| OrderProduct {
                id: Uuid::new_v4(),
                order_id: order.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
            })
            .collect();

        self.orders
            .lock()
            .unwrap()
            .insert(order.id, (order.clone(), order_products.clone()));

        Ok((order, order_products))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<(Order, Vec<OrderProduct>)>, ApiError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<(Order, Vec<OrderProduct>)>, ApiError> {
        let mut orders: Vec<(Order, Vec<OrderProduct>)> =
            self.orders.lock().unwrap().values().cloned().collect();
        orders.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        Ok(orders)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ApiError> {
        let mut orders = self.orders.lock().unwrap();
        let (order, _) = orders
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Order with ID {id} not found")))?;

        order.status = status;
        order.updated_at = Utc::now();
        self.status_writes.fetch_add(1, Ordering::SeqCst);

        Ok(order.clone())
    }

    async fn calculate_total(&self, id: Uuid) -> Result<Decimal, ApiError> {
        let orders = self.orders.lock().unwrap();
        let total = orders
            .get(&id)
            .map(|(_, items)| {
                items
                    .iter()
                    .map(|item| item.price_at_purchase * Decimal::from(item.quantity))
                    .sum()
            })
            .unwrap_or(Decimal::ZERO);

        Ok(total)
    }
}
