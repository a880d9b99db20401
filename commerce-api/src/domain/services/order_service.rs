use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::models::order::{
    NewOrderProduct, OrderDetail, OrderItemInput, OrderProduct, OrderStatus,
};
use crate::domain::models::product::Product;
use crate::domain::repositories::{OrderRepository, ProductRepository};
use crate::error::ApiError;

/// 订单生命周期引擎: 下单校验, 快照定价, 状态驱动的库存核销
///
/// 状态机: PENDENTE -> CONCLUIDO 扣库存; CONCLUIDO -> CANCELADO 回补库存;
/// PENDENTE -> CANCELADO 不动库存; 表外的组合一律拒绝; 订单永不删除
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { orders, products }
    }

    pub async fn create(&self, items: Vec<OrderItemInput>) -> Result<OrderDetail, ApiError> {
        // 去重后一次性批量查询全部商品 (避免 N+1)
        let mut product_ids: Vec<Uuid> = Vec::new();
        for item in &items {
            if !product_ids.contains(&item.product_id) {
                product_ids.push(item.product_id);
            }
        }

        let products = self.products.find_many_by_ids(&product_ids).await?;
        let product_map: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

        let mut line_items = Vec::with_capacity(items.len());
        for item in &items {
            let product = product_map.get(&item.product_id).ok_or_else(|| {
                ApiError::NotFound(format!("Product with ID {} not found", item.product_id))
            })?;

            if product.quantity_stock < item.quantity {
                return Err(ApiError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity_stock,
                    requested: item.quantity,
                });
            }

            // 快照下单时刻的价格, 目录之后调价不影响已有订单
            line_items.push(NewOrderProduct {
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: product.price,
            });
        }

        // 创建订单不扣库存, 只有完成单才核销
        let (order, order_products) = self.orders.create(OrderStatus::Pendente, &line_items).await?;
        let total_order = self.orders.calculate_total(order.id).await?;

        Ok(OrderDetail {
            order,
            order_products,
            total_order,
        })
    }

    pub async fn find_all(&self) -> Result<Vec<OrderDetail>, ApiError> {
        let orders = self.orders.find_all().await?;

        let mut details = Vec::with_capacity(orders.len());
        for (order, order_products) in orders {
            let total_order = self.orders.calculate_total(order.id).await?;
            details.push(OrderDetail {
                order,
                order_products,
                total_order,
            });
        }

        Ok(details)
    }

    pub async fn find_one(&self, id: Uuid) -> Result<OrderDetail, ApiError> {
        let (order, order_products) = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Order with ID {id} not found")))?;

        let total_order = self.orders.calculate_total(id).await?;

        Ok(OrderDetail {
            order,
            order_products,
            total_order,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        new_status: Option<OrderStatus>,
    ) -> Result<OrderDetail, ApiError> {
        let current = self.find_one(id).await?;

        // 未携带状态或状态未变: 幂等读, 不产生任何写入
        let Some(status) = new_status else {
            return Ok(current);
        };
        if status == current.order.status {
            return Ok(current);
        }

        match (current.order.status, status) {
            (OrderStatus::Pendente, OrderStatus::Concluido) => {
                self.deduct_stock_for(&current.order_products).await?;
            }
            (OrderStatus::Concluido, OrderStatus::Cancelado) => {
                self.restore_stock_for(&current.order_products).await?;
            }
            (OrderStatus::Pendente, OrderStatus::Cancelado) => {}
            (from, to) => {
                return Err(ApiError::OperationNotAllowed(format!(
                    "Order status transition {from} -> {to} is not allowed"
                )));
            }
        }

        self.orders.update_status(id, status).await?;

        self.find_one(id).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        self.find_one(id).await?;

        // 订单是只追加记录, 取消是唯一的撤回路径
        Err(ApiError::OperationNotAllowed(
            "Order deletion is not allowed. Use cancel status instead.".to_string(),
        ))
    }

    /// 完成单: 先校验全部订单行, 再逐行条件扣减 (下限由存储层兜底)
    async fn deduct_stock_for(&self, order_products: &[OrderProduct]) -> Result<(), ApiError> {
        let product_ids: Vec<Uuid> = order_products.iter().map(|op| op.product_id).collect();
        let products = self.products.find_many_by_ids(&product_ids).await?;
        let product_map: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

        // 任何写入之前先校验每一行
        for op in order_products {
            let product = product_map.get(&op.product_id).ok_or_else(|| {
                ApiError::NotFound(format!("Product with ID {} not found", op.product_id))
            })?;

            if product.quantity_stock < op.quantity {
                return Err(ApiError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity_stock,
                    requested: op.quantity,
                });
            }
        }

        for op in order_products {
            let product = product_map[&op.product_id];
            let applied = self.products.deduct_stock(op.product_id, op.quantity).await?;
            if !applied {
                // 校验和写入之间被并发请求抢先扣减
                return Err(ApiError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.quantity_stock,
                    requested: op.quantity,
                });
            }
        }

        Ok(())
    }

    /// 取消已完成单: 逐行回补 (回补不会为负, 无需校验)
    async fn restore_stock_for(&self, order_products: &[OrderProduct]) -> Result<(), ApiError> {
        for op in order_products {
            let product = self.products.find_by_id(op.product_id).await?.ok_or_else(|| {
                ApiError::NotFound(format!("Product with ID {} not found", op.product_id))
            })?;

            self.products
                .update_stock(op.product_id, product.quantity_stock + op.quantity)
                .await?;
        }

        Ok(())
    }
}
