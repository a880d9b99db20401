use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// 订单状态, 线上取值为 PENDENTE / CONCLUIDO / CANCELADO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pendente,
    Concluido,
    Cancelado,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Pendente => "PENDENTE",
            Self::Concluido => "CONCLUIDO",
            Self::Cancelado => "CANCELADO",
        };
        f.write_str(value)
    }
}

/// 订单主记录, 总价不落库, 每次表示时重新计算
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 订单行, price_at_purchase 在下单时快照且之后不变
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderProduct {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

/// 创建订单行的持久化入参
#[derive(Debug, Clone)]
pub struct NewOrderProduct {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price_at_purchase: Decimal,
}

/// 下单请求的单个条目 (引擎入参)
#[derive(Debug, Clone, Copy)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// 订单 + 订单行 + 派生总价的聚合视图
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub order_products: Vec<OrderProduct>,
    pub total_order: Decimal,
}
