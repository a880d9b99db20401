use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 商品目录实体, quantity_stock 任何已提交的变更后都 >= 0
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub quantity_stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(data: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            category: data.category,
            description: data.description,
            price: data.price,
            quantity_stock: data.quantity_stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 创建商品入参
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub quantity_stock: u32,
}

/// 部分更新入参, None 字段保持原值
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity_stock: Option<u32>,
}
