//! Decimal 与线上数值的唯一转换边界, 各实体不得自行转换

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// 存储表示 -> 线上表示, 货币字段一律以普通数值输出
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// 线上表示 -> 存储表示, 按两位小数入库
pub fn from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .unwrap_or_default()
}
