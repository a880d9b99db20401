pub mod memory;
pub mod order_repository;
pub mod product_repository;

pub use memory::{InMemoryOrderRepository, InMemoryProductRepository};
pub use order_repository::{MySqlOrderRepository, OrderRepository};
pub use product_repository::{MySqlProductRepository, ProductRepository};
