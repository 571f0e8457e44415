use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ShopResult;
use crate::models::{
    CreateCustomer, CreateProduct, Customer, Order, Product, UpdateCustomer, UpdateProduct,
};

/// Persistence for customers
///
/// Email uniqueness is enforced by the backend and reported as
/// `DuplicateEmail`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, input: CreateCustomer) -> ShopResult<Customer>;

    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Customer>>;

    /// Every customer among `ids` that still exists, in no particular order
    async fn get_many(&self, ids: &[Uuid]) -> ShopResult<Vec<Customer>>;

    /// Newest first
    async fn list(&self) -> ShopResult<Vec<Customer>>;

    async fn update(&self, id: Uuid, input: UpdateCustomer) -> ShopResult<Customer>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> ShopResult<bool>;

    async fn exists_by_email(&self, email: &str) -> ShopResult<bool>;
}

/// Persistence for the product catalog and its stock counts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: CreateProduct) -> ShopResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Product>>;

    /// Every product among `ids` that still exists, in no particular order
    async fn get_many(&self, ids: &[Uuid]) -> ShopResult<Vec<Product>>;

    /// Newest first
    async fn list(&self) -> ShopResult<Vec<Product>>;

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ShopResult<Product>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> ShopResult<bool>;

    async fn exists_by_name(&self, name: &str) -> ShopResult<bool>;

    /// Atomically add `delta` to the product's stock.
    ///
    /// Fails with `InsufficientStock` instead of taking stock below zero and
    /// with `NotFound` when the product is gone. Returns the product after
    /// the change.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product>;
}

/// Persistence for orders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: Order) -> ShopResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Order>>;

    /// Newest first
    async fn list(&self) -> ShopResult<Vec<Order>>;

    /// Replace the stored order, stamping `updated_at`. `NotFound` when it
    /// has been deleted in the meantime.
    async fn save(&self, order: Order) -> ShopResult<Order>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> ShopResult<bool>;
}
