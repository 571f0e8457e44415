//! In-memory repositories for development and tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EntityKind, ShopError, ShopResult};
use crate::models::{
    CreateCustomer, CreateProduct, Customer, Order, Product, UpdateCustomer, UpdateProduct,
};
use crate::repository::{CustomerRepository, OrderRepository, ProductRepository};

#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn create(&self, input: CreateCustomer) -> ShopResult<Customer> {
        let mut customers = self.customers.write().await;

        if customers.values().any(|c| c.email == input.email) {
            return Err(ShopError::DuplicateEmail(input.email));
        }

        let customer = Customer::new(input);
        customers.insert(customer.id, customer.clone());

        tracing::info!(customer_id = %customer.id, "Created customer");
        Ok(customer)
    }

    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> ShopResult<Vec<Customer>> {
        let customers = self.customers.read().await;
        Ok(ids.iter().filter_map(|id| customers.get(id).cloned()).collect())
    }

    async fn list(&self) -> ShopResult<Vec<Customer>> {
        let mut result: Vec<Customer> = self.customers.read().await.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateCustomer) -> ShopResult<Customer> {
        let mut customers = self.customers.write().await;

        if let Some(ref email) = input.email {
            if customers.values().any(|c| c.id != id && &c.email == email) {
                return Err(ShopError::DuplicateEmail(email.clone()));
            }
        }

        let customer = customers
            .get_mut(&id)
            .ok_or(ShopError::NotFound(EntityKind::Customer, id))?;
        customer.apply_update(input);

        tracing::info!(customer_id = %id, "Updated customer");
        Ok(customer.clone())
    }

    async fn delete(&self, id: Uuid) -> ShopResult<bool> {
        Ok(self.customers.write().await.remove(&id).is_some())
    }

    async fn exists_by_email(&self, email: &str) -> ShopResult<bool> {
        Ok(self.customers.read().await.values().any(|c| c.email == email))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stock of `id`, for assertions
    pub async fn stock_of(&self, id: Uuid) -> Option<i32> {
        self.products.read().await.get(&id).map(|p| p.quantity)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ShopResult<Product> {
        let mut products = self.products.write().await;

        if products.values().any(|p| p.name == input.name) {
            return Err(ShopError::DuplicateName(input.name));
        }

        let product = Product::new(input);
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> ShopResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn list(&self) -> ShopResult<Vec<Product>> {
        let mut result: Vec<Product> = self.products.read().await.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ShopResult<Product> {
        let mut products = self.products.write().await;

        if let Some(ref name) = input.name {
            if products.values().any(|p| p.id != id && &p.name == name) {
                return Err(ShopError::DuplicateName(name.clone()));
            }
        }

        let product = products
            .get_mut(&id)
            .ok_or(ShopError::NotFound(EntityKind::Product, id))?;
        product.apply_update(input);

        tracing::info!(product_id = %id, "Updated product");
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> ShopResult<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }

    async fn exists_by_name(&self, name: &str) -> ShopResult<bool> {
        Ok(self.products.read().await.values().any(|p| p.name == name))
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or(ShopError::NotFound(EntityKind::Product, id))?;

        let remaining = product
            .stock_after(delta)
            .ok_or_else(|| ShopError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: delta.saturating_neg(),
            })?;
        product.quantity = remaining;
        product.updated_at = Utc::now();

        tracing::debug!(product_id = %id, delta, remaining, "Adjusted stock");
        Ok(product.clone())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: Order) -> ShopResult<Order> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(ShopError::Conflict(format!("order {} already exists", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self) -> ShopResult<Vec<Order>> {
        let mut result: Vec<Order> = self.orders.read().await.values().cloned().collect();
        result.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(result)
    }

    async fn save(&self, mut order: Order) -> ShopResult<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id)
            .ok_or(ShopError::NotFound(EntityKind::Order, order.id))?;
        order.updated_at = Utc::now();
        *stored = order.clone();
        Ok(order)
    }

    async fn delete(&self, id: Uuid) -> ShopResult<bool> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}
