//! MongoDB implementations of the shop repositories

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Binary, Bson, Document, doc, spec::BinarySubtype, to_bson},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{EntityKind, ShopError, ShopResult};
use crate::models::{
    CreateCustomer, CreateProduct, Customer, Order, Product, UpdateCustomer, UpdateProduct,
};
use crate::repository::{CustomerRepository, OrderRepository, ProductRepository};

pub const CUSTOMERS: &str = "customers";
pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";

/// An id the way the driver stores a `Uuid` field: generic binary
fn id_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id_bson(id) }
}

fn ids_filter(ids: &[Uuid]) -> Document {
    let ids: Vec<Bson> = ids.iter().copied().map(id_bson).collect();
    doc! { "_id": { "$in": ids } }
}

fn newest_first(field: &str) -> FindOptions {
    let mut sort = Document::new();
    sort.insert(field, -1);
    FindOptions::builder().sort(sort).build()
}

fn now_bson() -> ShopResult<Bson> {
    to_bson(&Utc::now()).map_err(|e| ShopError::Internal(e.to_string()))
}

/// Add `key` to a `$set` document when the edit supplies it
fn set_field<T: Serialize>(set: &mut Document, key: &str, value: Option<&T>) -> ShopResult<()> {
    if let Some(value) = value {
        let value = to_bson(value).map_err(|e| ShopError::Internal(e.to_string()))?;
        set.insert(key, value);
    }
    Ok(())
}

fn index(keys: Document, name: &str, unique: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(unique)
                .name(name.to_string())
                .build(),
        )
        .build()
}

#[derive(Clone)]
pub struct MongoCustomerRepository {
    collection: Collection<Customer>,
}

impl MongoCustomerRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Customer>(CUSTOMERS),
        }
    }

    pub async fn init_indexes(&self) -> ShopResult<()> {
        self.collection
            .create_indexes(vec![
                index(doc! { "email": 1 }, "idx_email_unique", true),
                index(doc! { "createdAt": -1 }, "idx_created_at", false),
            ])
            .await?;
        tracing::info!("Customer indexes created");
        Ok(())
    }

    /// `$set` of the supplied fields only, so concurrent edits to other
    /// fields survive
    fn field_update(input: &UpdateCustomer) -> ShopResult<Document> {
        let mut set = Document::new();
        set_field(&mut set, "name", input.name.as_ref())?;
        set_field(&mut set, "email", input.email.as_ref())?;
        set_field(&mut set, "phone", input.phone.as_ref())?;
        set_field(&mut set, "address", input.address.as_ref())?;
        set.insert("updatedAt", now_bson()?);
        Ok(doc! { "$set": set })
    }
}

#[async_trait]
impl CustomerRepository for MongoCustomerRepository {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create(&self, input: CreateCustomer) -> ShopResult<Customer> {
        let customer = Customer::new(input);

        self.collection
            .insert_one(&customer)
            .await
            .map_err(|e| {
                ShopError::on_duplicate(e, || ShopError::DuplicateEmail(customer.email.clone()))
            })?;

        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Customer>> {
        Ok(self.collection.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> ShopResult<Vec<Customer>> {
        let cursor = self.collection.find(ids_filter(ids)).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ShopResult<Vec<Customer>> {
        let cursor = self
            .collection
            .find(doc! {})
            .with_options(newest_first("createdAt"))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateCustomer) -> ShopResult<Customer> {
        let email = input.email.clone().unwrap_or_default();
        let update = Self::field_update(&input)?;

        let customer = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ShopError::on_duplicate(e, || ShopError::DuplicateEmail(email)))?
            .ok_or(ShopError::NotFound(EntityKind::Customer, id))?;

        tracing::info!(customer_id = %id, "Customer updated");
        Ok(customer)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ShopResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> ShopResult<bool> {
        let count = self.collection.count_documents(doc! { "email": email }).await?;
        Ok(count > 0)
    }
}

#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>(PRODUCTS),
        }
    }

    pub async fn init_indexes(&self) -> ShopResult<()> {
        self.collection
            .create_indexes(vec![
                index(doc! { "name": 1 }, "idx_name_unique", true),
                index(doc! { "category": 1 }, "idx_category", false),
                index(doc! { "createdAt": -1 }, "idx_created_at", false),
            ])
            .await?;
        tracing::info!("Product indexes created");
        Ok(())
    }

    /// `$set` of the supplied fields only; stock moved by orders in the
    /// meantime is never written back
    fn field_update(input: &UpdateProduct) -> ShopResult<Document> {
        let mut set = Document::new();
        set_field(&mut set, "name", input.name.as_ref())?;
        set_field(&mut set, "description", input.description.as_ref())?;
        set_field(&mut set, "price", input.price.as_ref())?;
        set_field(&mut set, "quantity", input.quantity.as_ref())?;
        set_field(&mut set, "category", input.category.as_ref())?;
        set_field(&mut set, "imageUrl", input.image_url.as_ref())?;
        set.insert("updatedAt", now_bson()?);
        Ok(doc! { "$set": set })
    }

    /// Guarded `$inc`: a decrement only matches while enough stock remains
    fn stock_update(id: Uuid, delta: i32) -> ShopResult<(Document, Document)> {
        let mut filter = id_filter(id);
        if delta < 0 {
            filter.insert("quantity", doc! { "$gte": delta.saturating_neg() });
        }
        let update = doc! {
            "$inc": { "quantity": delta },
            "$set": { "updatedAt": now_bson()? },
        };
        Ok((filter, update))
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ShopResult<Product> {
        let product = Product::new(input);

        self.collection
            .insert_one(&product)
            .await
            .map_err(|e| {
                ShopError::on_duplicate(e, || ShopError::DuplicateName(product.name.clone()))
            })?;

        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Product>> {
        Ok(self.collection.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[Uuid]) -> ShopResult<Vec<Product>> {
        let cursor = self.collection.find(ids_filter(ids)).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ShopResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(doc! {})
            .with_options(newest_first("createdAt"))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ShopResult<Product> {
        let name = input.name.clone().unwrap_or_default();
        let update = Self::field_update(&input)?;

        let product = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ShopError::on_duplicate(e, || ShopError::DuplicateName(name)))?
            .ok_or(ShopError::NotFound(EntityKind::Product, id))?;

        tracing::info!(product_id = %id, "Product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ShopResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> ShopResult<bool> {
        let count = self.collection.count_documents(doc! { "name": name }).await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product> {
        let (filter, update) = Self::stock_update(id, delta)?;

        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;
        if let Some(product) = updated {
            tracing::debug!(product_id = %id, delta, remaining = product.quantity, "Stock adjusted");
            return Ok(product);
        }

        // The guard did not match: either the product is gone or stock is short.
        match self.get_by_id(id).await? {
            None => Err(ShopError::NotFound(EntityKind::Product, id)),
            Some(product) => Err(ShopError::InsufficientStock {
                product: product.name,
                available: product.quantity,
                requested: delta.saturating_neg(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Order>(ORDERS),
        }
    }

    pub async fn init_indexes(&self) -> ShopResult<()> {
        self.collection
            .create_indexes(vec![
                index(doc! { "customer": 1 }, "idx_customer", false),
                index(doc! { "status": 1, "orderDate": -1 }, "idx_status_date", false),
            ])
            .await?;
        tracing::info!("Order indexes created");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert(&self, order: Order) -> ShopResult<Order> {
        self.collection.insert_one(&order).await?;
        tracing::info!(order_id = %order.id, total = %order.total_amount, "Order stored");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ShopResult<Option<Order>> {
        Ok(self.collection.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ShopResult<Vec<Order>> {
        let cursor = self
            .collection
            .find(doc! {})
            .with_options(newest_first("orderDate"))
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn save(&self, mut order: Order) -> ShopResult<Order> {
        order.updated_at = Utc::now();
        let result = self.collection.replace_one(id_filter(order.id), &order).await?;
        if result.matched_count == 0 {
            return Err(ShopError::NotFound(EntityKind::Order, order.id));
        }
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ShopResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }
}
