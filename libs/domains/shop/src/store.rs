use database::common::RetryConfig;
use database::mongodb::{self as mongo, Client, Database, MongoConfig};
use tracing::instrument;

use crate::error::ShopResult;
use crate::mongodb::{MongoCustomerRepository, MongoOrderRepository, MongoProductRepository};
use crate::service::{ConsistencyMode, CustomerService, OrderService, ProductService};

/// Connected MongoDB store.
///
/// Owns the client: build it once with [`ShopStore::open`], hand out
/// repositories or services, and call [`ShopStore::close`] on the way out.
pub struct ShopStore {
    client: Client,
    db: Database,
}

impl ShopStore {
    /// Connect with retry and make sure the collection indexes exist
    #[instrument(skip(config), fields(database = %config.database))]
    pub async fn open(config: &MongoConfig, retry: Option<RetryConfig>) -> ShopResult<Self> {
        let client = mongo::connect_from_config_with_retry(config, retry).await?;
        let store = Self::from_client(client, config.database());
        store.init_indexes().await?;
        Ok(store)
    }

    /// Wrap an already connected client without touching indexes
    pub fn from_client(client: Client, database: &str) -> Self {
        let db = client.database(database);
        Self { client, db }
    }

    pub async fn init_indexes(&self) -> ShopResult<()> {
        self.customers().init_indexes().await?;
        self.products().init_indexes().await?;
        self.orders().init_indexes().await?;
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn customers(&self) -> MongoCustomerRepository {
        MongoCustomerRepository::new(&self.db)
    }

    pub fn products(&self) -> MongoProductRepository {
        MongoProductRepository::new(&self.db)
    }

    pub fn orders(&self) -> MongoOrderRepository {
        MongoOrderRepository::new(&self.db)
    }

    pub fn customer_service(&self) -> CustomerService<MongoCustomerRepository> {
        CustomerService::new(self.customers())
    }

    pub fn product_service(&self) -> ProductService<MongoProductRepository> {
        ProductService::new(self.products())
    }

    pub fn order_service(
        &self,
        mode: ConsistencyMode,
    ) -> OrderService<MongoCustomerRepository, MongoProductRepository, MongoOrderRepository> {
        OrderService::new(self.customers(), self.products(), self.orders()).with_mode(mode)
    }

    pub async fn health(&self) -> mongo::HealthStatus {
        mongo::check_health_detailed(&self.client).await
    }

    /// Shut the client down, waiting for in-flight operations
    pub async fn close(self) {
        mongo::shutdown(self.client).await;
    }
}
