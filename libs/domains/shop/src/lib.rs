//! Shop Domain
//!
//! Customers, a product catalog with stock counts, and orders whose
//! placement, amendment, status changes and deletion keep stock and order
//! totals consistent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Adapters   │  ← CLI / HTTP, map ShopError::status_code
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← validation, order workflow, ConsistencyMode
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Reservation │  ← pure stock planning
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← traits + MongoDB and in-memory implementations
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::mongodb::MongoConfig;
//! use domain_shop::{ConsistencyMode, ShopStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "shop");
//! let store = ShopStore::open(&config, None).await?;
//!
//! let orders = store.order_service(ConsistencyMode::Strict);
//! let all = orders.list().await?;
//! println!("{} orders", all.len());
//!
//! store.close().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod reservation;
pub mod response;
pub mod service;
pub mod store;

pub use error::{EntityKind, ErrorKind, ShopError, ShopResult, parse_id};
pub use memory::{InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository};
pub use models::{
    AmendOrder, CreateCustomer, CreateProduct, Customer, Order, OrderDetails, OrderLine,
    OrderLineInput, OrderStatus, PlaceOrder, Product, UpdateCustomer, UpdateProduct,
};
pub use self::mongodb::{MongoCustomerRepository, MongoOrderRepository, MongoProductRepository};
pub use repository::{CustomerRepository, OrderRepository, ProductRepository};
pub use response::ApiResponse;
pub use service::{ConsistencyMode, CustomerService, OrderService, ProductService};
pub use store::ShopStore;
