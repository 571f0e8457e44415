//! Entities and DTOs

mod customer;
mod order;
mod product;

pub use customer::{CreateCustomer, Customer, UpdateCustomer};
pub use order::{
    AmendOrder, CustomerSummary, Order, OrderDetails, OrderLine, OrderLineInput, OrderLineView,
    OrderStatus, PlaceOrder, ProductSummary, quantities_by_product, total_of,
};
pub use product::{CreateProduct, Product, UpdateProduct};
