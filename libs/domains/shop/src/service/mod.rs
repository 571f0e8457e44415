//! Business logic over the repositories

mod customers;
mod orders;
mod products;

pub use customers::CustomerService;
pub use orders::OrderService;
pub use products::ProductService;

use strum::{Display, EnumString};

/// How the order workflow treats stock when a request fails part-way and
/// when an order changes status.
///
/// - `Strict` validates every line before moving any stock, applies only net
///   per-product changes, rolls back on failure, and releases or re-reserves
///   stock when an order enters or leaves `cancelled`.
/// - `Legacy` reserves line by line and stops at the first failure, leaving
///   earlier reservations applied. Status changes never move stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConsistencyMode {
    #[default]
    Strict,
    Legacy,
}
