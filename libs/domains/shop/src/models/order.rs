use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ShopError, ShopResult};

/// Order lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Parse a caller-supplied status string
    pub fn parse(raw: &str) -> ShopResult<Self> {
        Self::from_str(raw).map_err(|_| ShopError::InvalidStatus(raw.to_string()))
    }

    /// Completed and cancelled orders no longer accept line-item changes
    pub fn is_closed(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether the order's line quantities are decremented from stock while
    /// it sits in this status. Pending orders hold a reservation, completed
    /// orders have consumed it, cancelled orders hold nothing.
    pub fn holds_stock(self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

/// One (product, quantity, priceAtOrder) entry of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product: Uuid,
    pub quantity: i32,
    /// Catalog price captured when the line was reserved
    pub price_at_order: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.price_at_order * Decimal::from(self.quantity)
    }
}

/// Sum of `quantity × priceAtOrder` over `lines`
pub fn total_of(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::line_total).sum()
}

/// Quantity per product across `lines`
pub fn quantities_by_product(lines: &[OrderLine]) -> BTreeMap<Uuid, i32> {
    let mut quantities = BTreeMap::new();
    for line in lines {
        *quantities.entry(line.product).or_insert(0) += line.quantity;
    }
    quantities
}

/// Order entity - stored in the `orders` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub customer: Uuid,
    #[serde(rename = "products")]
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer: Uuid, lines: Vec<OrderLine>, status: OrderStatus) -> Self {
        let now = Utc::now();
        let total_amount = total_of(&lines);
        Self {
            id: Uuid::now_v7(),
            customer,
            lines,
            total_amount,
            status,
            order_date: now,
            updated_at: now,
        }
    }

    /// Swap in a new line list and recompute the total
    pub fn replace_lines(&mut self, lines: Vec<OrderLine>) {
        self.total_amount = total_of(&lines);
        self.lines = lines;
    }

    pub fn reserved_quantities(&self) -> BTreeMap<Uuid, i32> {
        quantities_by_product(&self.lines)
    }

    /// True when the stored total matches its lines
    pub fn total_is_consistent(&self) -> bool {
        self.total_amount == total_of(&self.lines)
    }
}

/// A requested (product, quantity) pair before it is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product: Uuid,
    pub quantity: i32,
}

impl OrderLineInput {
    pub fn new(product: Uuid, quantity: i32) -> Self {
        Self { product, quantity }
    }
}

/// DTO for placing an order
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlaceOrder {
    pub customer: Uuid,
    #[validate(length(
        min = 1,
        message = "Please provide customer ID and at least one product for the order"
    ))]
    pub products: Vec<OrderLineInput>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// DTO for amending an order: a status change, a full replacement of the
/// line items, or both
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmendOrder {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub products: Option<Vec<OrderLineInput>>,
}

impl AmendOrder {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            products: None,
        }
    }

    pub fn products(products: Vec<OrderLineInput>) -> Self {
        Self {
            status: None,
            products: Some(products),
        }
    }
}

/// Customer fields joined into an order for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Product fields joined into an order line for display.
///
/// `price` is today's catalog price; the billed price is the line's
/// `price_at_order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub product: Uuid,
    /// `None` when the product has since been deleted
    pub catalog: Option<ProductSummary>,
    pub quantity: i32,
    pub price_at_order: Decimal,
    pub line_total: Decimal,
}

/// Read-time projection of an order with customer and product details
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: Uuid,
    pub customer: Uuid,
    /// `None` when the customer has since been deleted
    pub customer_details: Option<CustomerSummary>,
    pub products: Vec<OrderLineView>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(product: Uuid, quantity: i32, price: Decimal) -> OrderLine {
        OrderLine {
            product,
            quantity,
            price_at_order: price,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(OrderStatus::parse("pending").unwrap(), OrderStatus::Pending);
        assert_eq!(
            OrderStatus::parse("cancelled").unwrap(),
            OrderStatus::Cancelled
        );
        assert!(matches!(
            OrderStatus::parse("shipped"),
            Err(ShopError::InvalidStatus(_))
        ));
        assert_eq!(OrderStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_status_stock_holding() {
        assert!(OrderStatus::Pending.holds_stock());
        assert!(OrderStatus::Completed.holds_stock());
        assert!(!OrderStatus::Cancelled.holds_stock());
        assert!(!OrderStatus::Pending.is_closed());
        assert!(OrderStatus::Completed.is_closed());
    }

    #[test]
    fn test_total_tracks_lines() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let mut order = Order::new(
            Uuid::now_v7(),
            vec![line(a, 3, dec!(10)), line(b, 2, dec!(2.25))],
            OrderStatus::Pending,
        );
        assert_eq!(order.total_amount, dec!(34.50));
        assert!(order.total_is_consistent());

        order.replace_lines(vec![line(a, 1, dec!(10))]);
        assert_eq!(order.total_amount, dec!(10));
        assert!(order.total_is_consistent());
    }

    #[test]
    fn test_quantities_are_aggregated_per_product() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let quantities =
            quantities_by_product(&[line(a, 1, dec!(1)), line(b, 4, dec!(1)), line(a, 2, dec!(1))]);
        assert_eq!(quantities.get(&a), Some(&3));
        assert_eq!(quantities.get(&b), Some(&4));
    }

    #[test]
    fn test_order_serializes_wire_field_names() {
        let order = Order::new(
            Uuid::now_v7(),
            vec![line(Uuid::now_v7(), 1, dec!(5))],
            OrderStatus::Pending,
        );
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("_id").is_some());
        assert!(json.get("totalAmount").is_some());
        assert!(json["products"][0].get("priceAtOrder").is_some());
        assert_eq!(json["status"], "pending");
    }
}
