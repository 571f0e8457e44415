//! Stock reservation planning.
//!
//! Everything here is pure: it checks requested lines against a catalog
//! snapshot and works out the per-product stock deltas, without touching
//! storage. The order service applies the deltas afterwards.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::error::{EntityKind, ShopError, ShopResult};
use crate::models::{OrderLine, OrderLineInput, Product, quantities_by_product, total_of};

/// Signed stock change per product; negative reserves, positive releases
pub type StockDeltas = BTreeMap<Uuid, i32>;

/// Catalog snapshot keyed by product id
pub type Catalog = HashMap<Uuid, Product>;

pub fn catalog_from(products: Vec<Product>) -> Catalog {
    products.into_iter().map(|p| (p.id, p)).collect()
}

/// Outcome of a successful plan
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    /// Priced lines in request order
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub deltas: StockDeltas,
}

/// Validate `requested` against `catalog` and price each line at today's
/// catalog price.
///
/// `credit` is stock the caller already holds per product (the current lines
/// of an order being amended). It counts as available to the new lines and
/// is netted out of the resulting deltas, so re-requesting what an order
/// already holds moves no stock.
///
/// Each line is checked in request order for product existence, a positive
/// quantity, then enough stock for the cumulative demand on its product.
pub fn plan(
    requested: &[OrderLineInput],
    catalog: &Catalog,
    credit: &BTreeMap<Uuid, i32>,
) -> ShopResult<Reservation> {
    let mut lines = Vec::with_capacity(requested.len());
    let mut demand: BTreeMap<Uuid, i32> = BTreeMap::new();

    for item in requested {
        let product = catalog
            .get(&item.product)
            .ok_or(ShopError::NotFound(EntityKind::Product, item.product))?;

        if item.quantity <= 0 {
            return Err(ShopError::NonPositiveQuantity {
                product: product.name.clone(),
            });
        }

        let wanted = demand.entry(product.id).or_insert(0);
        *wanted = wanted.saturating_add(item.quantity);

        let available = product
            .quantity
            .saturating_add(credit.get(&product.id).copied().unwrap_or(0));
        if *wanted > available {
            return Err(ShopError::InsufficientStock {
                product: product.name.clone(),
                available,
                requested: *wanted,
            });
        }

        lines.push(OrderLine {
            product: product.id,
            quantity: item.quantity,
            price_at_order: product.price,
        });
    }

    let mut deltas = StockDeltas::new();
    for (&product, &held) in credit {
        *deltas.entry(product).or_insert(0) += held;
    }
    for (&product, &wanted) in &demand {
        *deltas.entry(product).or_insert(0) -= wanted;
    }
    deltas.retain(|_, delta| *delta != 0);

    Ok(Reservation {
        total: total_of(&lines),
        lines,
        deltas,
    })
}

/// Deltas that hand every unit held by `lines` back to stock
pub fn release(lines: &[OrderLine]) -> StockDeltas {
    quantities_by_product(lines)
}

/// Deltas that take the units of existing `lines` out of stock again, at
/// their original prices. Fails when a product is gone or short.
pub fn reclaim(lines: &[OrderLine], catalog: &Catalog) -> ShopResult<StockDeltas> {
    let mut deltas = StockDeltas::new();
    for (product_id, wanted) in quantities_by_product(lines) {
        let product = catalog
            .get(&product_id)
            .ok_or(ShopError::NotFound(EntityKind::Product, product_id))?;
        if wanted > product.quantity {
            return Err(ShopError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: wanted,
            });
        }
        deltas.insert(product_id, -wanted);
    }
    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProduct;
    use rust_decimal_macros::dec;

    fn product(name: &str, price: Decimal, quantity: i32) -> Product {
        Product::new(CreateProduct {
            name: name.to_string(),
            description: None,
            price,
            quantity,
            category: None,
            image_url: None,
        })
    }

    fn no_credit() -> BTreeMap<Uuid, i32> {
        BTreeMap::new()
    }

    #[test]
    fn test_plan_prices_lines_and_reserves() {
        let widget = product("Widget", dec!(10), 5);
        let gadget = product("Gadget", dec!(2.50), 10);
        let catalog = catalog_from(vec![widget.clone(), gadget.clone()]);

        let reservation = plan(
            &[
                OrderLineInput::new(widget.id, 3),
                OrderLineInput::new(gadget.id, 4),
            ],
            &catalog,
            &no_credit(),
        )
        .unwrap();

        assert_eq!(reservation.total, dec!(40));
        assert_eq!(reservation.lines[0].price_at_order, dec!(10));
        assert_eq!(reservation.deltas.get(&widget.id), Some(&-3));
        assert_eq!(reservation.deltas.get(&gadget.id), Some(&-4));
    }

    #[test]
    fn test_demand_is_aggregated_across_duplicate_lines() {
        let widget = product("Widget", dec!(10), 5);
        let catalog = catalog_from(vec![widget.clone()]);

        let err = plan(
            &[
                OrderLineInput::new(widget.id, 3),
                OrderLineInput::new(widget.id, 3),
            ],
            &catalog,
            &no_credit(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ShopError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_checks_run_in_line_order() {
        let widget = product("Widget", dec!(10), 1);
        let catalog = catalog_from(vec![widget.clone()]);
        let ghost = Uuid::now_v7();

        let err = plan(
            &[OrderLineInput::new(widget.id, 0), OrderLineInput::new(ghost, 1)],
            &catalog,
            &no_credit(),
        )
        .unwrap_err();
        assert!(matches!(err, ShopError::NonPositiveQuantity { ref product } if product == "Widget"));

        let err = plan(
            &[OrderLineInput::new(ghost, 1), OrderLineInput::new(widget.id, 0)],
            &catalog,
            &no_credit(),
        )
        .unwrap_err();
        assert!(matches!(err, ShopError::NotFound(EntityKind::Product, id) if id == ghost));
    }

    #[test]
    fn test_credit_counts_as_available_and_nets_out() {
        let widget = product("Widget", dec!(10), 2);
        let gadget = product("Gadget", dec!(1), 0);
        let catalog = catalog_from(vec![widget.clone(), gadget.clone()]);
        let credit = BTreeMap::from([(widget.id, 3), (gadget.id, 1)]);

        let reservation = plan(&[OrderLineInput::new(widget.id, 5)], &catalog, &credit).unwrap();
        assert_eq!(reservation.deltas.get(&widget.id), Some(&-2));
        assert_eq!(reservation.deltas.get(&gadget.id), Some(&1));

        let same = plan(&[OrderLineInput::new(widget.id, 3)], &catalog, &credit).unwrap();
        assert_eq!(same.deltas.get(&widget.id), None);

        let err = plan(&[OrderLineInput::new(widget.id, 7)], &catalog, &credit).unwrap_err();
        assert!(matches!(
            err,
            ShopError::InsufficientStock {
                available: 5,
                requested: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_release_and_reclaim() {
        let widget = product("Widget", dec!(10), 2);
        let lines = vec![
            OrderLine {
                product: widget.id,
                quantity: 1,
                price_at_order: dec!(8),
            },
            OrderLine {
                product: widget.id,
                quantity: 1,
                price_at_order: dec!(8),
            },
        ];

        assert_eq!(release(&lines).get(&widget.id), Some(&2));

        let catalog = catalog_from(vec![widget.clone()]);
        assert_eq!(reclaim(&lines, &catalog).unwrap().get(&widget.id), Some(&-2));

        let empty = Catalog::new();
        assert!(reclaim(&lines, &empty).unwrap_err().is_not_found());
    }
}
