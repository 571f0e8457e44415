//! Order workflow: placement, amendment, status transitions and deletion,
//! keeping product stock and order totals consistent.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::ConsistencyMode;
use crate::error::{EntityKind, ShopError, ShopResult};
use crate::models::{
    AmendOrder, Customer, CustomerSummary, Order, OrderDetails, OrderLine, OrderLineInput,
    OrderLineView, OrderStatus, PlaceOrder, ProductSummary,
};
use crate::repository::{CustomerRepository, OrderRepository, ProductRepository};
use crate::reservation::{self, Catalog, StockDeltas};

pub struct OrderService<C, P, O>
where
    C: CustomerRepository,
    P: ProductRepository,
    O: OrderRepository,
{
    customers: Arc<C>,
    products: Arc<P>,
    orders: Arc<O>,
    mode: ConsistencyMode,
}

impl<C, P, O> OrderService<C, P, O>
where
    C: CustomerRepository,
    P: ProductRepository,
    O: OrderRepository,
{
    pub fn new(customers: C, products: P, orders: O) -> Self {
        Self {
            customers: Arc::new(customers),
            products: Arc::new(products),
            orders: Arc::new(orders),
            mode: ConsistencyMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ConsistencyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    /// Place an order for an existing customer, reserving stock for every
    /// line at today's catalog price.
    #[instrument(
        skip(self, input),
        fields(customer_id = %input.customer, lines = input.products.len(), mode = %self.mode)
    )]
    pub async fn place(&self, input: PlaceOrder) -> ShopResult<Order> {
        input.validate()?;

        if self.customers.get_by_id(input.customer).await?.is_none() {
            return Err(ShopError::NotFound(EntityKind::Customer, input.customer));
        }

        let status = input.status.unwrap_or_default();
        let order = match self.mode {
            ConsistencyMode::Strict => {
                self.place_strict(input.customer, &input.products, status)
                    .await?
            }
            ConsistencyMode::Legacy => {
                let lines = self.reserve_sequentially(&input.products).await?;
                self.orders
                    .insert(Order::new(input.customer, lines, status))
                    .await?
            }
        };

        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            status = %order.status,
            "Order placed"
        );
        Ok(order)
    }

    async fn place_strict(
        &self,
        customer: Uuid,
        products: &[OrderLineInput],
        status: OrderStatus,
    ) -> ShopResult<Order> {
        if !status.holds_stock() {
            return Err(ShopError::Validation(format!(
                "An order cannot be placed as {status}"
            )));
        }

        let catalog = self.catalog_for(products.iter().map(|l| l.product)).await?;
        let planned = reservation::plan(products, &catalog, &BTreeMap::new())?;
        let applied = self.apply_deltas(&planned.deltas).await?;

        let order = Order::new(customer, planned.lines, status);
        match self.orders.insert(order).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::warn!(error = %e, "Storing the order failed, returning reserved stock");
                self.revert(&applied).await;
                Err(e)
            }
        }
    }

    /// Change an order's status, replace its line items, or both
    #[instrument(skip(self, input), fields(mode = %self.mode))]
    pub async fn amend(&self, id: Uuid, input: AmendOrder) -> ShopResult<Order> {
        let order = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(EntityKind::Order, id))?;

        let amended = match self.mode {
            ConsistencyMode::Strict => self.amend_strict(order, input).await?,
            ConsistencyMode::Legacy => self.amend_legacy(order, input).await?,
        };

        tracing::info!(
            order_id = %id,
            total = %amended.total_amount,
            status = %amended.status,
            "Order amended"
        );
        Ok(amended)
    }

    /// Move an order to `status`
    pub async fn transition(&self, id: Uuid, status: OrderStatus) -> ShopResult<Order> {
        self.amend(id, AmendOrder::status(status)).await
    }

    pub async fn cancel(&self, id: Uuid) -> ShopResult<Order> {
        self.transition(id, OrderStatus::Cancelled).await
    }

    async fn amend_strict(&self, mut order: Order, input: AmendOrder) -> ShopResult<Order> {
        let target = input.status.unwrap_or(order.status);

        if order.status.is_closed() {
            if input.products.is_some() || target == order.status {
                return Err(ShopError::OrderClosed);
            }
            return self.change_status(order, target).await;
        }

        let Some(products) = input.products else {
            return self.change_status(order, target).await;
        };

        if target != OrderStatus::Pending {
            return Err(ShopError::Validation(
                "Line items can only be replaced on an order that stays pending".to_string(),
            ));
        }
        if products.is_empty() {
            return Err(ShopError::Validation(
                "An order needs at least one product".to_string(),
            ));
        }

        let catalog = self.catalog_for(products.iter().map(|l| l.product)).await?;
        let planned = reservation::plan(&products, &catalog, &order.reserved_quantities())?;
        let applied = self.apply_deltas(&planned.deltas).await?;

        order.replace_lines(planned.lines);
        self.save_or_revert(order, &applied).await
    }

    /// Status change with stock kept in step: leaving a stock-holding status
    /// for one that holds none releases the lines, the reverse re-reserves
    /// them at their original prices.
    async fn change_status(&self, mut order: Order, target: OrderStatus) -> ShopResult<Order> {
        let from = order.status;
        let deltas = match (from.holds_stock(), target.holds_stock()) {
            (true, false) => reservation::release(&order.lines),
            (false, true) => {
                let catalog = self
                    .catalog_for(order.lines.iter().map(|l| l.product))
                    .await?;
                reservation::reclaim(&order.lines, &catalog)?
            }
            _ => StockDeltas::new(),
        };

        let applied = self.apply_deltas(&deltas).await?;
        order.status = target;
        let saved = self.save_or_revert(order, &applied).await?;

        if from != target {
            tracing::info!(order_id = %saved.id, %from, to = %target, "Order status changed");
        }
        Ok(saved)
    }

    async fn amend_legacy(&self, mut order: Order, input: AmendOrder) -> ShopResult<Order> {
        if order.status.is_closed() {
            return match input.status {
                Some(status) if status != order.status => {
                    order.status = status;
                    self.orders.save(order).await
                }
                _ => Err(ShopError::OrderClosed),
            };
        }

        if let Some(status) = input.status {
            order.status = status;
        }

        if let Some(products) = input.products {
            if order.status == OrderStatus::Pending {
                self.release_all(&reservation::release(&order.lines))
                    .await?;
                let lines = self.reserve_sequentially(&products).await?;
                order.replace_lines(lines);
            }
        }

        self.orders.save(order).await
    }

    /// Delete an order. A pending order's stock goes back to the catalog;
    /// completed orders have consumed theirs and cancelled orders hold none.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn delete(&self, id: Uuid) -> ShopResult<()> {
        let order = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(EntityKind::Order, id))?;
        let held = match order.status {
            OrderStatus::Pending => reservation::release(&order.lines),
            OrderStatus::Completed | OrderStatus::Cancelled => StockDeltas::new(),
        };

        match self.mode {
            ConsistencyMode::Strict => {
                if !self.orders.delete(id).await? {
                    return Err(ShopError::NotFound(EntityKind::Order, id));
                }
                self.release_after_delete(id, &held).await?;
            }
            ConsistencyMode::Legacy => {
                self.release_all(&held).await?;
                if !self.orders.delete(id).await? {
                    return Err(ShopError::NotFound(EntityKind::Order, id));
                }
            }
        }

        tracing::info!(order_id = %id, status = %order.status, released = held.len(), "Order deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ShopResult<OrderDetails> {
        let order = self
            .orders
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(EntityKind::Order, id))?;
        let mut details = self.project(vec![order]).await?;
        details
            .pop()
            .ok_or_else(|| ShopError::Internal("order projection came back empty".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ShopResult<Vec<OrderDetails>> {
        let orders = self.orders.list().await?;
        self.project(orders).await
    }

    /// Join customer and product details onto `orders` for display
    async fn project(&self, orders: Vec<Order>) -> ShopResult<Vec<OrderDetails>> {
        let customer_ids: Vec<Uuid> = orders
            .iter()
            .map(|o| o.customer)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let customers: HashMap<Uuid, Customer> = if customer_ids.is_empty() {
            HashMap::new()
        } else {
            self.customers
                .get_many(&customer_ids)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };
        let catalog = self
            .catalog_for(orders.iter().flat_map(|o| o.lines.iter().map(|l| l.product)))
            .await?;

        Ok(orders
            .into_iter()
            .map(|order| details_of(order, &customers, &catalog))
            .collect())
    }

    async fn catalog_for(&self, ids: impl Iterator<Item = Uuid>) -> ShopResult<Catalog> {
        let ids: Vec<Uuid> = ids.collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(Catalog::new());
        }
        Ok(reservation::catalog_from(self.products.get_many(&ids).await?))
    }

    /// Reserve each line in turn, checking and decrementing as it goes.
    /// The first failure is returned and earlier reservations stay applied.
    async fn reserve_sequentially(&self, items: &[OrderLineInput]) -> ShopResult<Vec<OrderLine>> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            match self.reserve_line(item).await {
                Ok(line) => lines.push(line),
                Err(e) => {
                    if !lines.is_empty() {
                        tracing::warn!(
                            reserved_lines = lines.len(),
                            error = %e,
                            "Request failed after partial reservation, earlier lines keep their stock"
                        );
                    }
                    return Err(e);
                }
            }
        }
        Ok(lines)
    }

    async fn reserve_line(&self, item: &OrderLineInput) -> ShopResult<OrderLine> {
        let product = self
            .products
            .get_by_id(item.product)
            .await?
            .ok_or(ShopError::NotFound(EntityKind::Product, item.product))?;

        if item.quantity <= 0 {
            return Err(ShopError::NonPositiveQuantity {
                product: product.name,
            });
        }
        if product.quantity < item.quantity {
            return Err(ShopError::InsufficientStock {
                product: product.name,
                available: product.quantity,
                requested: item.quantity,
            });
        }

        self.products
            .adjust_stock(product.id, -item.quantity)
            .await?;
        Ok(OrderLine {
            product: product.id,
            quantity: item.quantity,
            price_at_order: product.price,
        })
    }

    /// Apply `deltas`, reservations before releases. On failure every change
    /// already made is reverted. Releases for products that no longer exist
    /// are skipped. Returns what was actually applied.
    async fn apply_deltas(&self, deltas: &StockDeltas) -> ShopResult<StockDeltas> {
        let reservations = deltas.iter().filter(|(_, delta)| **delta < 0);
        let releases = deltas.iter().filter(|(_, delta)| **delta > 0);

        let mut applied = StockDeltas::new();
        for (&product_id, &delta) in reservations.chain(releases) {
            match self.products.adjust_stock(product_id, delta).await {
                Ok(_) => {
                    applied.insert(product_id, delta);
                }
                Err(e) if delta > 0 && e.is_not_found() => {
                    tracing::warn!(%product_id, quantity = delta, "Product is gone, release skipped");
                }
                Err(e) => {
                    tracing::warn!(%product_id, delta, error = %e, "Stock change failed, rolling back");
                    self.revert(&applied).await;
                    return Err(e);
                }
            }
        }
        Ok(applied)
    }

    /// Undo `applied`. Failures are logged; the stock of that product is
    /// then off by the logged delta.
    async fn revert(&self, applied: &StockDeltas) {
        for (&product_id, &delta) in applied {
            if let Err(e) = self.products.adjust_stock(product_id, -delta).await {
                tracing::error!(%product_id, delta, error = %e, "Compensating stock change failed");
            }
        }
    }

    /// Hand stock back product by product, skipping products that no longer
    /// exist. Stops at the first storage error.
    async fn release_all(&self, deltas: &StockDeltas) -> ShopResult<()> {
        for (&product_id, &quantity) in deltas {
            match self.products.adjust_stock(product_id, quantity).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(%product_id, quantity, "Product is gone, release skipped");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Release the stock of an order that is already gone. Every product is
    /// attempted; failures are logged with the quantity that never made it
    /// back, and the first one is returned.
    async fn release_after_delete(&self, order_id: Uuid, deltas: &StockDeltas) -> ShopResult<()> {
        let mut first_error = None;
        for (&product_id, &quantity) in deltas {
            match self.products.adjust_stock(product_id, quantity).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(%product_id, quantity, "Product is gone, release skipped");
                }
                Err(e) => {
                    tracing::error!(
                        %order_id,
                        %product_id,
                        quantity,
                        error = %e,
                        "Stock of a deleted order was not released"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn save_or_revert(&self, order: Order, applied: &StockDeltas) -> ShopResult<Order> {
        match self.orders.save(order).await {
            Ok(order) => Ok(order),
            Err(e) => {
                tracing::warn!(error = %e, "Saving the order failed, reverting stock changes");
                self.revert(applied).await;
                Err(e)
            }
        }
    }
}

fn details_of(
    order: Order,
    customers: &HashMap<Uuid, Customer>,
    catalog: &Catalog,
) -> OrderDetails {
    let customer_details = customers.get(&order.customer).map(|c| CustomerSummary {
        id: c.id,
        name: c.name.clone(),
        email: c.email.clone(),
    });
    let products = order
        .lines
        .iter()
        .map(|line| OrderLineView {
            product: line.product,
            catalog: catalog.get(&line.product).map(|p| ProductSummary {
                id: p.id,
                name: p.name.clone(),
                price: p.price,
            }),
            quantity: line.quantity,
            price_at_order: line.price_at_order,
            line_total: line.line_total(),
        })
        .collect();

    OrderDetails {
        id: order.id,
        customer: order.customer,
        customer_details,
        products,
        total_amount: order.total_amount,
        status: order.status,
        order_date: order.order_date,
        updated_at: order.updated_at,
    }
}
