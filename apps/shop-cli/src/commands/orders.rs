use clap::Subcommand;
use domain_shop::{
    AmendOrder, ApiResponse, ConsistencyMode, EntityKind, OrderLineInput, OrderStatus, PlaceOrder,
    ShopError, ShopResult, ShopStore, parse_id,
};

use super::respond;

#[derive(Subcommand)]
pub enum OrderCommand {
    /// List orders with customer and product details, newest first
    List,

    /// Show one order with customer and product details
    Get { id: String },

    /// Place an order, reserving stock at today's prices
    Place {
        #[arg(long)]
        customer: String,
        /// Line item, repeatable
        #[arg(long = "line", value_name = "PRODUCT_ID:QUANTITY", required = true)]
        lines: Vec<String>,
        /// pending (default) or completed
        #[arg(long)]
        status: Option<String>,
    },

    /// Replace the line items and/or change the status of an order
    Amend {
        id: String,
        /// Replacement line item, repeatable
        #[arg(long = "line", value_name = "PRODUCT_ID:QUANTITY")]
        lines: Vec<String>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Move an order to pending, completed or cancelled
    Status { id: String, status: String },

    /// Cancel an order
    Cancel { id: String },

    /// Delete an order; a pending order's stock goes back to the catalog
    Delete { id: String },
}

/// `PRODUCT_ID:QUANTITY`
fn parse_line(raw: &str) -> ShopResult<OrderLineInput> {
    let invalid = || ShopError::Validation(format!("Invalid line '{raw}', expected PRODUCT_ID:QUANTITY"));

    let (product, quantity) = raw.split_once(':').ok_or_else(invalid)?;
    let product = parse_id(EntityKind::Product, product)?;
    let quantity = quantity.trim().parse().map_err(|_| invalid())?;
    Ok(OrderLineInput::new(product, quantity))
}

fn parse_lines(raw: &[String]) -> ShopResult<Vec<OrderLineInput>> {
    raw.iter().map(|line| parse_line(line)).collect()
}

fn parse_status(raw: Option<&str>) -> ShopResult<Option<OrderStatus>> {
    raw.map(OrderStatus::parse).transpose()
}

pub async fn run(
    store: &ShopStore,
    mode: ConsistencyMode,
    command: OrderCommand,
) -> eyre::Result<bool> {
    let orders = store.order_service(mode);

    match command {
        OrderCommand::List => respond(orders.list().await.map(ApiResponse::list)),
        OrderCommand::Get { id } => {
            let result = async { orders.get(parse_id(EntityKind::Order, &id)?).await }.await;
            respond(result.map(ApiResponse::success))
        }
        OrderCommand::Place {
            customer,
            lines,
            status,
        } => {
            let result = async {
                let input = PlaceOrder {
                    customer: parse_id(EntityKind::Customer, &customer)?,
                    products: parse_lines(&lines)?,
                    status: parse_status(status.as_deref())?,
                };
                orders.place(input).await
            }
            .await;
            respond(result.map(|o| ApiResponse::success(o).with_message("Order placed successfully")))
        }
        OrderCommand::Amend { id, lines, status } => {
            let result = async {
                let id = parse_id(EntityKind::Order, &id)?;
                let input = AmendOrder {
                    status: parse_status(status.as_deref())?,
                    products: if lines.is_empty() {
                        None
                    } else {
                        Some(parse_lines(&lines)?)
                    },
                };
                orders.amend(id, input).await
            }
            .await;
            respond(result.map(|o| ApiResponse::success(o).with_message("Order updated successfully")))
        }
        OrderCommand::Status { id, status } => {
            let result = async {
                let id = parse_id(EntityKind::Order, &id)?;
                orders.transition(id, OrderStatus::parse(&status)?).await
            }
            .await;
            respond(result.map(ApiResponse::success))
        }
        OrderCommand::Cancel { id } => {
            let result = async { orders.cancel(parse_id(EntityKind::Order, &id)?).await }.await;
            respond(result.map(|o| ApiResponse::success(o).with_message("Order cancelled")))
        }
        OrderCommand::Delete { id } => {
            let result = async { orders.delete(parse_id(EntityKind::Order, &id)?).await }.await;
            respond(result.map(|()| ApiResponse::deleted().with_message("Order deleted successfully")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_parse_line() {
        let product = Uuid::now_v7();

        let line = parse_line(&format!("{product}:3")).unwrap();
        assert_eq!(line, OrderLineInput::new(product, 3));

        let line = parse_line(&format!(" {product} : -1 ")).unwrap();
        assert_eq!(line.quantity, -1);
    }

    #[test]
    fn test_parse_line_rejects_malformed_input() {
        let product = Uuid::now_v7();

        assert!(matches!(
            parse_line("widget:3"),
            Err(ShopError::InvalidId { entity: EntityKind::Product, .. })
        ));
        assert!(matches!(
            parse_line(&product.to_string()),
            Err(ShopError::Validation(_))
        ));
        assert!(matches!(
            parse_line(&format!("{product}:many")),
            Err(ShopError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(
            parse_status(Some("completed")).unwrap(),
            Some(OrderStatus::Completed)
        );
        assert!(matches!(
            parse_status(Some("shipped")),
            Err(ShopError::InvalidStatus(_))
        ));
    }
}
