use clap::Subcommand;
use domain_shop::{ApiResponse, CreateProduct, EntityKind, ShopStore, UpdateProduct, parse_id};
use rust_decimal::Decimal;

use super::respond;

#[derive(Subcommand)]
pub enum ProductCommand {
    /// List products, newest first
    List,

    /// Show one product
    Get { id: String },

    /// Add a product to the catalog
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Decimal,
        /// Units in stock
        #[arg(long, default_value_t = 0)]
        quantity: i32,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Change the given fields of a product; existing orders keep their prices
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        quantity: Option<i32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Receive (positive) or write off (negative) stock
    Stock {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },

    /// Remove a product from the catalog
    Delete { id: String },
}

pub async fn run(store: &ShopStore, command: ProductCommand) -> eyre::Result<bool> {
    let products = store.product_service();

    match command {
        ProductCommand::List => respond(products.list().await.map(ApiResponse::list)),
        ProductCommand::Get { id } => {
            let result = async { products.get(parse_id(EntityKind::Product, &id)?).await }.await;
            respond(result.map(ApiResponse::success))
        }
        ProductCommand::Create {
            name,
            description,
            price,
            quantity,
            category,
            image_url,
        } => {
            let input = CreateProduct {
                name,
                description,
                price,
                quantity,
                category,
                image_url,
            };
            let result = products.create(input).await;
            respond(result.map(|p| ApiResponse::success(p).with_message("Product created successfully")))
        }
        ProductCommand::Update {
            id,
            name,
            description,
            price,
            quantity,
            category,
            image_url,
        } => {
            let update = UpdateProduct {
                name,
                description,
                price,
                quantity,
                category,
                image_url,
            };
            let result = async {
                let id = parse_id(EntityKind::Product, &id)?;
                products.update(id, update).await
            }
            .await;
            respond(result.map(|p| ApiResponse::success(p).with_message("Product updated successfully")))
        }
        ProductCommand::Stock { id, delta } => {
            let result = async {
                let id = parse_id(EntityKind::Product, &id)?;
                products.adjust_stock(id, delta).await
            }
            .await;
            respond(result.map(ApiResponse::success))
        }
        ProductCommand::Delete { id } => {
            let result = async { products.delete(parse_id(EntityKind::Product, &id)?).await }.await;
            respond(result.map(|()| ApiResponse::deleted().with_message("Product deleted successfully")))
        }
    }
}
