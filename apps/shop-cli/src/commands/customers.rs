use clap::Subcommand;
use domain_shop::{
    ApiResponse, CreateCustomer, EntityKind, ShopStore, UpdateCustomer, parse_id,
};

use super::respond;

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// List customers, newest first
    List,

    /// Show one customer
    Get { id: String },

    /// Register a customer
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Change the given fields of a customer
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Remove a customer; their orders are kept
    Delete { id: String },
}

pub async fn run(store: &ShopStore, command: CustomerCommand) -> eyre::Result<bool> {
    let customers = store.customer_service();

    match command {
        CustomerCommand::List => respond(customers.list().await.map(ApiResponse::list)),
        CustomerCommand::Get { id } => {
            let result = async { customers.get(parse_id(EntityKind::Customer, &id)?).await }.await;
            respond(result.map(ApiResponse::success))
        }
        CustomerCommand::Create {
            name,
            email,
            phone,
            address,
        } => {
            let input = CreateCustomer {
                name,
                email,
                phone,
                address,
            };
            let result = customers.create(input).await;
            respond(result.map(|c| ApiResponse::success(c).with_message("Customer created successfully")))
        }
        CustomerCommand::Update {
            id,
            name,
            email,
            phone,
            address,
        } => {
            let update = UpdateCustomer {
                name,
                email,
                phone,
                address,
            };
            let result = async {
                let id = parse_id(EntityKind::Customer, &id)?;
                customers.update(id, update).await
            }
            .await;
            respond(result.map(|c| ApiResponse::success(c).with_message("Customer updated successfully")))
        }
        CustomerCommand::Delete { id } => {
            let result =
                async { customers.delete(parse_id(EntityKind::Customer, &id)?).await }.await;
            respond(result.map(|()| ApiResponse::deleted().with_message("Customer deleted successfully")))
        }
    }
}
