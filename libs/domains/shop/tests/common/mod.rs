//! In-memory shop wired the way the binaries wire the MongoDB one

#![allow(dead_code)]

use domain_shop::*;
use rust_decimal::Decimal;
use test_utils::TestDataBuilder;

pub type MemoryOrders =
    OrderService<InMemoryCustomerRepository, InMemoryProductRepository, InMemoryOrderRepository>;

pub struct Shop {
    pub products_repo: InMemoryProductRepository,
    pub customers: CustomerService<InMemoryCustomerRepository>,
    pub products: ProductService<InMemoryProductRepository>,
    pub orders: MemoryOrders,
    pub data: TestDataBuilder,
}

impl Shop {
    pub fn new(test_name: &str, mode: ConsistencyMode) -> Self {
        let customers_repo = InMemoryCustomerRepository::new();
        let products_repo = InMemoryProductRepository::new();
        let orders_repo = InMemoryOrderRepository::new();

        Self {
            customers: CustomerService::new(customers_repo.clone()),
            products: ProductService::new(products_repo.clone()),
            orders: OrderService::new(customers_repo, products_repo.clone(), orders_repo)
                .with_mode(mode),
            products_repo,
            data: TestDataBuilder::from_test_name(test_name),
        }
    }

    pub async fn customer(&self, name: &str) -> Customer {
        self.customers
            .create(CreateCustomer {
                name: name.to_string(),
                email: self.data.email(name),
                phone: None,
                address: None,
            })
            .await
            .expect("customer is valid")
    }

    pub async fn product(&self, name: &str, price: Decimal, quantity: i32) -> Product {
        self.products
            .create(CreateProduct {
                name: name.to_string(),
                description: None,
                price,
                quantity,
                category: None,
                image_url: None,
            })
            .await
            .expect("product is valid")
    }

    pub async fn stock(&self, product: &Product) -> i32 {
        self.products_repo
            .stock_of(product.id)
            .await
            .expect("product exists")
    }

    pub async fn place(&self, customer: &Customer, lines: &[(&Product, i32)]) -> ShopResult<Order> {
        self.orders
            .place(PlaceOrder {
                customer: customer.id,
                products: inputs(lines),
                status: None,
            })
            .await
    }

    pub async fn replace_lines(&self, order: &Order, lines: &[(&Product, i32)]) -> ShopResult<Order> {
        self.orders
            .amend(order.id, AmendOrder::products(inputs(lines)))
            .await
    }

    /// The order as currently stored
    pub async fn reload(&self, order: &Order) -> OrderDetails {
        self.orders.get(order.id).await.expect("order exists")
    }
}

pub fn inputs(lines: &[(&Product, i32)]) -> Vec<OrderLineInput> {
    lines
        .iter()
        .map(|(product, quantity)| OrderLineInput::new(product.id, *quantity))
        .collect()
}

/// Total recomputed from the stored lines
pub fn line_sum(details: &OrderDetails) -> Decimal {
    details.products.iter().map(|l| l.line_total).sum()
}
