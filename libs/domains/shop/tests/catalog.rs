//! Customer and product services over the in-memory repositories

mod common;

use common::Shop;
use domain_shop::*;
use rust_decimal_macros::dec;
use test_utils::assertions::*;

fn shop(name: &str) -> Shop {
    Shop::new(name, ConsistencyMode::Strict)
}

#[tokio::test]
async fn test_customer_email_is_unique_after_normalization() {
    let shop = shop("test_customer_email_is_unique_after_normalization");
    let ada = shop.customer("ada").await;

    let result = shop
        .customers
        .create(CreateCustomer {
            name: "Ada again".to_string(),
            email: format!("  {}  ", ada.email.to_uppercase()),
            phone: None,
            address: None,
        })
        .await;

    let err = assert_err_contains(result, "already exists");
    assert_eq!(err.status_code(), http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_customer_email_change_checks_uniqueness() {
    let shop = shop("test_customer_email_change_checks_uniqueness");
    let ada = shop.customer("ada").await;
    let grace = shop.customer("grace").await;

    let taken = shop
        .customers
        .update(
            grace.id,
            UpdateCustomer {
                email: Some(ada.email.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(ShopError::DuplicateEmail(_))));

    let same = shop
        .customers
        .update(
            ada.id,
            UpdateCustomer {
                email: Some(ada.email.clone()),
                phone: Some("555-0100".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.phone.as_deref(), Some("555-0100"));
}

#[tokio::test]
async fn test_customer_rejects_malformed_email() {
    let shop = shop("test_customer_rejects_malformed_email");

    let result = shop
        .customers
        .create(CreateCustomer {
            name: "Nobody".to_string(),
            email: "not-an-address".to_string(),
            phone: None,
            address: None,
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_product_rejects_negative_quantity() {
    let shop = shop("test_product_rejects_negative_quantity");

    let result = shop
        .products
        .create(CreateProduct {
            name: "Widget".to_string(),
            description: None,
            price: dec!(1),
            quantity: -1,
            category: None,
            image_url: None,
        })
        .await;

    assert_err_contains(result, "Quantity cannot be negative");
}

#[tokio::test]
async fn test_product_name_is_unique() {
    let shop = shop("test_product_name_is_unique");
    shop.product("Widget", dec!(10), 5).await;

    let result = shop
        .products
        .create(CreateProduct {
            name: " Widget ".to_string(),
            description: None,
            price: dec!(12),
            quantity: 1,
            category: None,
            image_url: None,
        })
        .await;

    assert_err_contains(result, "Product with name 'Widget' already exists");
}

#[tokio::test]
async fn test_restock_and_write_off() {
    let shop = shop("test_restock_and_write_off");
    let widget = shop.product("Widget", dec!(10), 5).await;

    let restocked = shop.products.adjust_stock(widget.id, 7).await.unwrap();
    assert_eq!(restocked.quantity, 12);

    let err = shop.products.adjust_stock(widget.id, -13).await.unwrap_err();
    assert!(matches!(
        err,
        ShopError::InsufficientStock {
            available: 12,
            requested: 13,
            ..
        }
    ));

    let written_off = shop.products.adjust_stock(widget.id, -12).await.unwrap();
    assert_eq!(written_off.quantity, 0);
}

#[tokio::test]
async fn test_failure_envelope() {
    let shop = shop("test_failure_envelope");
    let missing = shop.data.id("missing");

    let result = shop.products.get(missing).await;
    let status = ApiResponse::status_for(&result);
    let envelope = ApiResponse::<Product>::from_error(&result.unwrap_err());

    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("Product not found"));
}
