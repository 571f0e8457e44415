use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EntityKind, ShopError, ShopResult};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::repository::ProductRepository;

/// Catalog management: product details, prices and manual stock changes
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create(&self, input: CreateProduct) -> ShopResult<Product> {
        let input = input.normalized();
        input.validate()?;

        if self.repository.exists_by_name(&input.name).await? {
            return Err(ShopError::DuplicateName(input.name));
        }

        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ShopResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(EntityKind::Product, id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ShopResult<Vec<Product>> {
        self.repository.list().await
    }

    /// Price changes never touch the `price_at_order` of existing orders
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ShopResult<Product> {
        let input = input.normalized();
        input.validate()?;

        let existing = self.get(id).await?;

        if let Some(ref name) = input.name {
            if name != &existing.name && self.repository.exists_by_name(name).await? {
                return Err(ShopError::DuplicateName(name.clone()));
            }
        }

        self.repository.update(id, input).await
    }

    /// Orders keep their lines; a later release for this product is skipped
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ShopResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ShopError::NotFound(EntityKind::Product, id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Receive (`delta > 0`) or write off (`delta < 0`) stock outside of orders
    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product> {
        let product = self.repository.adjust_stock(id, delta).await?;
        tracing::info!(product_id = %id, delta, stock = product.quantity, "Stock adjusted");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockProductRepository;
    use rust_decimal_macros::dec;

    fn input(name: &str) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: None,
            price: dec!(9.99),
            quantity: 3,
            category: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_trimmed_name() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_exists_by_name()
            .withf(|name| name == "Widget")
            .returning(|_| Ok(true));

        let service = ProductService::new(mock_repo);
        let err = service.create(input("  Widget ")).await.unwrap_err();
        assert!(matches!(err, ShopError::DuplicateName(ref n) if n == "Widget"));
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_skips_uniqueness_check() {
        let mut mock_repo = MockProductRepository::new();
        let existing = Product::new(input("Widget"));
        let id = existing.id;

        let stored = existing.clone();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        mock_repo.expect_exists_by_name().never();
        mock_repo.expect_update().returning(move |_, update| {
            let mut product = existing.clone();
            product.apply_update(update);
            Ok(product)
        });

        let service = ProductService::new(mock_repo);
        let updated = service
            .update(
                id,
                UpdateProduct {
                    name: Some("Widget".to_string()),
                    price: Some(dec!(12)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, dec!(12));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_stock() {
        let mock_repo = MockProductRepository::new();
        let service = ProductService::new(mock_repo);

        let err = service
            .update(
                Uuid::now_v7(),
                UpdateProduct {
                    quantity: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Validation(ref m) if m.contains("negative")));
    }
}
