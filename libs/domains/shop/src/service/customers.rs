use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EntityKind, ShopError, ShopResult};
use crate::models::{CreateCustomer, Customer, UpdateCustomer};
use crate::repository::CustomerRepository;

/// Customer registration and profile management
pub struct CustomerService<R: CustomerRepository> {
    repository: Arc<R>,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateCustomer) -> ShopResult<Customer> {
        let input = input.normalized();
        input.validate()?;

        if self.repository.exists_by_email(&input.email).await? {
            return Err(ShopError::DuplicateEmail(input.email));
        }

        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ShopResult<Customer> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(EntityKind::Customer, id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ShopResult<Vec<Customer>> {
        self.repository.list().await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateCustomer) -> ShopResult<Customer> {
        let input = input.normalized();
        input.validate()?;

        let existing = self.get(id).await?;

        if let Some(ref email) = input.email {
            if email != &existing.email && self.repository.exists_by_email(email).await? {
                return Err(ShopError::DuplicateEmail(email.clone()));
            }
        }

        self.repository.update(id, input).await
    }

    /// Orders referencing the customer are left in place
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ShopResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ShopError::NotFound(EntityKind::Customer, id));
        }
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCustomerRepository;
    use mockall::predicate::eq;

    fn input(email: &str) -> CreateCustomer {
        CreateCustomer {
            name: "Ada".to_string(),
            email: email.to_string(),
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_checks_normalized_email() {
        let mut mock_repo = MockCustomerRepository::new();
        mock_repo
            .expect_exists_by_email()
            .withf(|email| email == "ada@example.com")
            .returning(|_| Ok(true));

        let service = CustomerService::new(mock_repo);
        let err = service.create(input(" Ada@Example.com ")).await.unwrap_err();

        assert!(matches!(err, ShopError::DuplicateEmail(ref e) if e == "ada@example.com"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email_before_storage() {
        let mock_repo = MockCustomerRepository::new();
        let service = CustomerService::new(mock_repo);

        let err = service.create(input("not-an-email")).await.unwrap_err();
        assert!(matches!(err, ShopError::Validation(ref m) if m.contains("valid email")));
    }

    #[tokio::test]
    async fn test_get_missing_customer() {
        let mut mock_repo = MockCustomerRepository::new();
        let id = Uuid::now_v7();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(|_| Ok(None));

        let service = CustomerService::new(mock_repo);
        let err = service.get(id).await.unwrap_err();
        assert!(matches!(err, ShopError::NotFound(EntityKind::Customer, missing) if missing == id));
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let mut mock_repo = MockCustomerRepository::new();
        mock_repo.expect_delete().returning(|_| Ok(false));

        let service = CustomerService::new(mock_repo);
        assert!(service.delete(Uuid::now_v7()).await.unwrap_err().is_not_found());
    }
}
