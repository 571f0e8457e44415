use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Accepted email shape: word characters with optional `.`/`-` separators and
/// a 2-3 letter top-level domain.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email regex is valid")
});

fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_SHAPE.is_match(email) {
        return Err(ValidationError::new("email")
            .with_message("Please fill a valid email address".into()));
    }
    Ok(())
}

/// Customer entity - stored in the `customers` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Always stored trimmed and lowercase
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for registering a customer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Customer email is required"),
        custom(function = "validate_email_shape")
    )]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// DTO for a profile edit; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 200, message = "Customer name is required"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_email_shape"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl CreateCustomer {
    /// Trim every field and lowercase the email before validation
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: trimmed(self.phone),
            address: trimmed(self.address),
        }
    }
}

impl UpdateCustomer {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: self.email.map(|e| e.trim().to_lowercase()),
            phone: trimmed(self.phone),
            address: trimmed(self.address),
        }
    }
}

impl Customer {
    pub fn new(input: CreateCustomer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateCustomer) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        self.updated_at = Utc::now();
    }
}
