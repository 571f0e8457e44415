use http::StatusCode;
use mongodb::error::{ErrorKind as MongoErrorKind, WriteFailure};
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

/// MongoDB server code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// The persisted entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntityKind {
    Customer,
    Product,
    Order,
}

/// Coarse error taxonomy the adapter layer maps to transport codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("{0} not found: {1}")]
    NotFound(EntityKind, Uuid),

    #[error("Invalid {entity} ID format: '{value}'")]
    InvalidId { entity: EntityKind, value: String },

    #[error("Customer with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Product with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Quantity for product {product} must be positive")]
    NonPositiveQuantity { product: String },

    #[error(
        "Not enough stock for product: {product}. Available: {available}, Requested: {requested}"
    )]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Invalid status provided: '{0}'")]
    InvalidStatus(String),

    #[error("Cannot modify a completed or cancelled order")]
    OrderClosed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ShopResult<T> = Result<T, ShopError>;

impl ShopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopError::NotFound(..) => ErrorKind::NotFound,
            ShopError::InvalidId { .. }
            | ShopError::Validation(_)
            | ShopError::NonPositiveQuantity { .. }
            | ShopError::InsufficientStock { .. }
            | ShopError::InvalidStatus(_)
            | ShopError::OrderClosed => ErrorKind::Validation,
            ShopError::DuplicateEmail(_) | ShopError::DuplicateName(_) | ShopError::Conflict(_) => {
                ErrorKind::Conflict
            }
            ShopError::Database(_) | ShopError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Status code an HTTP adapter should answer with.
    ///
    /// A malformed id is reported as 400 even though it belongs to the
    /// not-found family of lookups.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used as the envelope `error` field
    pub fn label(&self) -> &'static str {
        match self {
            ShopError::NotFound(EntityKind::Customer, _) => "Customer not found",
            ShopError::NotFound(EntityKind::Product, _) => "Product not found",
            ShopError::NotFound(EntityKind::Order, _) => "Order not found",
            ShopError::InvalidId { .. } => "Invalid ID format",
            ShopError::DuplicateEmail(_) | ShopError::DuplicateName(_) | ShopError::Conflict(_) => {
                "Conflict"
            }
            ShopError::Validation(_)
            | ShopError::NonPositiveQuantity { .. }
            | ShopError::InvalidStatus(_) => "Validation error",
            ShopError::InsufficientStock { .. } => "Insufficient stock",
            ShopError::OrderClosed => "Order closed",
            ShopError::Database(_) | ShopError::Internal(_) => "Server Error",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ShopError::NotFound(..))
    }
}

/// Parse an adapter-supplied identifier
pub fn parse_id(entity: EntityKind, raw: &str) -> ShopResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ShopError::InvalidId {
        entity,
        value: raw.to_string(),
    })
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        MongoErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        MongoErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl ShopError {
    /// Map a driver error, reporting a unique-index violation as `duplicate`
    pub(crate) fn on_duplicate(
        err: mongodb::error::Error,
        duplicate: impl FnOnce() -> ShopError,
    ) -> ShopError {
        if is_duplicate_key(&err) {
            duplicate()
        } else {
            ShopError::Database(err.to_string())
        }
    }
}

impl From<mongodb::error::Error> for ShopError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            ShopError::Conflict(err.to_string())
        } else {
            ShopError::Database(err.to_string())
        }
    }
}

impl From<database::mongodb::MongoError> for ShopError {
    fn from(err: database::mongodb::MongoError) -> Self {
        ShopError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        ShopError::Validation(messages.join("; "))
    }
}
