//! Shared test utilities for the shop crates
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic names, emails and ids (always available)
//! - `assertions`: assertion helpers (always available)
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["mongo"] }
//! ```
//!
//! Container-backed tests need Docker and are marked `#[ignore]`; run them
//! with `cargo test -- --ignored`.

use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Deterministic test data keyed on a seed, so a failing test sees the
/// same values on every run.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test's name
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_place_order");
    /// assert_eq!(builder.email("ada"), TestDataBuilder::from_test_name("test_place_order").email("ada"));
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Stable id for `label` within this builder's seed
    pub fn id(&self, label: &str) -> Uuid {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        (self.seed, label).hash(&mut hasher);
        let high = hasher.finish();
        Uuid::from_u64_pair(high, self.seed)
    }

    /// `test-{prefix}-{seed}-{suffix}`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Address accepted by the customer email rules
    pub fn email(&self, local: &str) -> String {
        format!("{}.{}@example.com", local, self.seed % 1_000_000)
    }

    /// Database name unique to this builder, within MongoDB's length limit
    pub fn database_name(&self) -> String {
        format!("shop_test_{:x}", self.seed)
    }
}

pub mod assertions {
    use std::fmt::Display;
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Unwrap the error of `result` and check its message mentions `needle`
    pub fn assert_err_contains<T, E: Display>(result: Result<T, E>, needle: &str) -> E {
        match result {
            Ok(_) => panic!("expected an error mentioning '{}', got Ok", needle),
            Err(e) => {
                let message = e.to_string();
                assert!(
                    message.contains(needle),
                    "expected error mentioning '{}', got '{}'",
                    needle,
                    message
                );
                e
            }
        }
    }
}
