//! Customer persistence behind a trait so the service layer can run over
//! Postgres or the in-memory store.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::{AppError, UniqueField};
use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::models::listable::ListFilter;

pub use memory::MemoryCustomerRepository;
pub use postgres::PgCustomerRepository;

/// "How many other customers already use this value?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateCheck<'a> {
    pub field: UniqueField,
    pub value: &'a str,
    /// Row to ignore, used when the customer being updated keeps its own value.
    pub exclude_id: Option<i64>,
}

impl<'a> DuplicateCheck<'a> {
    pub fn new(field: UniqueField, value: &'a str) -> Self {
        Self {
            field,
            value,
            exclude_id: None,
        }
    }

    pub fn excluding(mut self, id: i64) -> Self {
        self.exclude_id = Some(id);
        self
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, AppError>;

    async fn count_duplicates(&self, check: DuplicateCheck<'_>) -> Result<i64, AppError>;

    /// Insert a customer. A uniqueness conflict surfaces as [`AppError::Duplicate`].
    async fn create(&self, input: &NewCustomer) -> Result<Customer, AppError>;

    /// Overwrite a customer. Missing rows surface as [`AppError::NotFound`].
    async fn update(&self, id: i64, changes: &CustomerChanges) -> Result<Customer, AppError>;

    /// Hard delete. Missing rows surface as [`AppError::NotFound`].
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    async fn count(&self, filter: &ListFilter) -> Result<i64, AppError>;

    async fn fetch(
        &self,
        filter: &ListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Customer>, AppError>;

    /// Storage round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
