use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::query;
use crate::errors::{AppError, UniqueField};
use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::models::listable::ListFilter;
use crate::repository::{CustomerRepository, DuplicateCheck};

const EMAIL_CONSTRAINT: &str = "customers_email_key";
const MOBILE_PHONE_CONSTRAINT: &str = "customers_mobile_phone_key";

#[derive(Debug, Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate a unique-constraint violation into the matching duplicate error.
fn map_write_error(e: sqlx::Error, email: &str, mobile_phone: &str) -> AppError {
    let violated = match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint() {
                Some(EMAIL_CONSTRAINT) => Some((UniqueField::Email, email)),
                Some(MOBILE_PHONE_CONSTRAINT) => Some((UniqueField::MobilePhone, mobile_phone)),
                _ => None,
            }
        }
        _ => None,
    };

    match violated {
        Some((field, value)) => {
            tracing::warn!(field = field.as_str(), "Unique constraint rejected customer write");
            AppError::Duplicate {
                field,
                value: value.to_string(),
            }
        }
        None => AppError::Database(e),
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn count_duplicates(&self, check: DuplicateCheck<'_>) -> Result<i64, AppError> {
        let sql = format!(
            "SELECT COUNT(*) FROM customers WHERE {} = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
            check.field.as_str()
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(check.value)
            .bind(check.exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, input: &NewCustomer) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email, mobile_phone, password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.mobile_phone)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &input.email, &input.mobile_phone))
    }

    async fn update(&self, id: i64, changes: &CustomerChanges) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = $2,
                email = $3,
                mobile_phone = $4,
                password = COALESCE($5, password),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.mobile_phone)
        .bind(&changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &changes.email, &changes.mobile_phone))?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer not found".to_string()));
        }
        Ok(())
    }

    async fn count(&self, filter: &ListFilter) -> Result<i64, AppError> {
        let mut qb = query::count_query::<Customer>(filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn fetch(
        &self,
        filter: &ListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Customer>, AppError> {
        let mut qb = query::page_query::<Customer>(filter, offset, limit);
        let rows = qb.build_query_as::<Customer>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
