//! Process-local customer store used by tests and `DATABASE_URL=memory://`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::errors::{AppError, UniqueField};
use crate::models::customer::{Customer, CustomerChanges, NewCustomer};
use crate::models::listable::{ListFilter, Listable};
use crate::repository::{CustomerRepository, DuplicateCheck};

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    rows: BTreeMap<i64, Customer>,
}

impl Store {
    /// The first unique field `value` collides with, ignoring `exclude_id`.
    fn conflict(
        &self,
        email: &str,
        mobile_phone: &str,
        exclude_id: Option<i64>,
    ) -> Option<AppError> {
        let others = || self.rows.values().filter(move |c| Some(c.id) != exclude_id);
        if others().any(|c| c.email == email) {
            return Some(AppError::Duplicate {
                field: UniqueField::Email,
                value: email.to_string(),
            });
        }
        if others().any(|c| c.mobile_phone == mobile_phone) {
            return Some(AppError::Duplicate {
                field: UniqueField::MobilePhone,
                value: mobile_phone.to_string(),
            });
        }
        None
    }

    fn matching<'a>(&'a self, filter: &'a ListFilter) -> impl Iterator<Item = &'a Customer> + 'a {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        self.rows.values().filter(move |c| match &needle {
            None => true,
            Some(needle) => Customer::searchable_columns()
                .into_iter()
                .any(|col| column_text(c, col).to_lowercase().contains(needle.as_str())),
        })
    }
}

fn column_text(c: &Customer, column: &str) -> String {
    match column {
        "id" => c.id.to_string(),
        "name" => c.name.clone(),
        "email" => c.email.clone(),
        "mobile_phone" => c.mobile_phone.clone(),
        "created_at" => c.created_at.to_rfc3339(),
        _ => String::new(),
    }
}

fn compare(a: &Customer, b: &Customer, column: &str) -> Ordering {
    match column {
        "id" => a.id.cmp(&b.id),
        "created_at" => a.created_at.cmp(&b.created_at),
        other => column_text(a, other).cmp(&column_text(b, other)),
    }
}

#[derive(Debug, Default)]
pub struct MemoryCustomerRepository {
    store: RwLock<Store>,
}

impl MemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for MemoryCustomerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, AppError> {
        Ok(self.store.read().await.rows.get(&id).cloned())
    }

    async fn count_duplicates(&self, check: DuplicateCheck<'_>) -> Result<i64, AppError> {
        let store = self.store.read().await;
        let count = store
            .rows
            .values()
            .filter(|c| Some(c.id) != check.exclude_id)
            .filter(|c| match check.field {
                UniqueField::Email => c.email == check.value,
                UniqueField::MobilePhone => c.mobile_phone == check.value,
            })
            .count();
        Ok(count as i64)
    }

    async fn create(&self, input: &NewCustomer) -> Result<Customer, AppError> {
        let mut store = self.store.write().await;
        if let Some(err) = store.conflict(&input.email, &input.mobile_phone, None) {
            return Err(err);
        }

        store.next_id += 1;
        let now = Utc::now();
        let customer = Customer {
            id: store.next_id,
            name: input.name.clone(),
            email: input.email.clone(),
            mobile_phone: input.mobile_phone.clone(),
            password: input.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        store.rows.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, id: i64, changes: &CustomerChanges) -> Result<Customer, AppError> {
        let mut store = self.store.write().await;
        if !store.rows.contains_key(&id) {
            return Err(AppError::NotFound("Customer not found".to_string()));
        }
        if let Some(err) = store.conflict(&changes.email, &changes.mobile_phone, Some(id)) {
            return Err(err);
        }

        let customer = store
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;
        customer.name = changes.name.clone();
        customer.email = changes.email.clone();
        customer.mobile_phone = changes.mobile_phone.clone();
        if let Some(hash) = &changes.password_hash {
            customer.password = hash.clone();
        }
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        match self.store.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Customer not found".to_string())),
        }
    }

    async fn count(&self, filter: &ListFilter) -> Result<i64, AppError> {
        let store = self.store.read().await;
        Ok(store.matching(filter).count() as i64)
    }

    async fn fetch(
        &self,
        filter: &ListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Customer>, AppError> {
        let store = self.store.read().await;
        let mut rows: Vec<Customer> = store.matching(filter).cloned().collect();
        rows.sort_by(|a, b| {
            let primary = compare(a, b, filter.order.column);
            let primary = if filter.order.descending {
                primary.reverse()
            } else {
                primary
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listable::SortOrder;

    fn new_customer(n: u32) -> NewCustomer {
        NewCustomer {
            name: format!("Customer {n}"),
            email: format!("c{n}@example.com"),
            mobile_phone: format!("08120000{n:04}"),
            password_hash: "hash".to_string(),
        }
    }

    fn filter(search: Option<&str>, column: &'static str, descending: bool) -> ListFilter {
        ListFilter {
            search: search.map(String::from),
            order: SortOrder { column, descending },
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let repo = MemoryCustomerRepository::new();
        let a = repo.create(&new_customer(1)).await.unwrap();
        let b = repo.create(&new_customer(2)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.find_by_id(2).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let repo = MemoryCustomerRepository::new();
        repo.create(&new_customer(1)).await.unwrap();
        let mut dup = new_customer(2);
        dup.email = "c1@example.com".to_string();
        let err = repo.create(&dup).await.unwrap_err();
        assert!(err.is_duplicate(UniqueField::Email));
    }

    #[tokio::test]
    async fn duplicate_count_excludes_given_id() {
        let repo = MemoryCustomerRepository::new();
        let a = repo.create(&new_customer(1)).await.unwrap();
        let check = DuplicateCheck::new(UniqueField::Email, "c1@example.com");
        assert_eq!(repo.count_duplicates(check).await.unwrap(), 1);
        assert_eq!(repo.count_duplicates(check.excluding(a.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_keeps_hash_when_none() {
        let repo = MemoryCustomerRepository::new();
        let a = repo.create(&new_customer(1)).await.unwrap();
        let changes = CustomerChanges {
            name: "Renamed".to_string(),
            email: a.email.clone(),
            mobile_phone: a.mobile_phone.clone(),
            password_hash: None,
        };
        let updated = repo.update(a.id, &changes).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.password, "hash");
        assert_eq!(updated.created_at, a.created_at);
    }

    #[tokio::test]
    async fn update_and_delete_missing_row() {
        let repo = MemoryCustomerRepository::new();
        let changes = CustomerChanges {
            name: "x".to_string(),
            email: "x@example.com".to_string(),
            mobile_phone: "081234567".to_string(),
            password_hash: None,
        };
        assert!(repo.update(9, &changes).await.unwrap_err().is_not_found());
        assert!(repo.delete(9).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_columns() {
        let repo = MemoryCustomerRepository::new();
        for n in 1..=3 {
            repo.create(&new_customer(n)).await.unwrap();
        }
        assert_eq!(repo.count(&filter(Some("CUSTOMER 2"), "id", false)).await.unwrap(), 1);
        assert_eq!(repo.count(&filter(Some("0003"), "id", false)).await.unwrap(), 1);
        assert_eq!(repo.count(&filter(Some("zzz"), "id", false)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fetch_orders_and_windows() {
        let repo = MemoryCustomerRepository::new();
        for n in 1..=5 {
            repo.create(&new_customer(n)).await.unwrap();
        }
        let rows = repo.fetch(&filter(None, "id", true), 1, 2).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }
}
