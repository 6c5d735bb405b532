//! Customer use cases: create, read, update, delete and paginated listing.

use async_trait::async_trait;
use axum::http::Uri;
use validator::Validate;

use crate::errors::{AppError, UniqueField};
use crate::models::customer::{
    Customer, CustomerChanges, CustomerResponse, NewCustomer, StoreCustomer, UpdateCustomer,
};
use crate::models::listable::ListFilter;
use crate::pagination::{ListParams, Page, PageSource, Paginator};
use crate::repository::{CustomerRepository, DuplicateCheck};
use crate::services::password::hash_password;

/// Filtered view of the customer table handed to the paginator.
struct CustomerPage<'a> {
    repo: &'a dyn CustomerRepository,
    filter: ListFilter,
}

#[async_trait]
impl PageSource for CustomerPage<'_> {
    type Item = Customer;

    async fn count(&self) -> Result<i64, AppError> {
        self.repo.count(&self.filter).await
    }

    async fn fetch(&self, offset: i64, limit: i64) -> Result<Vec<Customer>, AppError> {
        self.repo.fetch(&self.filter, offset, limit).await
    }
}

/// Reject the write if another customer already owns the email or phone.
/// Email is checked first; only the first conflict is reported.
async fn ensure_unique(
    repo: &dyn CustomerRepository,
    email: &str,
    mobile_phone: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    for (field, value) in [
        (UniqueField::Email, email),
        (UniqueField::MobilePhone, mobile_phone),
    ] {
        let mut check = DuplicateCheck::new(field, value);
        if let Some(id) = exclude_id {
            check = check.excluding(id);
        }
        if repo.count_duplicates(check).await? > 0 {
            tracing::warn!(field = field.as_str(), "Rejected duplicate customer value");
            return Err(AppError::Duplicate {
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

async fn find_customer(repo: &dyn CustomerRepository, id: i64) -> Result<Customer, AppError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer {id} not found")))
}

/// Register a new customer.
pub async fn store(
    repo: &dyn CustomerRepository,
    input: StoreCustomer,
) -> Result<CustomerResponse, AppError> {
    input.validate()?;

    let password_hash = hash_password(&input.password).await?;
    ensure_unique(repo, &input.email, &input.mobile_phone, None).await?;

    let customer = repo
        .create(&NewCustomer {
            name: input.name,
            email: input.email,
            mobile_phone: input.mobile_phone,
            password_hash,
        })
        .await?;

    tracing::info!(customer_id = customer.id, "Customer created");
    Ok(customer.into())
}

/// Overwrite a customer's profile. The password is replaced only when a
/// non-empty one is supplied.
pub async fn update(
    repo: &dyn CustomerRepository,
    id: i64,
    input: UpdateCustomer,
) -> Result<CustomerResponse, AppError> {
    input.validate()?;
    find_customer(repo, id).await?;

    let password_hash = match input.new_password() {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };
    ensure_unique(repo, &input.email, &input.mobile_phone, Some(id)).await?;

    let customer = repo
        .update(
            id,
            &CustomerChanges {
                name: input.name,
                email: input.email,
                mobile_phone: input.mobile_phone,
                password_hash,
            },
        )
        .await?;

    tracing::info!(customer_id = id, "Customer updated");
    Ok(customer.into())
}

pub async fn find_by_id(
    repo: &dyn CustomerRepository,
    id: i64,
) -> Result<CustomerResponse, AppError> {
    Ok(find_customer(repo, id).await?.into())
}

pub async fn delete(repo: &dyn CustomerRepository, id: i64) -> Result<(), AppError> {
    find_customer(repo, id).await?;
    repo.delete(id).await?;
    tracing::info!(customer_id = id, "Customer deleted");
    Ok(())
}

/// One page of customers matching `params`, with links built from `request_uri`.
pub async fn list(
    repo: &dyn CustomerRepository,
    params: &ListParams,
    request_uri: &Uri,
) -> Result<Page<CustomerResponse>, AppError> {
    let source = CustomerPage {
        repo,
        filter: ListFilter::for_entity::<Customer>(params),
    };
    let page = Paginator::new(params.page, params.size)
        .find(&source, request_uri)
        .await?;
    Ok(page.map(CustomerResponse::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldRule;
    use crate::repository::MemoryCustomerRepository;
    use crate::services::password::verify_password;

    fn store_request(n: u32) -> StoreCustomer {
        StoreCustomer {
            name: format!("Pelanggan {n}"),
            email: format!("pelanggan{n}@example.com"),
            mobile_phone: format!("0812345{n:05}"),
            password: "rahasia".to_string(),
        }
    }

    fn update_request(from: &StoreCustomer, password: Option<&str>) -> UpdateCustomer {
        UpdateCustomer {
            name: from.name.clone(),
            email: from.email.clone(),
            mobile_phone: from.mobile_phone.clone(),
            password: password.map(String::from),
        }
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn store_hashes_password() {
        let repo = MemoryCustomerRepository::new();
        let created = store(&repo, store_request(1)).await.unwrap();
        assert_eq!(created.email, "pelanggan1@example.com");

        let row = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_ne!(row.password, "rahasia");
        assert!(verify_password("rahasia", &row.password).unwrap());
    }

    #[tokio::test]
    async fn store_rejects_invalid_input_before_touching_storage() {
        let repo = MemoryCustomerRepository::new();
        let mut input = store_request(1);
        input.email = "bukan-email".to_string();
        input.mobile_phone = "0812".to_string();

        let err = store(&repo, input).await.unwrap_err();
        let AppError::Validation(violations) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].rule, FieldRule::Email);
        assert_eq!(violations[1].rule, FieldRule::Min(9));
        assert_eq!(repo.count(&ListFilter::for_entity::<Customer>(&ListParams::default())).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn second_store_with_same_email_fails_and_persists_nothing() {
        let repo = MemoryCustomerRepository::new();
        store(&repo, store_request(1)).await.unwrap();

        let mut dup = store_request(2);
        dup.email = "pelanggan1@example.com".to_string();
        let err = store(&repo, dup).await.unwrap_err();
        assert!(err.is_duplicate(UniqueField::Email));

        let all = ListFilter::for_entity::<Customer>(&ListParams::default());
        assert_eq!(repo.count(&all).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn email_conflict_is_reported_before_phone_conflict() {
        let repo = MemoryCustomerRepository::new();
        store(&repo, store_request(1)).await.unwrap();

        let err = store(&repo, store_request(1)).await.unwrap_err();
        assert!(err.is_duplicate(UniqueField::Email));

        let mut phone_only = store_request(2);
        phone_only.mobile_phone = store_request(1).mobile_phone;
        let err = store(&repo, phone_only).await.unwrap_err();
        assert!(err.is_duplicate(UniqueField::MobilePhone));
    }

    #[tokio::test]
    async fn update_with_empty_password_keeps_hash() {
        let repo = MemoryCustomerRepository::new();
        let input = store_request(1);
        let created = store(&repo, input.clone()).await.unwrap();
        let before = repo.find_by_id(created.id).await.unwrap().unwrap().password;

        for password in [None, Some("")] {
            let mut request = update_request(&input, password);
            request.name = "Nama Baru".to_string();
            let updated = update(&repo, created.id, request).await.unwrap();
            assert_eq!(updated.name, "Nama Baru");
            let after = repo.find_by_id(created.id).await.unwrap().unwrap().password;
            assert_eq!(after, before);
        }
    }

    #[tokio::test]
    async fn update_with_new_password_rehashes() {
        let repo = MemoryCustomerRepository::new();
        let input = store_request(1);
        let created = store(&repo, input.clone()).await.unwrap();

        update(&repo, created.id, update_request(&input, Some("baru123")))
            .await
            .unwrap();
        let row = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert!(verify_password("baru123", &row.password).unwrap());
        assert!(!verify_password("rahasia", &row.password).unwrap());
    }

    #[tokio::test]
    async fn update_to_own_email_succeeds_and_to_other_email_fails() {
        let repo = MemoryCustomerRepository::new();
        let first = store_request(1);
        let second = store_request(2);
        let a = store(&repo, first.clone()).await.unwrap();
        store(&repo, second.clone()).await.unwrap();

        assert!(update(&repo, a.id, update_request(&first, None)).await.is_ok());

        let mut stolen = update_request(&first, None);
        stolen.email = second.email.clone();
        let err = update(&repo, a.id, stolen).await.unwrap_err();
        assert!(err.is_duplicate(UniqueField::Email));
    }

    #[tokio::test]
    async fn update_missing_customer_is_not_found() {
        let repo = MemoryCustomerRepository::new();
        let err = update(&repo, 42, update_request(&store_request(1), None))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_then_fetch_is_not_found() {
        let repo = MemoryCustomerRepository::new();
        let created = store(&repo, store_request(1)).await.unwrap();

        delete(&repo, created.id).await.unwrap();
        assert!(find_by_id(&repo, created.id).await.unwrap_err().is_not_found());
        assert!(delete(&repo, created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_paginates_and_links() {
        let repo = MemoryCustomerRepository::new();
        for n in 1..=12 {
            store(&repo, store_request(n)).await.unwrap();
        }
        let params = ListParams {
            page: 2,
            size: 5,
            ..Default::default()
        };
        let page = list(&repo, &params, &uri("/api/v1/customers?page=2&size=5"))
            .await
            .unwrap();

        let ids: Vec<i64> = page.records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![6, 7, 8, 9, 10]);
        assert_eq!(page.pagination.total, 12);
        assert_eq!(page.pagination.max_page, 3);
        assert_eq!(page.pagination.links.next, "/api/v1/customers?page=3&size=5");
    }

    #[tokio::test]
    async fn list_search_matches_any_searchable_field() {
        let repo = MemoryCustomerRepository::new();
        let mut foo = store_request(1);
        foo.name = "Toko FOObar".to_string();
        store(&repo, foo).await.unwrap();
        let mut by_email = store_request(2);
        by_email.email = "xfoo@example.com".to_string();
        store(&repo, by_email).await.unwrap();
        store(&repo, store_request(3)).await.unwrap();

        let params = ListParams {
            search: Some("foo".to_string()),
            ..Default::default()
        };
        let page = list(&repo, &params, &uri("/api/v1/customers?search=foo"))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.records.len(), 2);
    }

    #[tokio::test]
    async fn list_orders_descending() {
        let repo = MemoryCustomerRepository::new();
        for n in 1..=3 {
            store(&repo, store_request(n)).await.unwrap();
        }
        let params = ListParams {
            order_by: Some("-id".to_string()),
            ..Default::default()
        };
        let page = list(&repo, &params, &uri("/api/v1/customers")).await.unwrap();
        let ids: Vec<i64> = page.records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
