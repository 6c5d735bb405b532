//! Customer model, request payloads and the external response shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::listable::{FieldSpec, Listable};

/// Full customer row from database; carries the password hash and is never serialized.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile_phone: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for Customer {
    const TABLE: &'static str = "customers";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::sortable("id"),
        FieldSpec::searchable("name"),
        FieldSpec::searchable("email"),
        FieldSpec::searchable("mobile_phone"),
        FieldSpec::sortable("created_at"),
    ];
    const DEFAULT_ORDER: &'static str = "id";
}

/// Customer response DTO. Excludes the password hash and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(rename = "mobilePhone")]
    pub mobile_phone: String,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            mobile_phone: c.mobile_phone,
        }
    }
}

/// Body of `POST /customer`. Missing fields decode as empty and fail validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StoreCustomer {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 100), email)]
    pub email: String,
    #[validate(length(min = 9, max = 14))]
    pub mobile_phone: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body of `PUT /customer/{id}`. An absent or empty password keeps the stored hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 100), email)]
    pub email: String,
    #[validate(length(min = 9, max = 14))]
    pub mobile_phone: String,
    pub password: Option<String>,
}

impl UpdateCustomer {
    /// The new plaintext password, if one was supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Insert payload with the password already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub mobile_phone: String,
    pub password_hash: String,
}

/// Update payload; `password_hash: None` leaves the stored hash untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerChanges {
    pub name: String,
    pub email: String,
    pub mobile_phone: String,
    pub password_hash: Option<String>,
}
