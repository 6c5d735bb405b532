//! Business logic services.

pub mod customer;
pub mod password;
