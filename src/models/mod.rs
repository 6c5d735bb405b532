//! Database models and DTOs.

pub mod customer;
pub mod listable;
