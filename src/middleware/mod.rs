//! Request extractors and tower layers.

pub mod context;
pub mod request_id;
