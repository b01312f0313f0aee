//! Error types module

pub mod types;

pub use types::{ApiError, ErrorDetail, ErrorResponse};
