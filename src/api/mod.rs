//! API endpoint handlers module

pub mod exchange;
pub mod health;
