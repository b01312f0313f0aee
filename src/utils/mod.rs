//! Utility modules

pub mod retry;

pub use retry::ReconnectPolicy;
