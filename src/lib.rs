//! Spiral Knights unofficial public REST API
//!
//! A headless client keeps a session with the game's servers and caches the
//! live exchange market; the HTTP layer serves that cache as JSON.

// Public modules
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::ApiError;
pub use server::App;
