//! Configuration management module
//!
//! Loads application configuration from environment variables and an
//! optional `.env` file in the working directory.

pub mod settings;

pub use settings::{load_env_file, Environment, Settings};
