//! Application state container
//!
//! The shared state passed to all request handlers via axum's state
//! extraction. Cheaply cloneable and thread-safe.

use std::sync::Arc;
use std::time::Instant;

use crate::client::ExchangeFeed;
use crate::config::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Read side of the headless client's exchange feed
    pub exchange: ExchangeFeed,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, exchange: ExchangeFeed) -> Self {
        Self {
            settings,
            exchange,
            start_time: Instant::now(),
        }
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
