//! Exchange feed: the read side of the market cache
//!
//! The session task publishes every market payload it receives; HTTP
//! handlers read the latest snapshot through [`ExchangeFeed`]. The channel
//! holds `None` until the first exchange event arrives.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::Market;

/// A market object together with the time it was received
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub market: Market,
    pub received_at: DateTime<Utc>,
}

/// Create a connected publisher/feed pair
pub fn channel() -> (ExchangePublisher, ExchangeFeed) {
    let (tx, rx) = watch::channel(None);
    let connected = Arc::new(AtomicBool::new(false));

    (
        ExchangePublisher {
            tx,
            connected: connected.clone(),
        },
        ExchangeFeed { rx, connected },
    )
}

/// Write side, owned by the session task
#[derive(Debug, Clone)]
pub struct ExchangePublisher {
    tx: watch::Sender<Option<MarketSnapshot>>,
    connected: Arc<AtomicBool>,
}

impl ExchangePublisher {
    /// Publish a new market snapshot, replacing the previous one
    pub fn publish(&self, market: Market) {
        self.tx.send_replace(Some(MarketSnapshot {
            market,
            received_at: Utc::now(),
        }));
    }

    /// Record whether the session currently holds a live connection
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

/// Read side, shared with the HTTP handlers via application state
#[derive(Debug, Clone)]
pub struct ExchangeFeed {
    rx: watch::Receiver<Option<MarketSnapshot>>,
    connected: Arc<AtomicBool>,
}

impl ExchangeFeed {
    /// The most recent market snapshot, if any has been received yet
    pub fn latest(&self) -> Option<MarketSnapshot> {
        self.rx.borrow().clone()
    }

    /// Whether at least one market snapshot has been received
    pub fn has_market(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Whether the session currently holds a live connection
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_market(last_price: u32) -> Market {
        Market {
            last_price,
            buy_offers: vec![],
            sell_offers: vec![],
        }
    }

    #[test]
    fn test_feed_is_empty_until_first_publish() {
        let (publisher, feed) = channel();

        assert!(!feed.has_market());
        assert!(feed.latest().is_none());

        publisher.publish(empty_market(100));
        assert!(feed.has_market());
        assert_eq!(feed.latest().unwrap().market.last_price, 100);
    }

    #[test]
    fn test_feed_sees_latest_publish() {
        let (publisher, feed) = channel();

        publisher.publish(empty_market(100));
        publisher.publish(empty_market(200));

        assert_eq!(feed.latest().unwrap().market.last_price, 200);
    }

    #[test]
    fn test_connected_flag_is_shared() {
        let (publisher, feed) = channel();

        assert!(!feed.is_connected());
        publisher.set_connected(true);
        assert!(feed.is_connected());
        publisher.set_connected(false);
        assert!(!feed.is_connected());
    }
}
