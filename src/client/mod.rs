//! Headless client for the game's network protocol
//!
//! This module maintains a live session against a game server without any
//! of the game's UI: it logs in, subscribes service feeds, and publishes
//! what it receives. The gateway only enables the exchange service, but the
//! builder keeps the service set explicit the way the upstream client does.

pub mod feed;
pub mod protocol;
mod session;

pub use feed::{ExchangeFeed, MarketSnapshot};
pub use protocol::{Language, Region, Service};

use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::client::feed::ExchangePublisher;
use crate::client::session::{Session, SessionConfig};
use crate::utils::ReconnectPolicy;

/// Errors produced by the headless client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("This client is already connected")]
    AlreadyConnected,

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Builder for [`SkClient`]
pub struct SkClientBuilder {
    username: String,
    password: String,
    region: Region,
    language: Language,
    services: Vec<Service>,
    server_addr: Option<String>,
    policy: ReconnectPolicy,
}

impl SkClientBuilder {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            region: Region::EuWest,
            language: Language::English,
            services: Vec::new(),
            server_addr: None,
            policy: ReconnectPolicy::default(),
        }
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Enable a service feed. At least one service must be enabled.
    pub fn enable_service(mut self, service: Service) -> Self {
        if !self.services.contains(&service) {
            self.services.push(service);
        }
        self
    }

    /// Override the region's default game server endpoint
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.server_addr = Some(addr.into());
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<SkClient, ClientError> {
        if self.username.is_empty() {
            return Err(ClientError::InvalidConfig(
                "username must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(ClientError::InvalidConfig(
                "password must not be empty".to_string(),
            ));
        }
        if self.services.is_empty() {
            return Err(ClientError::InvalidConfig(
                "at least one service must be enabled".to_string(),
            ));
        }

        let addr = self
            .server_addr
            .unwrap_or_else(|| self.region.default_addr().to_string());
        let (publisher, feed) = feed::channel();

        Ok(SkClient {
            config: SessionConfig {
                addr,
                username: self.username,
                password: self.password,
                language: self.language,
                services: self.services,
            },
            policy: self.policy,
            publisher,
            feed,
            started: AtomicBool::new(false),
        })
    }
}

/// A headless game client bound to one account and one region
pub struct SkClient {
    config: SessionConfig,
    policy: ReconnectPolicy,
    publisher: ExchangePublisher,
    feed: ExchangeFeed,
    started: AtomicBool,
}

impl SkClient {
    /// The read side of the exchange feed, for sharing with handlers
    pub fn feed(&self) -> ExchangeFeed {
        self.feed.clone()
    }

    /// Whether the session currently holds a live connection
    pub fn is_connected(&self) -> bool {
        self.feed.is_connected()
    }

    /// Bring the client online.
    ///
    /// The login handshake completes before this returns, so credential
    /// problems surface at startup. A background task then owns the
    /// connection and reconnects on transport failures.
    pub async fn connect(&self) -> Result<(), ClientError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyConnected);
        }

        let session = Session::new(
            self.config.clone(),
            self.publisher.clone(),
            self.policy.clone(),
        );

        let conn = match session.establish().await {
            Ok(conn) => conn,
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        tokio::spawn(session.run(conn));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::session::testutil::{spawn, FakeServer};
    use super::*;
    use crate::models::Market;

    fn builder() -> SkClientBuilder {
        SkClientBuilder::new("knight", "hunter2").enable_service(Service::Exchange)
    }

    #[test]
    fn test_build_rejects_empty_credentials() {
        let result = SkClientBuilder::new("", "hunter2")
            .enable_service(Service::Exchange)
            .build();
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));

        let result = SkClientBuilder::new("knight", "")
            .enable_service(Service::Exchange)
            .build();
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_rejects_empty_service_set() {
        let result = SkClientBuilder::new("knight", "hunter2").build();
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_enable_service_deduplicates() {
        let client = builder().enable_service(Service::Exchange).build().unwrap();
        assert_eq!(client.config.services, vec![Service::Exchange]);
    }

    #[test]
    fn test_server_addr_overrides_region_default() {
        let client = builder().server_addr("127.0.0.1:9999").build().unwrap();
        assert_eq!(client.config.addr, "127.0.0.1:9999");

        let client = builder().region(Region::UsEast).build().unwrap();
        assert_eq!(client.config.addr, Region::UsEast.default_addr());
    }

    #[tokio::test]
    async fn test_connect_twice_fails() {
        let addr = spawn(FakeServer::ServeMarket(Market {
            last_price: 1,
            buy_offers: vec![],
            sell_offers: vec![],
        }))
        .await;

        let client = builder().server_addr(addr).build().unwrap();
        client.connect().await.unwrap();

        assert!(matches!(
            client.connect().await,
            Err(ClientError::AlreadyConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_fails_on_rejected_login() {
        let addr = spawn(FakeServer::RejectLogin("bad credentials")).await;
        let client = builder().server_addr(addr).build().unwrap();

        assert!(matches!(
            client.connect().await,
            Err(ClientError::LoginRejected(_))
        ));
        // A failed connect leaves the client usable for another attempt
        assert!(!client.started.load(Ordering::SeqCst));
    }
}
