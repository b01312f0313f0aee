//! Game server session
//!
//! A session owns the TCP connection to a game server: it performs the
//! login handshake, subscribes the enabled services, and then drives a read
//! loop that publishes exchange payloads. Transport failures after a
//! successful login are retried forever with backoff; a rejected login is
//! terminal.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::client::feed::ExchangePublisher;
use crate::client::protocol::{ClientMessage, Language, ServerMessage, Service};
use crate::client::ClientError;
use crate::utils::ReconnectPolicy;

/// Interval between keepalive pings on an idle connection
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

pub(crate) type Connection = Framed<TcpStream, LengthDelimitedCodec>;

/// Everything a session needs to (re)establish itself
#[derive(Debug, Clone)]
pub(crate) struct SessionConfig {
    pub addr: String,
    pub username: String,
    pub password: String,
    pub language: Language,
    pub services: Vec<Service>,
}

pub(crate) struct Session {
    config: SessionConfig,
    publisher: ExchangePublisher,
    policy: ReconnectPolicy,
}

impl Session {
    pub(crate) fn new(
        config: SessionConfig,
        publisher: ExchangePublisher,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            config,
            publisher,
            policy,
        }
    }

    /// Open a connection, log in, and subscribe the enabled services
    pub(crate) async fn establish(&self) -> Result<Connection, ClientError> {
        tracing::debug!(addr = %self.config.addr, "Connecting to game server");

        let stream = TcpStream::connect(&self.config.addr).await?;
        let mut conn = Framed::new(stream, LengthDelimitedCodec::new());

        self.send(
            &mut conn,
            &ClientMessage::Login {
                username: self.config.username.clone(),
                password: self.config.password.clone(),
                language: self.config.language,
            },
        )
        .await?;

        match self.recv(&mut conn).await? {
            ServerMessage::LoginOk => {
                tracing::info!(username = %self.config.username, "Logged in to game server");
            }
            ServerMessage::LoginFailed { reason } => {
                return Err(ClientError::LoginRejected(reason));
            }
            other => {
                return Err(ClientError::Protocol(format!(
                    "expected a login reply, got {:?}",
                    other
                )));
            }
        }

        for service in &self.config.services {
            self.send(&mut conn, &ClientMessage::Subscribe { service: *service })
                .await?;
        }

        Ok(conn)
    }

    /// Drive an established connection, reconnecting on transport failures.
    ///
    /// Returns when a reconnect attempt gets its login rejected: the
    /// credentials went stale and retrying cannot help.
    pub(crate) async fn run(self, mut conn: Connection) {
        loop {
            self.publisher.set_connected(true);
            if let Err(e) = self.drive(conn).await {
                tracing::warn!(error = %e, "Game server connection lost");
            }
            self.publisher.set_connected(false);

            match self.reconnect().await {
                Some(c) => conn = c,
                None => return,
            }
        }
    }

    /// Read loop for one connection, with periodic keepalives
    async fn drive(&self, conn: Connection) -> Result<(), ClientError> {
        let (mut sink, mut stream) = conn.split();
        let mut keepalive = interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = stream.next() => {
                    let frame = frame.ok_or(ClientError::ConnectionClosed)??;
                    let message: ServerMessage = serde_json::from_slice(&frame)?;

                    self.handle(message)?;
                }
                _ = keepalive.tick() => {
                    let payload = serde_json::to_vec(&ClientMessage::Ping)?;
                    sink.send(Bytes::from(payload)).await?;
                }
            }
        }
    }

    fn handle(&self, message: ServerMessage) -> Result<(), ClientError> {
        match message {
            ServerMessage::ExchangeOpen { market } => {
                tracing::info!(last_price = market.last_price, "Exchange feed opened");
                self.publisher.publish(market);
            }
            ServerMessage::ExchangeUpdate { market } => {
                tracing::debug!(last_price = market.last_price, "Exchange market updated");
                self.publisher.publish(market);
            }
            ServerMessage::Subscribed { service } => {
                tracing::debug!(service = ?service, "Subscription acknowledged");
            }
            ServerMessage::Pong => {}
            other => {
                return Err(ClientError::Protocol(format!(
                    "unexpected message: {:?}",
                    other
                )));
            }
        }
        Ok(())
    }

    /// Retry [`Session::establish`] forever with backoff.
    ///
    /// `None` means a reconnect login was rejected and the session must end.
    async fn reconnect(&self) -> Option<Connection> {
        for attempt in 0u32.. {
            let delay = self.policy.delay_for(attempt);

            tracing::info!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to game server"
            );
            sleep(delay).await;

            match self.establish().await {
                Ok(conn) => return Some(conn),
                Err(ClientError::LoginRejected(reason)) => {
                    tracing::error!(reason = %reason, "Login rejected during reconnect, giving up");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Reconnect attempt failed");
                }
            }
        }
        None
    }

    async fn send(&self, conn: &mut Connection, message: &ClientMessage) -> Result<(), ClientError> {
        let payload = serde_json::to_vec(message)?;
        conn.send(Bytes::from(payload)).await?;
        Ok(())
    }

    async fn recv(&self, conn: &mut Connection) -> Result<ServerMessage, ClientError> {
        let frame = conn
            .next()
            .await
            .ok_or(ClientError::ConnectionClosed)??;

        Ok(serde_json::from_slice(&frame)?)
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{spawn, FakeServer};
    use super::*;
    use crate::client::feed;
    use crate::models::Market;

    fn sample_market() -> Market {
        Market {
            last_price: 6450,
            buy_offers: vec![],
            sell_offers: vec![],
        }
    }

    fn session_for(addr: String) -> (Session, crate::client::ExchangeFeed) {
        let (publisher, feed) = feed::channel();
        let config = SessionConfig {
            addr,
            username: "knight".to_string(),
            password: "hunter2".to_string(),
            language: Language::English,
            services: vec![Service::Exchange],
        };

        (
            Session::new(config, publisher, ReconnectPolicy::default()),
            feed,
        )
    }

    #[tokio::test]
    async fn test_establish_logs_in_and_subscribes() {
        let addr = spawn(FakeServer::ServeMarket(sample_market())).await;
        let (session, _feed) = session_for(addr);

        assert!(session.establish().await.is_ok());
    }

    #[tokio::test]
    async fn test_establish_surfaces_rejected_login() {
        let addr = spawn(FakeServer::RejectLogin("bad credentials")).await;
        let (session, _feed) = session_for(addr);

        match session.establish().await {
            Err(ClientError::LoginRejected(reason)) => assert_eq!(reason, "bad credentials"),
            other => panic!("expected a rejected login, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_run_publishes_the_exchange_feed() {
        let addr = spawn(FakeServer::ServeMarket(sample_market())).await;
        let (session, feed) = session_for(addr);

        let conn = session.establish().await.unwrap();
        tokio::spawn(session.run(conn));

        // The fake server sends ExchangeOpen right after the subscribe ack
        for _ in 0..100 {
            if feed.has_market() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let snapshot = feed.latest().expect("no market published");
        assert_eq!(snapshot.market.last_price, 6450);
        assert!(feed.is_connected());
    }
}
