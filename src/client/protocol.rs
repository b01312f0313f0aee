//! Wire messages exchanged with the game servers
//!
//! Frames are length-delimited JSON. Both directions use tagged enums so a
//! frame identifies itself; unknown server frames are a protocol error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Market;

/// Game server region.
///
/// Each region has a default game server endpoint; deployments can override
/// it with `SK_SERVER_ADDR` when the servers move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    UsEast,
    UsWest,
    EuWest,
}

impl Region {
    /// Default `host:port` of the region's game server
    pub fn default_addr(&self) -> &'static str {
        match self {
            Region::UsEast => "game-us-east.spiralknights.com:4730",
            Region::UsWest => "game-us-west.spiralknights.com:4730",
            Region::EuWest => "game-eu-west.spiralknights.com:4730",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::UsEast => write!(f, "us-east"),
            Region::UsWest => write!(f, "us-west"),
            Region::EuWest => write!(f, "eu-west"),
        }
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us-east" | "us_east" => Ok(Region::UsEast),
            "us-west" | "us_west" => Ok(Region::UsWest),
            "eu-west" | "eu_west" => Ok(Region::EuWest),
            _ => anyhow::bail!("Invalid region: {}. Expected: us-east, us-west, or eu-west", s),
        }
    }
}

/// Language requested for the session.
///
/// The exchange feed is language independent, but the login handshake
/// declares one like any other client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    French,
    German,
    Spanish,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::French => write!(f, "french"),
            Language::German => write!(f, "german"),
            Language::Spanish => write!(f, "spanish"),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "french" | "fr" => Ok(Language::French),
            "german" | "de" => Ok(Language::German),
            "spanish" | "es" => Ok(Language::Spanish),
            _ => anyhow::bail!(
                "Invalid language: {}. Expected: english, french, german, or spanish",
                s
            ),
        }
    }
}

/// Server-side data feeds a session can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// The crowns/energy exchange market feed
    Exchange,
}

/// Messages from the headless client to the game server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Authenticate the session
    Login {
        username: String,
        password: String,
        language: Language,
    },
    /// Subscribe to a service feed
    Subscribe { service: Service },
    /// Keepalive ping
    Ping,
}

/// Messages from the game server to the headless client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Login accepted
    LoginOk,
    /// Login rejected, the session will be closed
    LoginFailed { reason: String },
    /// Subscription acknowledged
    Subscribed { service: Service },
    /// Full market object, sent once after subscribing to the exchange feed
    ExchangeOpen { market: Market },
    /// Market changed
    ExchangeUpdate { market: Market },
    /// Keepalive reply
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parsing() {
        assert_eq!("eu-west".parse::<Region>().unwrap(), Region::EuWest);
        assert_eq!("US_EAST".parse::<Region>().unwrap(), Region::UsEast);
        assert!("mars".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_default_addr() {
        assert!(Region::EuWest.default_addr().ends_with(":4730"));
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("German".parse::<Language>().unwrap(), Language::German);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_client_message_tagging() {
        let msg = ClientMessage::Subscribe {
            service: Service::Exchange,
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "Subscribe");
        assert_eq!(json["service"], "exchange");
    }

    #[test]
    fn test_server_message_decoding() {
        let json = r#"{
            "type": "ExchangeUpdate",
            "market": {
                "lastPrice": 6500,
                "buyOffers": [],
                "sellOffers": []
            }
        }"#;

        match serde_json::from_str::<ServerMessage>(json).unwrap() {
            ServerMessage::ExchangeUpdate { market } => assert_eq!(market.last_price, 6500),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
