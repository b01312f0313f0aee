//! Exchange market entities
//!
//! The exchange trades crowns against lots of 100 energy. The market object
//! carries the last trade price and the five best offers on each side.
//!
//! Field names serialize in the camelCase the upstream service uses, so the
//! JSON served by the gateway matches the objects the game client sees.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single market offer: a price in crowns for 100 energy, and the volume
/// available at that price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Offer {
    /// Price in crowns for one lot of 100 energy
    pub price: u32,

    /// Number of lots offered at this price
    pub volume: u32,
}

/// The current state of the exchange market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Price of the last completed trade
    pub last_price: u32,

    /// The 5 best buy offers, best first
    pub buy_offers: Vec<Offer>,

    /// The 5 best sell offers, best first
    pub sell_offers: Vec<Offer>,
}
