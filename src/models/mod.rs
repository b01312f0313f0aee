//! Entities exchanged with the game servers and served over HTTP.

pub mod market;

pub use market::{Market, Offer};
