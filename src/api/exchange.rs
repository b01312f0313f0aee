//! Exchange market endpoints
//!
//! These routes serve the cached market object maintained by the headless
//! client. Until the first exchange event arrives they answer 503 with a
//! structured error body.

use axum::{extract::State, Json};

use crate::client::MarketSnapshot;
use crate::error::{ApiError, ErrorResponse};
use crate::models::{Market, Offer};
use crate::server::state::AppState;

fn latest_snapshot(state: &AppState) -> Result<MarketSnapshot, ApiError> {
    state.exchange.latest().ok_or(ApiError::MarketUnavailable)
}

/// GET /exchange/market - The current exchange market object
#[utoipa::path(
    get,
    path = "/exchange/market",
    operation_id = "exchange_market",
    tag = "Exchange Market",
    responses(
        (status = 200, description = "The exchange market object.", body = Market),
        (status = 503, description = "No market snapshot has been received yet.", body = ErrorResponse),
    )
)]
pub async fn market(State(state): State<AppState>) -> Result<Json<Market>, ApiError> {
    let snapshot = latest_snapshot(&state)?;

    Ok(Json(snapshot.market))
}

/// GET /exchange/market/lastPrice - The last trade price, as plain text
#[utoipa::path(
    get,
    path = "/exchange/market/lastPrice",
    operation_id = "exchange_market_lastPrice",
    tag = "Exchange Market",
    responses(
        (status = 200, description = "The last price.", body = String, content_type = "text/plain"),
        (status = 503, description = "No market snapshot has been received yet.", body = ErrorResponse),
    )
)]
pub async fn last_price(State(state): State<AppState>) -> Result<String, ApiError> {
    let snapshot = latest_snapshot(&state)?;

    Ok(snapshot.market.last_price.to_string())
}

/// GET /exchange/market/buyOffers - The 5 best buy offers
#[utoipa::path(
    get,
    path = "/exchange/market/buyOffers",
    operation_id = "exchange_market_buyOffers",
    tag = "Exchange Market",
    responses(
        (status = 200, description = "The 5 best buy offers.", body = [Offer]),
        (status = 503, description = "No market snapshot has been received yet.", body = ErrorResponse),
    )
)]
pub async fn buy_offers(State(state): State<AppState>) -> Result<Json<Vec<Offer>>, ApiError> {
    let snapshot = latest_snapshot(&state)?;

    Ok(Json(snapshot.market.buy_offers))
}

/// GET /exchange/market/sellOffers - The 5 best sell offers
#[utoipa::path(
    get,
    path = "/exchange/market/sellOffers",
    operation_id = "exchange_market_sellOffers",
    tag = "Exchange Market",
    responses(
        (status = 200, description = "The 5 best sell offers.", body = [Offer]),
        (status = 503, description = "No market snapshot has been received yet.", body = ErrorResponse),
    )
)]
pub async fn sell_offers(State(state): State<AppState>) -> Result<Json<Vec<Offer>>, ApiError> {
    let snapshot = latest_snapshot(&state)?;

    Ok(Json(snapshot.market.sell_offers))
}
