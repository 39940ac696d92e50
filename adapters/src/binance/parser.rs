//! Binance ticker stream parser.
//!
//! The raw stream interleaves subscription acks (`{"result":null,"id":1}`)
//! with `24hrTicker` events. Combined streams wrap events as
//! `{"stream": "...", "data": {...}}`; both shapes are accepted.

use chrono::{DateTime, Utc};
use corelib::{Asset, PriceTick};
use serde_json::{Value, json};

use super::SOURCE;
use super::types::{RestTicker, TickerEvent};
use crate::feed::FeedError;
use crate::numeric::parse_decimal;

#[derive(Debug, PartialEq)]
pub enum BinanceMessage {
    Ticker(PriceTick),
    /// Subscription acknowledgement or other control reply.
    Ack,
    /// Well-formed but not for a symbol we track.
    Ignored,
}

/// Subscription request for the BTC and ETH 24h ticker streams.
pub fn subscribe_message() -> Value {
    let params: Vec<String> = Asset::ALL
        .iter()
        .map(|a| format!("{}@ticker", a.binance_symbol().to_ascii_lowercase()))
        .collect();

    json!({
        "method": "SUBSCRIBE",
        "params": params,
        "id": 1
    })
}

pub fn parse_ticker_message(raw: &str, now: DateTime<Utc>) -> Result<BinanceMessage, FeedError> {
    let json: Value = serde_json::from_str(raw)?;

    if json.get("result").is_some() || json.get("id").is_some() {
        return Ok(BinanceMessage::Ack);
    }

    let payload = json.get("data").cloned().unwrap_or(json);
    let event: TickerEvent = serde_json::from_value(payload)?;

    let Some(asset) = Asset::from_binance_symbol(&event.symbol) else {
        return Ok(BinanceMessage::Ignored);
    };

    let tick = to_tick(asset, &event.last_price, &event.price_change_percent, now)?;
    Ok(BinanceMessage::Ticker(tick))
}

pub fn parse_rest_ticker(raw: RestTicker, now: DateTime<Utc>) -> Result<PriceTick, FeedError> {
    let asset = Asset::from_binance_symbol(&raw.symbol).ok_or(FeedError::Parse {
        field: "symbol",
        value: raw.symbol.clone(),
    })?;

    to_tick(asset, &raw.last_price, &raw.price_change_percent, now)
}

fn to_tick(
    asset: Asset,
    price: &str,
    change: &str,
    now: DateTime<Utc>,
) -> Result<PriceTick, FeedError> {
    let price = parse_decimal(price).ok_or_else(|| FeedError::Parse {
        field: "lastPrice",
        value: price.to_string(),
    })?;
    let change = parse_decimal(change).ok_or_else(|| FeedError::Parse {
        field: "priceChangePercent",
        value: change.to_string(),
    })?;

    Ok(PriceTick::new(asset, price, change, now, SOURCE))
}
