use serde::Deserialize;

/// `<symbol>@ticker` 24h rolling window event. Only the fields we use.
#[derive(Debug, Deserialize)]
pub struct TickerEvent {
    #[serde(rename = "s")]
    pub symbol: String,

    #[serde(rename = "c")]
    pub last_price: String,

    #[serde(rename = "P")]
    pub price_change_percent: String,

    #[serde(rename = "b", default)]
    pub best_bid: Option<String>,

    #[serde(rename = "a", default)]
    pub best_ask: Option<String>,
}

/// `GET /api/v3/ticker/24hr?symbol=...`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestTicker {
    pub symbol: String,
    pub last_price: String,
    pub price_change_percent: String,
    #[serde(default)]
    pub bid_price: Option<String>,
    #[serde(default)]
    pub ask_price: Option<String>,
    #[serde(default)]
    pub quote_volume: Option<String>,
}
