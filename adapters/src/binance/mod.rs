pub mod parser;
pub mod rest;
pub mod types;
pub mod ws;

pub use parser::{BinanceMessage, parse_ticker_message, subscribe_message};
pub use rest::BinanceRestClient;
pub use ws::BinanceWsFeed;

pub const SOURCE: &str = "binance";
