pub mod client;
pub mod poller;

pub use client::{CoinGeckoClient, parse_simple_price};
pub use poller::CoinGeckoPoller;

pub const SOURCE: &str = "coingecko";
