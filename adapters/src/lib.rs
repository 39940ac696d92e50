pub mod binance;
pub mod coingecko;
pub mod feed;
pub mod notifiers;
pub mod numeric;
pub mod venues;

pub use feed::{FeedError, PairSnapshot, PriceFeed};
pub use notifiers::{Notifier, NotifyError};
pub use venues::{EnrichmentSource, VenueError};
