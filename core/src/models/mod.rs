pub mod alert;
pub mod asset;
pub mod spread;
pub mod tick;
pub mod venue;

pub use alert::{AlertKind, AlertPayload, VenueBlock};
pub use asset::{Asset, UnknownAsset};
pub use spread::{Direction, SpreadSample};
pub use tick::PriceTick;
pub use venue::{EnrichmentSnapshot, UnknownVenue, VenueId};
