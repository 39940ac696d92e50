pub mod errors;
pub mod extended;
pub mod variational;

use async_trait::async_trait;
use corelib::{Asset, EnrichmentSnapshot, VenueId};

pub use errors::VenueError;
pub use extended::ExtendedClient;
pub use variational::VariationalClient;

/// A venue queried for context when an alert is built.
///
/// Every call hits the network; nothing is cached between alerts.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    fn venue(&self) -> VenueId;

    async fn snapshot(&self, asset: Asset) -> Result<EnrichmentSnapshot, VenueError>;

    async fn health_check(&self) -> bool;
}
