use std::sync::Arc;

use adapters::{EnrichmentSource, Notifier};
use futures::future::join_all;
use tracing::{info, warn};

/// Reachability of each external dependency at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub venues: Vec<(String, bool)>,
    pub notifiers: Vec<(&'static str, bool)>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.venues.iter().all(|(_, ok)| *ok) && self.notifiers.iter().all(|(_, ok)| *ok)
    }
}

/// Probe every venue and notifier concurrently. Failures are reported, not
/// fatal: an unreachable venue is simply missing from alerts until it
/// recovers.
pub async fn check_all(
    venues: &[Arc<dyn EnrichmentSource>],
    notifiers: &[Arc<dyn Notifier>],
) -> HealthReport {
    let venue_checks = join_all(venues.iter().map(|v| async move {
        (v.venue().to_string(), v.health_check().await)
    }));
    let notifier_checks =
        join_all(notifiers.iter().map(|n| async move { (n.name(), n.health_check().await) }));

    let (venues, notifiers) = tokio::join!(venue_checks, notifier_checks);

    for (name, ok) in &venues {
        if *ok {
            info!(venue = %name, "venue reachable");
        } else {
            warn!(venue = %name, "venue health check failed");
        }
    }
    for (name, ok) in &notifiers {
        if *ok {
            info!(notifier = name, "notifier reachable");
        } else {
            warn!(notifier = name, "notifier health check failed");
        }
    }

    HealthReport { venues, notifiers }
}
