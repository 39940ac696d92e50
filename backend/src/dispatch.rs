use std::sync::Arc;

use adapters::Notifier;
use common::logger::root_span;
use corelib::AlertPayload;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{Instrument, info, warn};

/// Outcome of delivering one payload to every notifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

/// Send `payload` to all notifiers concurrently. A failing channel is logged
/// and never affects the others.
pub async fn dispatch(notifiers: &[Arc<dyn Notifier>], payload: Arc<AlertPayload>) -> DispatchReport {
    let sends = notifiers.iter().map(|notifier| {
        let payload = Arc::clone(&payload);
        async move {
            let name = notifier.name();
            match notifier.send(&payload).await {
                Ok(()) => {
                    info!(notifier = name, "alert delivered");
                    (name, true)
                }
                Err(e) => {
                    warn!(notifier = name, error = %e, "alert delivery failed");
                    (name, false)
                }
            }
        }
    });

    let mut report = DispatchReport::default();
    for (name, ok) in join_all(sends).await {
        if ok {
            report.delivered.push(name);
        } else {
            report.failed.push(name);
        }
    }
    report
}

/// Run [`dispatch`] on its own task so the caller can move on to the next tick.
pub fn spawn_dispatch(
    notifiers: Arc<Vec<Arc<dyn Notifier>>>,
    payload: Arc<AlertPayload>,
) -> JoinHandle<DispatchReport> {
    let span = root_span("alert_dispatch", &payload.trace_id);
    span.record("kind", payload.kind.label());
    span.record("direction", tracing::field::display(payload.kind.direction()));

    tokio::spawn(async move { dispatch(&notifiers, payload).await }.instrument(span))
}
