#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapters::{EnrichmentSource, Notifier, NotifyError, VenueError};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use corelib::{AlertPayload, Asset, EnrichmentSnapshot, PriceTick, VenueId};
use engine::Clock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn tick(asset: Asset, pct: Decimal) -> PriceTick {
    let price = match asset {
        Asset::Btc => dec!(97250.50),
        Asset::Eth => dec!(3412.75),
    };
    PriceTick::new(asset, price, pct, t0(), "binance")
}

// ---------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------

/// Clock the test moves by hand. Clones share the same instant.
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(at)))
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

// ---------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------

#[derive(Clone, Copy)]
pub enum Behaviour {
    Ok,
    Fail,
    Delay(Duration),
}

pub struct MockVenue {
    venue: VenueId,
    btc: Behaviour,
    eth: Behaviour,
    pub calls: Mutex<Vec<Asset>>,
}

impl MockVenue {
    pub fn new(venue: VenueId) -> Self {
        Self {
            venue,
            btc: Behaviour::Ok,
            eth: Behaviour::Ok,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn btc(mut self, b: Behaviour) -> Self {
        self.btc = b;
        self
    }

    pub fn eth(mut self, b: Behaviour) -> Self {
        self.eth = b;
        self
    }

    pub fn both(self, b: Behaviour) -> Self {
        self.btc(b).eth(b)
    }

    pub fn shared(self) -> Arc<dyn EnrichmentSource> {
        Arc::new(self)
    }
}

pub fn snapshot(venue: VenueId, asset: Asset) -> EnrichmentSnapshot {
    let mark = match asset {
        Asset::Btc => dec!(97180.12),
        Asset::Eth => dec!(3410.50),
    };
    EnrichmentSnapshot {
        venue,
        asset,
        mark_price: mark,
        bid: Some(mark - dec!(1)),
        ask: Some(mark + dec!(1)),
        funding_rate_pct: Some(dec!(0.01)),
        fetched_at: t0(),
    }
}

#[async_trait]
impl EnrichmentSource for MockVenue {
    fn venue(&self) -> VenueId {
        self.venue
    }

    async fn snapshot(&self, asset: Asset) -> Result<EnrichmentSnapshot, VenueError> {
        self.calls.lock().unwrap().push(asset);

        let behaviour = match asset {
            Asset::Btc => self.btc,
            Asset::Eth => self.eth,
        };
        match behaviour {
            Behaviour::Ok => Ok(snapshot(self.venue, asset)),
            Behaviour::Fail => Err(VenueError::InvalidResponse("mock failure".into())),
            Behaviour::Delay(d) => {
                tokio::time::sleep(d).await;
                Ok(snapshot(self.venue, asset))
            }
        }
    }

    async fn health_check(&self) -> bool {
        !matches!((self.btc, self.eth), (Behaviour::Fail, Behaviour::Fail))
    }
}

// ---------------------------------------------------------------------
// Notifiers
// ---------------------------------------------------------------------

pub struct RecordingNotifier {
    name: &'static str,
    fail: bool,
    delay: Option<Duration>,
    pub sent: Mutex<Vec<AlertPayload>>,
}

impl RecordingNotifier {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            delay: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: true,
            delay: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail: false,
            delay: Some(delay),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<AlertPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, payload: &AlertPayload) -> Result<(), NotifyError> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(NotifyError::Rejected {
                channel: self.name,
                status: 500,
                body: "mock outage".into(),
            });
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.fail
    }
}

pub fn notifiers(list: &[&Arc<RecordingNotifier>]) -> Vec<Arc<dyn Notifier>> {
    list.iter().map(|n| Arc::clone(n) as Arc<dyn Notifier>).collect()
}
