use adapters::notifiers::format;
use corelib::{AlertKind, Direction};
use rust_decimal::Decimal;

/// One-line human explanation shown at the top of every alert.
pub fn reason_for(kind: &AlertKind, spread_pct: Decimal) -> String {
    match kind {
        AlertKind::Entry {
            direction: Direction::LongBtcShortEth,
        } => format!("ETH outperforming BTC by {}", format::pct(spread_pct.abs(), 2)),
        AlertKind::Entry {
            direction: Direction::ShortBtcLongEth,
        } => format!("ETH underperforming BTC by {}", format::pct(spread_pct.abs(), 2)),
        AlertKind::Close {
            current_spread_pct, ..
        } => format!("Spread normalized to {}", format::pct_signed(*current_spread_pct)),
    }
}
