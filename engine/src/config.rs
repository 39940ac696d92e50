use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// How a CLOSE is decided once the spread has normalised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    /// Spread normalisation alone closes; `take_profit_usd` is informational.
    #[default]
    SpreadOnly,
    /// Spread must normalise and the estimated PnL must reach `take_profit_usd`.
    SpreadAndProfit,
}

/// Strategy parameters for the spread monitor and the signal state machine.
///
/// All spread values are in percentage points (`2.0` means 2%).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// |spread| at or above which an ENTRY fires.
    pub spread_threshold: Decimal,

    /// |spread| above which a sample is treated as bad feed data.
    pub spread_max: Decimal,

    /// |spread| at or below which an open position is considered normalised.
    pub spread_close_threshold: Decimal,

    /// Notional per leg, used for the PnL estimate.
    pub position_size_usd: Decimal,

    /// Profit target. Only gates CLOSE under [`ClosePolicy::SpreadAndProfit`].
    pub take_profit_usd: Decimal,

    /// Minimum time between two ENTRY alerts of the same direction.
    pub cooldown_sec: u64,

    pub close_policy: ClosePolicy,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            spread_threshold: Decimal::new(20, 1),
            spread_max: Decimal::new(80, 1),
            spread_close_threshold: Decimal::new(10, 1),
            position_size_usd: Decimal::new(1000, 0),
            take_profit_usd: Decimal::new(25, 0),
            cooldown_sec: 300,
            close_policy: ClosePolicy::SpreadOnly,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyConfigError {
    #[error("spread_threshold must be positive (got {0})")]
    NonPositiveThreshold(Decimal),

    #[error("spread_close_threshold must not be negative (got {0})")]
    NegativeCloseThreshold(Decimal),

    #[error("spread_close_threshold ({close}) must be below spread_threshold ({entry})")]
    CloseNotBelowEntry { close: Decimal, entry: Decimal },

    #[error("spread_threshold ({entry}) must be below spread_max ({max})")]
    EntryNotBelowMax { entry: Decimal, max: Decimal },

    #[error("cooldown_sec must be positive")]
    ZeroCooldown,

    #[error("position_size_usd must be positive (got {0})")]
    NonPositivePositionSize(Decimal),

    #[error("take_profit_usd must not be negative (got {0})")]
    NegativeTakeProfit(Decimal),
}

impl StrategyConfig {
    /// Every rule the configuration breaks, in declaration order.
    pub fn violations(&self) -> Vec<StrategyConfigError> {
        let mut errors = Vec::new();

        if self.spread_threshold <= Decimal::ZERO {
            errors.push(StrategyConfigError::NonPositiveThreshold(
                self.spread_threshold,
            ));
        }
        if self.spread_close_threshold < Decimal::ZERO {
            errors.push(StrategyConfigError::NegativeCloseThreshold(
                self.spread_close_threshold,
            ));
        }
        if self.spread_close_threshold >= self.spread_threshold {
            errors.push(StrategyConfigError::CloseNotBelowEntry {
                close: self.spread_close_threshold,
                entry: self.spread_threshold,
            });
        }
        if self.spread_threshold >= self.spread_max {
            errors.push(StrategyConfigError::EntryNotBelowMax {
                entry: self.spread_threshold,
                max: self.spread_max,
            });
        }
        if self.cooldown_sec == 0 {
            errors.push(StrategyConfigError::ZeroCooldown);
        }
        if self.position_size_usd <= Decimal::ZERO {
            errors.push(StrategyConfigError::NonPositivePositionSize(
                self.position_size_usd,
            ));
        }
        if self.take_profit_usd < Decimal::ZERO {
            errors.push(StrategyConfigError::NegativeTakeProfit(self.take_profit_usd));
        }

        errors
    }

    /// Fails on the first broken rule.
    pub fn validate(&self) -> Result<(), StrategyConfigError> {
        match self.violations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn cooldown(&self) -> TimeDelta {
        TimeDelta::seconds(i64::try_from(self.cooldown_sec).unwrap_or(i64::MAX))
    }
}
