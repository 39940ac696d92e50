//! Number and duration formatting shared by the renderers.

use chrono::TimeDelta;
use rust_decimal::{Decimal, RoundingStrategy};

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded.abs())
}

fn group_thousands(digits: &str) -> String {
    let (int, frac) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(int.len() + int.len() / 3 + 4);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(f) = frac {
        out.push('.');
        out.push_str(f);
    }
    out
}

// Values that round to zero never render with a minus sign.
fn is_negative_at(value: Decimal, dp: u32) -> bool {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.is_sign_negative() && !rounded.is_zero()
}

/// `$97,250.50`
pub fn usd(value: Decimal) -> String {
    let sign = if is_negative_at(value, 2) { "-" } else { "" };
    format!("{sign}${}", group_thousands(&fixed(value, 2)))
}

/// `$1,000` (no decimals)
pub fn usd_whole(value: Decimal) -> String {
    let sign = if is_negative_at(value, 0) { "-" } else { "" };
    format!("{sign}${}", group_thousands(&fixed(value, 0)))
}

/// `+$17.10` / `-$4.00`
pub fn usd_signed(value: Decimal) -> String {
    let sign = if is_negative_at(value, 2) { "-" } else { "+" };
    format!("{sign}${}", group_thousands(&fixed(value, 2)))
}

/// `+2.53%` / `-0.40%`
pub fn pct_signed(value: Decimal) -> String {
    let sign = if is_negative_at(value, 2) { "-" } else { "+" };
    format!("{sign}{}%", fixed(value, 2))
}

/// `0.0100%`, with `dp` decimals.
pub fn pct(value: Decimal, dp: u32) -> String {
    let sign = if is_negative_at(value, dp) { "-" } else { "" };
    format!("{sign}{}%", fixed(value, dp))
}

/// `2h 15m` or `45m`.
pub fn duration(d: TimeDelta) -> String {
    let minutes = d.num_minutes().max(0);
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Human name of a signal source id.
pub fn source_label(source: &str) -> String {
    match source {
        "binance" => "Binance".to_string(),
        "coingecko" => "CoinGecko".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// First `max` characters of an error body, for logs.
pub fn truncate(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
