//! Shared fixture builders for integration tests.

use chain_core::models::{ChainSnapshot, Greeks, OptionSideQuote, Strike};
use chrono::{DateTime, TimeZone, Utc};

/// Base fetch cycle for the synthetic session (03:45 UTC = 09:15 IST).
pub fn session_open() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 20, 3, 45, 0).unwrap()
}

pub fn quote(oi: u64, volume: u64, iv: Option<f64>, ltp: Option<f64>) -> OptionSideQuote {
    OptionSideQuote {
        oi,
        change_in_oi: 0,
        volume,
        iv,
        ltp,
        greeks: iv.map(|_| Greeks {
            delta: 0.5,
            gamma: 0.001,
            theta: -4.2,
            vega: 9.8,
        }),
    }
}

/// One snapshot `offset_secs` after session open.
pub fn snap_at(
    strike: f64,
    offset_secs: i64,
    spot: f64,
    ce: OptionSideQuote,
    pe: OptionSideQuote,
) -> ChainSnapshot {
    let t = session_open() + chrono::Duration::seconds(offset_secs);
    ChainSnapshot {
        symbol: "NIFTY".into(),
        expiry: "26 Jun".into(),
        strike: Strike(strike),
        fetch_time: t,
        recorded_at: t,
        spot,
        atm_strike: Strike(18000.0),
        ce,
        pe,
    }
}
