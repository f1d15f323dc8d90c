//! Canonical in-memory representation of one option-chain observation.
//!
//! A [`ChainSnapshot`] is one row of the polled chain: one strike of one
//! symbol/expiry at one fetch cycle, with the fixed CE/PE metric set
//! attached. These structs are vendor-agnostic and are the standard output
//! of every [`ChainLoader`](crate::providers::ChainLoader) implementation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contracted option price level.
///
/// Wraps the raw `f64` with a total order (`f64::total_cmp`) and bit-pattern
/// hashing so strikes can key ordered maps and sort deterministically.
/// Market strikes are finite, so the total-order edge cases (NaN, signed
/// zero) never distinguish real inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strike(pub f64);

impl Eq for Strike {}

impl Ord for Strike {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Strike {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Strike {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Option sensitivity metrics, carried as opaque numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// The fixed metric set tracked for one option side (CE or PE) at a strike.
///
/// OI, change-in-OI and volume are always populated by the poller. IV, LTP
/// and greeks depend on upstream enrichment and may be absent for a given
/// batch; absence degrades only the derived fields that need them, never the
/// whole computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSideQuote {
    /// Outstanding contract count.
    pub oi: u64,
    /// Change in open interest since the previous close.
    pub change_in_oi: i64,
    /// Contracts traded during the session so far.
    pub volume: u64,
    /// Implied volatility, in percent.
    pub iv: Option<f64>,
    /// Last traded price.
    pub ltp: Option<f64>,
    /// Greeks, when the upstream enrichment supplies them.
    pub greeks: Option<Greeks>,
}

/// One observation: a single strike of one symbol/expiry at one fetch cycle.
///
/// Within a fetch cycle many strikes share the same `fetch_time`;
/// `recorded_at` is the finer write stamp that breaks ordering ties
/// deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Underlying symbol (e.g., "NIFTY", "BANKNIFTY").
    pub symbol: String,
    /// Expiry label as stored upstream (e.g., "26 Jun").
    pub expiry: String,
    /// Strike this row describes.
    pub strike: Strike,
    /// Coarse polling timestamp (UTC).
    pub fetch_time: DateTime<Utc>,
    /// Finer write timestamp (UTC); tie-breaker within a fetch cycle.
    pub recorded_at: DateTime<Utc>,
    /// Spot price of the underlying at this fetch cycle.
    pub spot: f64,
    /// Strike nearest the spot, pre-identified per snapshot.
    pub atm_strike: Strike,
    /// Call-side metrics.
    pub ce: OptionSideQuote,
    /// Put-side metrics.
    pub pe: OptionSideQuote,
}

impl ChainSnapshot {
    /// Ordering key for "latest observation" reductions.
    ///
    /// Rows with identical keys are indistinguishable; reducers may keep
    /// either one.
    pub fn observed_at(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.fetch_time, self.recorded_at)
    }
}
