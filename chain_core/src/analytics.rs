//! Scalar cross-sectional analytics over the latest-per-strike view.
//!
//! [`summarize`] is a pure function: it derives the "current view" (latest
//! snapshot per strike, independent of any bucketing) and folds it into one
//! [`AnalyticsSummary`]. Empty input yields the zeroed default; fields whose
//! inputs are absent from the batch degrade to `None` instead of failing.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{ChainSnapshot, Strike};

/// Latest observation per strike: the "current view" of the chain.
///
/// The reduction key is (fetch_time, recorded_at) over the raw sequence, so
/// the view is the same whether the input was bucketed or not.
pub fn latest_view(snapshots: &[ChainSnapshot]) -> BTreeMap<Strike, &ChainSnapshot> {
    let mut view: BTreeMap<Strike, &ChainSnapshot> = BTreeMap::new();
    for snap in snapshots {
        view.entry(snap.strike)
            .and_modify(|current| {
                if snap.observed_at() > current.observed_at() {
                    *current = snap;
                }
            })
            .or_insert(snap);
    }
    view
}

/// CE/PE metrics at the at-the-money strike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmMetrics {
    /// The ATM strike the metrics were read at.
    pub strike: Strike,
    /// Call OI at the ATM strike.
    pub ce_oi: u64,
    /// Put OI at the ATM strike.
    pub pe_oi: u64,
    /// Call IV at the ATM strike, when populated.
    pub ce_iv: Option<f64>,
    /// Put IV at the ATM strike, when populated.
    pub pe_iv: Option<f64>,
}

/// Session-level scalar aggregates, computed once per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    /// Distinct strikes observed.
    pub total_strikes: usize,
    /// Spot at the lowest strike's latest row. All rows of one fetch cycle
    /// agree on spot, so any representative works; this mirrors taking the
    /// first row of the view.
    pub current_spot: f64,
    /// Mean spot across the latest view.
    pub avg_spot_price: f64,
    /// Sum of call OI over the view.
    pub total_ce_oi: u64,
    /// Sum of put OI over the view.
    pub total_pe_oi: u64,
    /// Put-call ratio; 0 whenever total call OI is 0.
    pub pcr: f64,
    /// Sum of call volume over the view.
    pub total_ce_volume: u64,
    /// Sum of put volume over the view.
    pub total_pe_volume: u64,
    /// Mean call IV over rows that carry one; `None` when none do.
    pub avg_ce_iv: Option<f64>,
    /// Mean put IV over rows that carry one; `None` when none do.
    pub avg_pe_iv: Option<f64>,
    /// ATM metrics, when the ATM strike is itself a row of the view.
    pub atm: Option<AtmMetrics>,
}

impl AnalyticsSummary {
    /// Flat named-metric mapping with a stable key order for presentation.
    ///
    /// Keys whose inputs were insufficient are omitted rather than zeroed,
    /// so a missing key reads as "no data", not "zero".
    pub fn metrics(&self) -> IndexMap<&'static str, f64> {
        let mut out = IndexMap::new();
        out.insert("total_strikes", self.total_strikes as f64);
        out.insert("current_spot", self.current_spot);
        out.insert("avg_spot_price", self.avg_spot_price);
        out.insert("total_ce_oi", self.total_ce_oi as f64);
        out.insert("total_pe_oi", self.total_pe_oi as f64);
        out.insert("pcr", self.pcr);
        out.insert("total_ce_volume", self.total_ce_volume as f64);
        out.insert("total_pe_volume", self.total_pe_volume as f64);
        if let Some(v) = self.avg_ce_iv {
            out.insert("avg_ce_iv", v);
        }
        if let Some(v) = self.avg_pe_iv {
            out.insert("avg_pe_iv", v);
        }
        if let Some(atm) = &self.atm {
            out.insert("atm_strike", atm.strike.0);
            out.insert("atm_ce_oi", atm.ce_oi as f64);
            out.insert("atm_pe_oi", atm.pe_oi as f64);
            if let Some(v) = atm.ce_iv {
                out.insert("atm_ce_iv", v);
            }
            if let Some(v) = atm.pe_iv {
                out.insert("atm_pe_iv", v);
            }
        }
        out
    }
}

/// Put-call ratio with the degenerate-ratio guard: 0 when call OI is 0.
pub(crate) fn put_call_ratio(pe_oi: u64, ce_oi: u64) -> f64 {
    if ce_oi == 0 {
        0.0
    } else {
        pe_oi as f64 / ce_oi as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Compute the session summary from any snapshot sequence.
///
/// Pure and side-effect free; empty input yields the zeroed default rather
/// than an error.
pub fn summarize(snapshots: &[ChainSnapshot]) -> AnalyticsSummary {
    let view = latest_view(snapshots);
    let Some(first) = view.values().next() else {
        return AnalyticsSummary::default();
    };

    let total_strikes = view.len();
    let current_spot = first.spot;
    let atm_strike = first.atm_strike;

    let mut total_ce_oi = 0u64;
    let mut total_pe_oi = 0u64;
    let mut total_ce_volume = 0u64;
    let mut total_pe_volume = 0u64;
    let mut spot_sum = 0.0;
    for row in view.values() {
        total_ce_oi += row.ce.oi;
        total_pe_oi += row.pe.oi;
        total_ce_volume += row.ce.volume;
        total_pe_volume += row.pe.volume;
        spot_sum += row.spot;
    }

    let avg_ce_iv = mean(view.values().filter_map(|row| row.ce.iv));
    let avg_pe_iv = mean(view.values().filter_map(|row| row.pe.iv));

    // ATM strike comes from any one representative row; all rows of a fetch
    // cycle are consistent for this field. Absent from the view -> omitted.
    let atm = view.get(&atm_strike).map(|row| AtmMetrics {
        strike: atm_strike,
        ce_oi: row.ce.oi,
        pe_oi: row.pe.oi,
        ce_iv: row.ce.iv,
        pe_iv: row.pe.iv,
    });

    AnalyticsSummary {
        total_strikes,
        current_spot,
        avg_spot_price: spot_sum / total_strikes as f64,
        total_ce_oi,
        total_pe_oi,
        pcr: put_call_ratio(total_pe_oi, total_ce_oi),
        total_ce_volume,
        total_pe_volume,
        avg_ce_iv,
        avg_pe_iv,
        atm,
    }
}
