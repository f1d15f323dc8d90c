//! Time-axis series for trend charts.
//!
//! These helpers collapse a snapshot sequence along the strike dimension,
//! one point per fetch cycle, chronological. They feed line charts (spot
//! trend, PCR-over-time) and intentionally keep true gaps: a fetch cycle
//! that never happened produces no point.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::analytics::put_call_ratio;
use crate::models::ChainSnapshot;

/// Last observed spot price per fetch cycle, chronological.
///
/// All strikes of one cycle agree on spot, so "last" only disambiguates
/// write-order ties. Empty input yields an empty series.
pub fn spot_trend(snapshots: &[ChainSnapshot]) -> Vec<(DateTime<Utc>, f64)> {
    let mut by_cycle: BTreeMap<DateTime<Utc>, (DateTime<Utc>, f64)> = BTreeMap::new();
    for snap in snapshots {
        by_cycle
            .entry(snap.fetch_time)
            .and_modify(|slot| {
                if snap.recorded_at >= slot.0 {
                    *slot = (snap.recorded_at, snap.spot);
                }
            })
            .or_insert((snap.recorded_at, snap.spot));
    }
    by_cycle
        .into_iter()
        .map(|(t, (_, spot))| (t, spot))
        .collect()
}

/// Aggregate put-call ratio per fetch cycle, chronological.
///
/// OI sums span every strike observed in the cycle; the ratio applies the
/// same zero-guard as the session summary (0 when call OI sums to 0).
pub fn pcr_trend(snapshots: &[ChainSnapshot]) -> Vec<(DateTime<Utc>, f64)> {
    let mut sums: BTreeMap<DateTime<Utc>, (u64, u64)> = BTreeMap::new();
    for snap in snapshots {
        let slot = sums.entry(snap.fetch_time).or_insert((0, 0));
        slot.0 += snap.ce.oi;
        slot.1 += snap.pe.oi;
    }
    sums.into_iter()
        .map(|(t, (ce, pe))| (t, put_call_ratio(pe, ce)))
        .collect()
}
