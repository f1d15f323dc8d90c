//! Fixed-interval resampling of snapshot streams.
//!
//! Buckets are ceiling-aligned: a snapshot fetched at 09:15:10 lands in the
//! 09:20 bucket at a 5-minute width. Within one (bucket, strike) group the
//! representative row is the latest observation by (fetch_time,
//! recorded_at), so bucketing is a "last value in window" reducer, not an
//! average.
//!
//! Buckets with no observations stay absent from the output: trend charts
//! need true gaps. Only the pivot matrix densifies missing cells to zero.

use std::collections::{BTreeMap, btree_map::Entry};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::{ChainSnapshot, Interval, Strike};

const SECS_PER_MINUTE: i64 = 60;

/// One resampled row: the representative snapshot of a (bucket, strike) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedRow {
    /// Ceiling-aligned bucket timestamp (UTC). Equals the snapshot's fetch
    /// time at the 1-minute width.
    pub bucket_time: DateTime<Utc>,
    /// Latest snapshot observed within the bucket for this strike.
    pub snapshot: ChainSnapshot,
}

/// Ordered resampling output for one session and interval.
///
/// Rows ascend by (bucket_time, strike) and a (bucket, strike) pair appears
/// at most once; downstream stages rely on both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedSeries {
    /// Bucket width the rows were grouped under.
    pub interval: Interval,
    /// Representative rows, ascending by (bucket_time, strike).
    pub rows: Vec<BucketedRow>,
}

impl BucketedSeries {
    /// True when the input had no snapshots.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of (bucket, strike) rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Reproject rows as plain snapshots with `fetch_time` rebased to the
    /// bucket time.
    ///
    /// This is the shape the analytics and pivot stages consume: after
    /// resampling, "the fetch time" of a row *is* its bucket, so labels and
    /// latest-per-strike reductions operate on the grouped granularity.
    pub fn to_snapshots(&self) -> Vec<ChainSnapshot> {
        self.rows
            .iter()
            .map(|row| {
                let mut snap = row.snapshot.clone();
                snap.fetch_time = row.bucket_time;
                snap
            })
            .collect()
    }
}

/// Smallest multiple of the interval width that is >= `ts`.
///
/// The 1-minute width bypasses the grid entirely: ceiling second-resolution
/// fetch times onto a minute grid would shift them, and the unit interval is
/// defined as the identity.
pub fn bucket_ceil(ts: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    if interval.is_unit() {
        return ts;
    }
    let width = SECS_PER_MINUTE * interval.minutes() as i64;
    let secs = ts.timestamp();
    let rem = secs.rem_euclid(width);
    let on_grid = rem == 0 && ts.timestamp_subsec_nanos() == 0;
    let ceiled = if on_grid { secs } else { secs - rem + width };
    Utc.timestamp_opt(ceiled, 0)
        .single()
        .expect("ceiled timestamp in range")
}

/// Resample a session's snapshots into one representative row per
/// (bucket_time, strike) pair present in the input.
///
/// Never invents buckets or strikes: the output key set is exactly the set
/// of distinct ceilings observed in the input. Empty input produces an
/// empty series. Exact (fetch_time, recorded_at) ties keep the first-seen
/// row; such rows are indistinguishable under the ordering key.
pub fn resample(snapshots: &[ChainSnapshot], interval: Interval) -> BucketedSeries {
    let mut groups: BTreeMap<(DateTime<Utc>, Strike), &ChainSnapshot> = BTreeMap::new();

    for snap in snapshots {
        let key = (bucket_ceil(snap.fetch_time, interval), snap.strike);
        match groups.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(snap);
            }
            Entry::Occupied(mut slot) => {
                if snap.observed_at() > slot.get().observed_at() {
                    slot.insert(snap);
                }
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|((bucket_time, _), snap)| BucketedRow {
            bucket_time,
            snapshot: snap.clone(),
        })
        .collect();

    BucketedSeries { interval, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionSideQuote;

    fn quote(oi: u64) -> OptionSideQuote {
        OptionSideQuote {
            oi,
            change_in_oi: 0,
            volume: 0,
            iv: None,
            ltp: None,
            greeks: None,
        }
    }

    fn snap(strike: f64, h: u32, m: u32, s: u32, ce_oi: u64) -> ChainSnapshot {
        let t = Utc.with_ymd_and_hms(2025, 6, 20, h, m, s).unwrap();
        ChainSnapshot {
            symbol: "NIFTY".into(),
            expiry: "26 Jun".into(),
            strike: Strike(strike),
            fetch_time: t,
            recorded_at: t,
            spot: 18010.0,
            atm_strike: Strike(18000.0),
            ce: quote(ce_oi),
            pe: quote(0),
        }
    }

    #[test]
    fn ceiling_lands_on_next_grid_point() {
        let t = Utc.with_ymd_and_hms(2025, 6, 20, 9, 15, 10).unwrap();
        assert_eq!(
            bucket_ceil(t, Interval::Min5),
            Utc.with_ymd_and_hms(2025, 6, 20, 9, 20, 0).unwrap()
        );
        assert_eq!(
            bucket_ceil(t, Interval::Hour1),
            Utc.with_ymd_and_hms(2025, 6, 20, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn ceiling_keeps_exact_grid_points() {
        let t = Utc.with_ymd_and_hms(2025, 6, 20, 9, 20, 0).unwrap();
        assert_eq!(bucket_ceil(t, Interval::Min5), t);
    }

    #[test]
    fn unit_interval_is_identity_on_fetch_time() {
        let t = Utc.with_ymd_and_hms(2025, 6, 20, 9, 15, 10).unwrap();
        assert_eq!(bucket_ceil(t, Interval::Min1), t);
    }

    // Three polls of one strike inside a 5-minute window collapse to one
    // row at the window's ceiling, carrying the newest snapshot.
    #[test]
    fn window_keeps_latest_observation() {
        let input = vec![
            snap(18000.0, 9, 15, 10, 100),
            snap(18000.0, 9, 16, 45, 200),
            snap(18000.0, 9, 17, 2, 300),
        ];
        let series = resample(&input, Interval::Min5);
        assert_eq!(series.len(), 1);
        let row = &series.rows[0];
        assert_eq!(
            row.bucket_time,
            Utc.with_ymd_and_hms(2025, 6, 20, 9, 20, 0).unwrap()
        );
        assert_eq!(row.snapshot.ce.oi, 300);
        assert_eq!(row.snapshot, input[2]);
    }

    #[test]
    fn unit_interval_preserves_full_resolution() {
        let input = vec![
            snap(18000.0, 9, 15, 10, 100),
            snap(18000.0, 9, 16, 45, 200),
            snap(18000.0, 9, 17, 2, 300),
        ];
        let series = resample(&input, Interval::Min1);
        assert_eq!(series.len(), 3);
        for (row, snap) in series.rows.iter().zip(&input) {
            assert_eq!(row.bucket_time, snap.fetch_time);
            assert_eq!(&row.snapshot, snap);
        }
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let series = resample(&[], Interval::Min15);
        assert!(series.is_empty());
        assert!(series.to_snapshots().is_empty());
    }

    #[test]
    fn rows_ascend_by_bucket_then_strike() {
        let input = vec![
            snap(18000.0, 9, 31, 0, 1),
            snap(17500.0, 9, 31, 5, 2),
            snap(17500.0, 9, 14, 0, 3),
            snap(18000.0, 9, 14, 30, 4),
        ];
        let series = resample(&input, Interval::Min15);
        let keys: Vec<(DateTime<Utc>, f64)> = series
            .rows
            .iter()
            .map(|r| (r.bucket_time, r.snapshot.strike.0))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(keys, sorted);
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn to_snapshots_rebases_fetch_time() {
        let input = vec![snap(18000.0, 9, 15, 10, 100)];
        let series = resample(&input, Interval::Min5);
        let rebased = series.to_snapshots();
        assert_eq!(
            rebased[0].fetch_time,
            Utc.with_ymd_and_hms(2025, 6, 20, 9, 20, 0).unwrap()
        );
        // Tie-breaker stamp is untouched; only the coarse stamp moves.
        assert_eq!(rebased[0].recorded_at, input[0].recorded_at);
    }
}
