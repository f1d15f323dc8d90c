//! Strike × time pivoting of one selected metric.
//!
//! Reshapes a snapshot sequence into rows = strikes (ascending) and columns
//! = "HH:MM" labels (chronological), cell = last observed value in that
//! label window. Missing cells read 0 because the matrix feeds stacked,
//! additive charts where an absent contribution must plot as zero. That is
//! deliberately the opposite of [`resample`](crate::resample), where a
//! bucket with no observations stays a missing row.
//!
//! Bad or empty selections come back as a typed [`PivotDiagnostic`], never
//! a panic across the boundary.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ChainSnapshot, Strike};

/// Value semantics of a pivot metric: contract counts format integer-like,
/// prices and ratios keep decimals. The core only preserves the
/// distinction; formatting itself is a presentation concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// OI/volume-class counts.
    Count,
    /// IV/LTP-class decimals.
    Decimal,
}

/// A metric name outside the whitelist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown pivot metric: {0} (expected one of: {names})", names = PivotMetric::NAMES.join(", "))]
pub struct ParseMetricError(pub String);

/// The fixed whitelist of pivotable metrics, one per CE/PE column of the
/// upstream schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotMetric {
    CeOi,
    PeOi,
    CeVolume,
    PeVolume,
    CeChangeInOi,
    PeChangeInOi,
    CeIv,
    PeIv,
    CeLtp,
    PeLtp,
}

impl PivotMetric {
    /// Every selectable metric.
    pub const ALL: [PivotMetric; 10] = [
        PivotMetric::CeOi,
        PivotMetric::PeOi,
        PivotMetric::CeVolume,
        PivotMetric::PeVolume,
        PivotMetric::CeChangeInOi,
        PivotMetric::PeChangeInOi,
        PivotMetric::CeIv,
        PivotMetric::PeIv,
        PivotMetric::CeLtp,
        PivotMetric::PeLtp,
    ];

    /// Display names, matching the upstream column headers.
    pub const NAMES: [&'static str; 10] = [
        "CE OI",
        "PE OI",
        "CE Volume",
        "PE Volume",
        "CE Chg in OI",
        "PE Chg in OI",
        "CE IV",
        "PE IV",
        "CE LTP",
        "PE LTP",
    ];

    /// Column header for this metric.
    pub const fn name(self) -> &'static str {
        match self {
            PivotMetric::CeOi => "CE OI",
            PivotMetric::PeOi => "PE OI",
            PivotMetric::CeVolume => "CE Volume",
            PivotMetric::PeVolume => "PE Volume",
            PivotMetric::CeChangeInOi => "CE Chg in OI",
            PivotMetric::PeChangeInOi => "PE Chg in OI",
            PivotMetric::CeIv => "CE IV",
            PivotMetric::PeIv => "PE IV",
            PivotMetric::CeLtp => "CE LTP",
            PivotMetric::PeLtp => "PE LTP",
        }
    }

    /// Counts vs decimals, for downstream formatting.
    pub const fn kind(self) -> MetricKind {
        match self {
            PivotMetric::CeOi
            | PivotMetric::PeOi
            | PivotMetric::CeVolume
            | PivotMetric::PeVolume
            | PivotMetric::CeChangeInOi
            | PivotMetric::PeChangeInOi => MetricKind::Count,
            PivotMetric::CeIv | PivotMetric::PeIv | PivotMetric::CeLtp | PivotMetric::PeLtp => {
                MetricKind::Decimal
            }
        }
    }

    /// Metric value on one snapshot; `None` when the batch lacks the field.
    pub fn value(self, snap: &ChainSnapshot) -> Option<f64> {
        match self {
            PivotMetric::CeOi => Some(snap.ce.oi as f64),
            PivotMetric::PeOi => Some(snap.pe.oi as f64),
            PivotMetric::CeVolume => Some(snap.ce.volume as f64),
            PivotMetric::PeVolume => Some(snap.pe.volume as f64),
            PivotMetric::CeChangeInOi => Some(snap.ce.change_in_oi as f64),
            PivotMetric::PeChangeInOi => Some(snap.pe.change_in_oi as f64),
            PivotMetric::CeIv => snap.ce.iv,
            PivotMetric::PeIv => snap.pe.iv,
            PivotMetric::CeLtp => snap.ce.ltp,
            PivotMetric::PeLtp => snap.pe.ltp,
        }
    }
}

impl fmt::Display for PivotMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PivotMetric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PivotMetric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ParseMetricError(s.to_string()))
    }
}

/// One pivot row: a strike and its per-label cells (missing = 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    /// Row key, ascending across the matrix.
    pub strike: Strike,
    /// One cell per label, in label order.
    pub cells: Vec<f64>,
}

/// Dense strike × time matrix of one metric.
///
/// Display column order is [instrument, strike, label…], labels
/// chronological, rows ascending by strike. A derived, disposable view:
/// recomputed per request, owns no state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotMatrix {
    /// Symbol taken from the first snapshot; the leading display column.
    pub instrument: String,
    /// The pivoted metric.
    pub metric: PivotMetric,
    /// Chronological "HH:MM" column labels.
    pub labels: Vec<String>,
    /// Rows ascending by strike, each with `labels.len()` cells.
    pub rows: Vec<PivotRow>,
}

impl PivotMatrix {
    /// Cell lookup by strike and label, for adapters and tests.
    pub fn cell(&self, strike: Strike, label: &str) -> Option<f64> {
        let col = self.labels.iter().position(|l| l == label)?;
        let row = self.rows.iter().find(|r| r.strike == strike)?;
        row.cells.get(col).copied()
    }
}

/// Why a pivot request produced no table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotDiagnostic {
    /// No snapshots in the selected scope.
    NoSnapshots,
    /// The metric is absent from every row of this batch.
    MetricUnavailable(PivotMetric),
}

impl fmt::Display for PivotDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotDiagnostic::NoSnapshots => {
                write!(f, "no snapshots available for the selected scope")
            }
            PivotDiagnostic::MetricUnavailable(metric) => {
                write!(f, "metric {metric} is not populated in this batch")
            }
        }
    }
}

/// Pivot result: a table, or a typed diagnostic the presentation layer
/// surfaces as a warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotOutcome {
    /// A populated matrix.
    Table(PivotMatrix),
    /// A well-formed placeholder with the reason the table is empty.
    Empty(PivotDiagnostic),
}

impl PivotOutcome {
    /// The matrix, when one was produced.
    pub fn table(&self) -> Option<&PivotMatrix> {
        match self {
            PivotOutcome::Table(matrix) => Some(matrix),
            PivotOutcome::Empty(_) => None,
        }
    }
}

/// Fixed-width "HH:MM" clock label for a fetch time, in exchange-local wall
/// time.
///
/// Lexicographic order of these labels matches chronological order within a
/// trading day, which is what keeps `BTreeSet<String>` columns chronological.
pub fn time_label(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%H:%M").to_string()
}

/// Build the strike × time matrix for one metric.
///
/// `tz` renders column labels in exchange-local wall time; all internal math
/// stays UTC. Cells reduce with the same "latest (fetch_time, recorded_at)
/// wins" rule as resampling; (strike, label) combinations with no
/// observation fill with 0.
pub fn build_pivot(snapshots: &[ChainSnapshot], metric: PivotMetric, tz: Tz) -> PivotOutcome {
    let Some(first) = snapshots.first() else {
        tracing::warn!(metric = %metric, "pivot requested on an empty snapshot batch");
        return PivotOutcome::Empty(PivotDiagnostic::NoSnapshots);
    };

    let mut labels: BTreeSet<String> = BTreeSet::new();
    let mut strikes: BTreeSet<Strike> = BTreeSet::new();
    // (strike, label) -> (ordering key, value); the tuple Ord gives rows
    // grouped by ascending strike for free.
    let mut cells: BTreeMap<(Strike, String), ((DateTime<Utc>, DateTime<Utc>), f64)> =
        BTreeMap::new();

    for snap in snapshots {
        let label = time_label(snap.fetch_time, tz);
        labels.insert(label.clone());
        strikes.insert(snap.strike);

        let Some(value) = metric.value(snap) else {
            continue;
        };
        let observed = snap.observed_at();
        cells
            .entry((snap.strike, label))
            .and_modify(|slot| {
                if observed > slot.0 {
                    *slot = (observed, value);
                }
            })
            .or_insert((observed, value));
    }

    if cells.is_empty() {
        tracing::warn!(metric = %metric, "pivot metric absent from every snapshot");
        return PivotOutcome::Empty(PivotDiagnostic::MetricUnavailable(metric));
    }

    let labels: Vec<String> = labels.into_iter().collect();
    let label_col: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut rows: Vec<PivotRow> = strikes
        .iter()
        .map(|&strike| PivotRow {
            strike,
            cells: vec![0.0; labels.len()],
        })
        .collect();
    let strike_row: HashMap<Strike, usize> = strikes
        .iter()
        .enumerate()
        .map(|(i, &s)| (s, i))
        .collect();

    for ((strike, label), (_, value)) in cells {
        if let (Some(&r), Some(&c)) = (strike_row.get(&strike), label_col.get(label.as_str())) {
            rows[r].cells[c] = value;
        }
    }

    PivotOutcome::Table(PivotMatrix {
        instrument: first.symbol.clone(),
        metric,
        labels,
        rows,
    })
}
