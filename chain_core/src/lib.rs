//! Core transformations for option-chain snapshot data.
//!
//! The pipeline turns an irregular, high-frequency stream of per-strike
//! snapshots into:
//! - a fixed-interval bucketed series ([`resample`]) for trend charts,
//! - scalar session analytics ([`analytics`]),
//! - a strike × time pivot matrix ([`pivot`]) for stacked/tabular views,
//! - time-axis helper series ([`trend`]) for spot and PCR line charts.
//!
//! Everything here is pure and request-scoped: no global state, no I/O, no
//! clock reads. Data enters through the [`providers::ChainLoader`] boundary
//! and leaves as plain values a chart adapter can consume. Caching, query
//! construction, and rendering belong to the caller.

pub mod analytics;
pub mod models;
pub mod pivot;
pub mod providers;
pub mod resample;
pub mod trend;
