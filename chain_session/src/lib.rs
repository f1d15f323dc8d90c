//! Caller-side session layer over [`chain_core`].
//!
//! Wires a [`chain_core::providers::ChainLoader`] to the analysis pipeline
//! and memoizes the results:
//! - [`config`]: TOML-backed dashboard settings (interval, TTLs, timezone)
//! - [`cache`]: a small TTL cache keyed by request value
//! - [`session`]: the [`session::Dashboard`] facade that fetches, resamples,
//!   summarizes, and pivots one view per request

pub mod cache;
pub mod config;
pub mod session;
