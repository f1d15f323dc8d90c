//! Loader boundary for option-chain snapshot data.
//!
//! [`ChainLoader`] is the only way data enters the core. Implementations own
//! storage and transport entirely (SQL partitions, REST, flat files); the
//! core only requires one normalized, ascending sequence per request,
//! however many underlying partitions it spans. The trait supports dynamic
//! dispatch so the backing store can be selected at runtime.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::ChainSnapshot;

/// Errors a [`ChainLoader`] implementation may surface.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The backing store failed (connection, query, I/O).
    #[error("loader backend error: {0}")]
    Backend(String),

    /// The loader contract itself is violated (expected schema missing
    /// entirely). The one fatal class: data-shape anomalies *inside* the
    /// schema never error, they degrade.
    #[error("snapshot schema violation: {0}")]
    Schema(String),
}

/// Scope of one session fetch: one symbol, one trading date, optionally one
/// expiry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Expiry label; `None` spans all stored expiries of the symbol.
    pub expiry: Option<String>,
    /// Trading date the snapshots were polled on.
    pub date: NaiveDate,
}

/// Supplies snapshot batches and scope discovery for the dashboard.
///
/// Contract on [`fetch_session`](ChainLoader::fetch_session): snapshots come
/// back ascending by (fetch_time, recorded_at) and already filtered to the
/// requested scope. The core relies on that order and does not re-sort
/// beyond its own grouping keys.
#[async_trait]
pub trait ChainLoader: Send + Sync {
    /// All symbols with stored chains.
    async fn available_symbols(&self) -> Result<Vec<String>, LoaderError>;

    /// Expiry labels stored for a symbol.
    async fn available_expiries(&self, symbol: &str) -> Result<Vec<String>, LoaderError>;

    /// Trading dates with data, newest first, optionally narrowed to one
    /// expiry.
    async fn available_dates(
        &self,
        symbol: &str,
        expiry: Option<&str>,
    ) -> Result<Vec<NaiveDate>, LoaderError>;

    /// One session's snapshots for the requested scope.
    async fn fetch_session(
        &self,
        request: &SessionRequest,
    ) -> Result<Vec<ChainSnapshot>, LoaderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyStore;

    #[async_trait]
    impl ChainLoader for EmptyStore {
        async fn available_symbols(&self) -> Result<Vec<String>, LoaderError> {
            Ok(vec!["NIFTY".into()])
        }

        async fn available_expiries(&self, _symbol: &str) -> Result<Vec<String>, LoaderError> {
            Ok(vec![])
        }

        async fn available_dates(
            &self,
            _symbol: &str,
            _expiry: Option<&str>,
        ) -> Result<Vec<NaiveDate>, LoaderError> {
            Ok(vec![])
        }

        async fn fetch_session(
            &self,
            _request: &SessionRequest,
        ) -> Result<Vec<ChainSnapshot>, LoaderError> {
            Ok(vec![])
        }
    }

    // The loader is selected at runtime, so dyn dispatch must hold.
    #[tokio::test]
    async fn loader_supports_dyn_dispatch() {
        let loader: Box<dyn ChainLoader> = Box::new(EmptyStore);
        let symbols = loader.available_symbols().await.unwrap();
        assert_eq!(symbols, vec!["NIFTY".to_string()]);

        let request = SessionRequest {
            symbol: "NIFTY".into(),
            expiry: None,
            date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
        };
        let batch = loader.fetch_session(&request).await.unwrap();
        assert!(batch.is_empty());
    }
}
