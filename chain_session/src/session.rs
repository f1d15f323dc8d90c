//! The [`Dashboard`] facade: one polled session in, one memoized view out.
//!
//! A view request names a scope (symbol, expiry, trading date), a bucket
//! width, and a pivot metric. Serving it runs the full pipeline once:
//! fetch, resample, rebase, summarize, pivot. The result is cached under
//! the request value for the configured data TTL, so a UI polling the same
//! controls hits the loader at most once per TTL window.
//!
//! Scope discovery (symbols, expiries, dates) is memoized separately under
//! the listing TTL. [`Dashboard::refresh`] drops both caches at once.

use std::sync::Arc;

use chain_core::analytics::{self, AnalyticsSummary};
use chain_core::models::Interval;
use chain_core::pivot::{self, PivotMetric, PivotOutcome};
use chain_core::providers::{ChainLoader, LoaderError, SessionRequest};
use chain_core::resample::{self, BucketedSeries};
use chrono::NaiveDate;
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::config::{ConfigError, DashboardConfig};

/// Errors the session layer surfaces to the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The loader failed; the pipeline itself never errors on data shape.
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Everything that keys one computed view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Expiry label; `None` spans all stored expiries.
    pub expiry: Option<String>,
    /// Trading date of the session.
    pub date: NaiveDate,
    /// Bucket width.
    pub interval: Interval,
    /// Metric the pivot matrix carries.
    pub metric: PivotMetric,
}

impl ViewRequest {
    fn session_scope(&self) -> SessionRequest {
        SessionRequest {
            symbol: self.symbol.clone(),
            expiry: self.expiry.clone(),
            date: self.date,
        }
    }
}

/// One served view: the three pipeline products for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Resampled rows with true gaps preserved, for trend charts.
    pub bucketed: BucketedSeries,
    /// Session-level scalars from the latest state per strike.
    pub analytics: AnalyticsSummary,
    /// Strike-by-time matrix, or a diagnostic when nothing renders.
    pub pivot: PivotOutcome,
}

/// Key for memoized string listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ListingKey {
    Symbols,
    Expiries(String),
}

/// Loader-backed session facade with TTL memoization.
pub struct Dashboard {
    loader: Arc<dyn ChainLoader>,
    tz: Tz,
    config: DashboardConfig,
    views: TtlCache<ViewRequest, SessionView>,
    listings: TtlCache<ListingKey, Vec<String>>,
    dates: TtlCache<(String, Option<String>), Vec<NaiveDate>>,
}

impl Dashboard {
    /// Build a dashboard over `loader` with the given settings.
    ///
    /// The display timezone is parsed here once; a bad zone name fails
    /// construction rather than the first view.
    pub fn new(loader: Arc<dyn ChainLoader>, config: DashboardConfig) -> Result<Self, ConfigError> {
        let tz = config.display_tz()?;
        Ok(Self {
            loader,
            tz,
            views: TtlCache::new(config.data_ttl()),
            listings: TtlCache::new(config.listing_ttl()),
            dates: TtlCache::new(config.listing_ttl()),
            config,
        })
    }

    /// Bucket width a fresh view starts at.
    pub fn default_interval(&self) -> Interval {
        self.config.default_interval
    }

    /// Zone the pivot's time labels render in.
    pub fn display_tz(&self) -> Tz {
        self.tz
    }

    /// Serve one view, from cache when fresh.
    ///
    /// An empty session is not an error: the view comes back with an empty
    /// series, a zeroed summary, and an `Empty` pivot diagnostic, and is
    /// cached like any other result.
    pub async fn view(&self, request: &ViewRequest) -> Result<Arc<SessionView>, SessionError> {
        if let Some(view) = self.views.get(request) {
            debug!(symbol = %request.symbol, interval = %request.interval, "view cache hit");
            return Ok(view);
        }
        debug!(symbol = %request.symbol, interval = %request.interval, "view cache miss");

        let snapshots = self.loader.fetch_session(&request.session_scope()).await?;
        if snapshots.is_empty() {
            warn!(
                symbol = %request.symbol,
                date = %request.date,
                "no snapshots for requested session"
            );
        }

        let bucketed = resample::resample(&snapshots, request.interval);
        let rows = bucketed.to_snapshots();
        let view = SessionView {
            analytics: analytics::summarize(&rows),
            pivot: pivot::build_pivot(&rows, request.metric, self.tz),
            bucketed,
        };
        Ok(self.views.insert(request.clone(), view))
    }

    /// Symbols with stored chains, memoized under the listing TTL.
    pub async fn symbols(&self) -> Result<Arc<Vec<String>>, SessionError> {
        if let Some(symbols) = self.listings.get(&ListingKey::Symbols) {
            return Ok(symbols);
        }
        let symbols = self.loader.available_symbols().await?;
        Ok(self.listings.insert(ListingKey::Symbols, symbols))
    }

    /// Expiry labels stored for `symbol`, memoized under the listing TTL.
    pub async fn expiries(&self, symbol: &str) -> Result<Arc<Vec<String>>, SessionError> {
        let key = ListingKey::Expiries(symbol.to_string());
        if let Some(expiries) = self.listings.get(&key) {
            return Ok(expiries);
        }
        let expiries = self.loader.available_expiries(symbol).await?;
        Ok(self.listings.insert(key, expiries))
    }

    /// Trading dates with data, memoized under the listing TTL.
    pub async fn dates(
        &self,
        symbol: &str,
        expiry: Option<&str>,
    ) -> Result<Arc<Vec<NaiveDate>>, SessionError> {
        let key = (symbol.to_string(), expiry.map(str::to_string));
        if let Some(dates) = self.dates.get(&key) {
            return Ok(dates);
        }
        let dates = self.loader.available_dates(symbol, expiry).await?;
        Ok(self.dates.insert(key, dates))
    }

    /// Drop every memoized view and listing. The next request of each kind
    /// goes back to the loader.
    pub fn refresh(&self) {
        self.views.clear();
        self.listings.clear();
        self.dates.clear();
        debug!("session caches cleared");
    }
}
