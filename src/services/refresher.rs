use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::models::LastSnapshot;
use crate::services::badge::{percent_change, BadgeState, BadgeSurface};
use crate::services::close_cache::resolve_close;
use crate::services::fetcher::PriceSource;
use crate::services::market_time;
use crate::services::store::Store;

/// Runs one refresh cycle end to end: fetch the quote, resolve the
/// official close, paint the badge, record the snapshot.
///
/// This is the error boundary of the whole watcher. Failures never leave
/// a cycle; they paint the error badge and wait for the next trigger.
/// Cycles are fire-and-forget: overlapping cycles may interleave their
/// store accesses and the last write wins.
pub struct Refresher<S: PriceSource> {
    store: Store,
    source: S,
    badge: Arc<dyn BadgeSurface>,
}

impl<S: PriceSource> Refresher<S> {
    pub fn new(store: Store, source: S, badge: Arc<dyn BadgeSurface>) -> Self {
        Self {
            store,
            source,
            badge,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Repaint the badge from the last snapshot, if any. Runs at startup
    /// before the first fetch so the user sees continuity across a
    /// restart instead of an empty badge.
    pub async fn restore_badge(&self) {
        match self.store.last_snapshot().await {
            Ok(Some(snapshot)) => {
                info!(symbol = %snapshot.symbol, ltp = snapshot.ltp, "Restoring badge from snapshot");
                self.badge
                    .paint(&BadgeState::restored(&snapshot, market_time::local_now()));
            }
            Ok(None) => debug!("No snapshot to restore"),
            Err(e) => warn!(error = %e, "Could not read last snapshot"),
        }
    }

    /// One fire-and-forget refresh cycle at the current market time.
    pub async fn refresh(&self) {
        let _ = self.refresh_now().await;
    }

    /// One refresh cycle whose outcome the caller cares about (the
    /// one-shot `fetch` command). The error badge is painted either way.
    pub async fn refresh_now(&self) -> Result<()> {
        self.refresh_at(market_time::local_now()).await
    }

    pub(crate) async fn refresh_at(&self, now: DateTime<FixedOffset>) -> Result<()> {
        match self.try_refresh(now).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Refresh failed");
                self.badge.paint(&BadgeState::fetch_error());
                Err(e)
            }
        }
    }

    async fn try_refresh(&self, now: DateTime<FixedOffset>) -> Result<()> {
        let symbol = self.store.symbol().await?;
        let ltp = self.source.fetch_price(&symbol).await?;
        let close = resolve_close(&self.store, &symbol, ltp, now).await?;
        let percent = percent_change(ltp, close);

        self.badge
            .paint(&BadgeState::quote(&symbol, ltp, close, now));

        // The badge is already correct at this point; a failed snapshot
        // save only costs the instant restore after the next restart.
        if let Err(e) = self
            .store
            .save_snapshot(LastSnapshot::new(&symbol, ltp, percent))
            .await
        {
            warn!(error = %e, "Failed to save last snapshot");
        }

        info!(symbol = %symbol, ltp, close, change_percent = percent, "Refresh completed");
        Ok(())
    }
}
