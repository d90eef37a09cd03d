use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

use crate::constants::{BASELINE_INTERVAL_SECS, FAST_INTERVAL_SECS, KEEP_ALIVE_INTERVAL_SECS};
use crate::services::fetcher::PriceSource;
use crate::services::market_time::{self, is_market_hours};
use crate::services::refresher::Refresher;

/// Drives refresh cycles on two cadences.
///
/// The baseline tick fires once a minute around the clock and doubles as
/// the self-healing path: every tick also reconciles the market-hours
/// regime, restarting its tasks if they stopped while the window is open.
/// During market hours (local hour in [11, 15)) a fast 5-second tick runs
/// alongside a keep-alive store ping that gives the host process periodic
/// I/O activity while the window is open.
///
/// The scheduler owns at most the two market-regime task handles; there
/// are no free-floating timers. Refreshes are spawned fire-and-forget, so
/// a slow cycle never delays the next tick.
pub struct Scheduler<S: PriceSource> {
    refresher: Arc<Refresher<S>>,
    market: Option<MarketRegime>,
}

/// Live task handles of the market-hours regime.
struct MarketRegime {
    fast: JoinHandle<()>,
    keep_alive: JoinHandle<()>,
}

impl MarketRegime {
    fn abort(&self) {
        self.fast.abort();
        self.keep_alive.abort();
    }

    fn is_finished(&self) -> bool {
        self.fast.is_finished() && self.keep_alive.is_finished()
    }
}

impl<S: PriceSource> Scheduler<S> {
    pub fn new(refresher: Arc<Refresher<S>>) -> Self {
        Self {
            refresher,
            market: None,
        }
    }

    /// Baseline loop. The first tick completes immediately, so startup
    /// gets a refresh and a regime check without waiting a minute.
    pub async fn run(mut self) {
        info!(
            baseline_secs = BASELINE_INTERVAL_SECS,
            fast_secs = FAST_INTERVAL_SECS,
            "Scheduler started"
        );
        let mut baseline = interval(Duration::from_secs(BASELINE_INTERVAL_SECS));
        loop {
            baseline.tick().await;
            self.spawn_refresh();
            self.reconcile(market_time::local_now());
        }
    }

    /// Fire-and-forget refresh cycle. Overlapping cycles are permitted;
    /// their store writes are idempotent snapshots and the last wins.
    pub fn spawn_refresh(&self) {
        let refresher = self.refresher.clone();
        tokio::spawn(async move {
            refresher.refresh().await;
        });
    }

    /// Bring the market-hours regime in line with the clock.
    fn reconcile(&mut self, now: DateTime<FixedOffset>) {
        let window_open = is_market_hours(now);
        match (&self.market, window_open) {
            (None, true) => {
                info!("Entering market-hours regime");
                self.market = Some(self.start_market_regime());
            }
            (Some(regime), false) => {
                regime.abort();
                self.market = None;
                info!("Left market-hours regime");
            }
            (Some(regime), true) if regime.is_finished() => {
                // Both tasks exited (host suspension can starve their
                // timers); the window is still open, so bring them back.
                info!("Restarting market-hours regime");
                self.market = Some(self.start_market_regime());
            }
            _ => {}
        }
    }

    fn start_market_regime(&self) -> MarketRegime {
        let refresher = self.refresher.clone();
        let fast = tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(FAST_INTERVAL_SECS)).await;
                // Re-check the window on every tick, not just on the
                // baseline cadence.
                if !is_market_hours(market_time::local_now()) {
                    break;
                }
                let refresher = refresher.clone();
                tokio::spawn(async move {
                    refresher.refresh().await;
                });
            }
            debug!("Fast refresh tick stopped");
        });

        let store = self.refresher.store().clone();
        let keep_alive = tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(KEEP_ALIVE_INTERVAL_SECS)).await;
                if !is_market_hours(market_time::local_now()) {
                    break;
                }
                if let Err(e) = store.ping().await {
                    warn!(error = %e, "Keep-alive ping failed");
                }
            }
            debug!("Keep-alive ping stopped");
        });

        MarketRegime { fast, keep_alive }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_time::npt;
    use crate::services::refresher::test_support::{FailingSource, RecordingBadge};
    use crate::services::store::test_support::temp_store;

    fn scheduler() -> Scheduler<FailingSource> {
        let store = temp_store();
        let badge = Arc::new(RecordingBadge::default());
        let refresher = Arc::new(Refresher::new(store, FailingSource, badge));
        Scheduler::new(refresher)
    }

    #[tokio::test]
    async fn test_regime_boundary_is_half_open() {
        let mut scheduler = scheduler();

        scheduler.reconcile(npt(2025, 3, 10, 10, 59));
        assert!(scheduler.market.is_none());

        scheduler.reconcile(npt(2025, 3, 10, 11, 0));
        assert!(scheduler.market.is_some());

        scheduler.reconcile(npt(2025, 3, 10, 14, 59));
        assert!(scheduler.market.is_some());

        scheduler.reconcile(npt(2025, 3, 10, 15, 0));
        assert!(scheduler.market.is_none());
    }

    #[tokio::test]
    async fn test_reconcile_restarts_finished_regime() {
        let mut scheduler = scheduler();
        scheduler.reconcile(npt(2025, 3, 10, 11, 0));

        // Simulate the regime tasks dying while the window is open.
        let regime = scheduler.market.as_ref().unwrap();
        regime.abort();
        while !scheduler.market.as_ref().unwrap().is_finished() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        scheduler.reconcile(npt(2025, 3, 10, 12, 0));
        let regime = scheduler.market.as_ref().unwrap();
        assert!(!regime.is_finished());
    }

    #[tokio::test]
    async fn test_reconcile_keeps_live_regime_running() {
        let mut scheduler = scheduler();
        scheduler.reconcile(npt(2025, 3, 10, 11, 0));

        scheduler.reconcile(npt(2025, 3, 10, 12, 0));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!scheduler.market.as_ref().unwrap().is_finished());
    }
}
