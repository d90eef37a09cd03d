use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::error::Result;
use crate::models::ClosePrice;
use crate::services::market_time::is_after_close;
use crate::services::store::Store;

/// Resolve the official close used as the change reference for `symbol`.
///
/// At or after the 15:00 market close, the first refresh of each
/// market-local date snapshots the live price as that day's close; the
/// record then stays fixed until the date rolls over. Before the close,
/// or once today's record exists, the stored price is returned. With no
/// record at all the live price doubles as the close, which makes the
/// first run ever show zero change.
pub async fn resolve_close(
    store: &Store,
    symbol: &str,
    ltp: f64,
    now: DateTime<FixedOffset>,
) -> Result<f64> {
    let today = now.date_naive();
    let saved = store.close_price(symbol).await?;

    let already_snapshotted_today = saved.as_ref().is_some_and(|record| record.is_for(today));
    if is_after_close(now) && !already_snapshotted_today {
        store
            .set_close_price(symbol, ClosePrice::new(ltp, today))
            .await?;
        info!(symbol, close = ltp, date = %today, "Snapshotted official close");
        return Ok(ltp);
    }

    Ok(saved.map(|record| record.price).unwrap_or(ltp))
}
