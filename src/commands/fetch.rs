use std::sync::Arc;

use crate::services::{PriceFetcher, Refresher, Store, TerminalBadge};
use crate::utils::get_data_dir;

/// One refresh cycle in-process: fetch, resolve the close, paint the
/// terminal badge, record the snapshot. Exits non-zero on failure.
pub async fn run() {
    let store = Store::new(get_data_dir());
    let refresher = Refresher::new(store, PriceFetcher::new(), Arc::new(TerminalBadge));

    if let Err(e) = refresher.refresh_now().await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}
