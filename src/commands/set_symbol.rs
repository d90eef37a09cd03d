use tracing::warn;

use crate::error::{AppError, Result};
use crate::services::Store;
use crate::utils::get_data_dir;

pub async fn run(symbol: String) {
    if let Err(e) = set(&symbol).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn set(symbol: &str) -> Result<()> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidInput(format!(
            "ticker symbols are non-empty and alphanumeric, got {:?}",
            symbol
        )));
    }

    let store = Store::new(get_data_dir());
    store.set_symbol(&symbol).await?;
    println!("✅ Tracking {}", symbol);

    // Best-effort nudge: a running watcher refreshes on the trigger
    // touch, but the config write above already triggers one, so a
    // failure here costs nothing.
    if let Err(e) = store.touch_refresh_trigger().await {
        warn!(error = %e, "Could not touch refresh trigger");
    }
    Ok(())
}
