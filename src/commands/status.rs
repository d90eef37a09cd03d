use crate::error::Result;
use crate::services::market_time;
use crate::services::Store;
use crate::utils::get_data_dir;

/// Report the cached watcher state without touching the network.
pub async fn run() {
    println!("📊 nepsewatch status\n");

    if let Err(e) = show_status().await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn show_status() -> Result<()> {
    let store = Store::new(get_data_dir());
    let symbol = store.symbol().await?;

    println!("🔹 Tracked symbol: {}", symbol);

    match store.last_snapshot().await? {
        Some(snapshot) => {
            println!(
                "   Last price:     {} ({} {:+.2}%)",
                snapshot.ltp, snapshot.symbol, snapshot.change_percent
            );
        }
        None => {
            println!("   Last price:     none yet — run 'nepsewatch fetch' or 'nepsewatch watch'");
        }
    }

    match store.close_price(&symbol).await? {
        Some(close) => {
            let staleness = if close.is_for(market_time::local_date()) {
                ""
            } else {
                " — stale, awaiting today's close"
            };
            println!(
                "   Official close: {} (snapshotted {}{})",
                close.price, close.date, staleness
            );
        }
        None => {
            println!("   Official close: not cached yet");
        }
    }

    println!("\n💡 Data directory: {}", store.data_dir().display());
    Ok(())
}
