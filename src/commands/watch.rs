use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::services::badge::BadgeSurface;
use crate::services::{ConfigWatch, FileBadge, PriceFetcher, Refresher, Store, TerminalBadge};
use crate::utils::get_data_dir;
use crate::worker::Scheduler;

pub async fn run(badge_file: Option<PathBuf>) {
    if let Err(e) = watch(badge_file).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn watch(badge_file: Option<PathBuf>) -> Result<()> {
    let store = Store::new(get_data_dir());
    info!(data_dir = %store.data_dir().display(), "Starting nepsewatch");

    let badge: Arc<dyn BadgeSurface> = match badge_file {
        Some(path) => {
            info!(path = %path.display(), "Painting badge to file");
            Arc::new(FileBadge::new(path))
        }
        None => Arc::new(TerminalBadge),
    };
    let refresher = Arc::new(Refresher::new(store.clone(), PriceFetcher::new(), badge));

    // Paint the stored snapshot before the first fetch resolves, so a
    // restart shows the previous price instead of an empty badge.
    refresher.restore_badge().await;

    // Symbol changes and explicit refresh requests bypass the timers.
    let mut triggers = ConfigWatch::new(&store)?;
    let trigger_refresher = refresher.clone();
    tokio::spawn(async move {
        while let Some(trigger) = triggers.next().await {
            info!(?trigger, "Refresh requested outside timer cadence");
            let refresher = trigger_refresher.clone();
            tokio::spawn(async move {
                refresher.refresh().await;
            });
        }
    });

    // The scheduler's first baseline tick fires immediately, which is
    // the fresh fetch that follows the restore above.
    let scheduler = Scheduler::new(refresher);
    tokio::spawn(scheduler.run());

    tokio::signal::ctrl_c().await.ok();
    info!("Shutting down");
    Ok(())
}
