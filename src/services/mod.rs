pub mod badge;
pub mod close_cache;
pub mod config_watch;
pub mod fetcher;
pub mod market_time;
pub mod refresher;
pub mod store;

pub use badge::{BadgeState, BadgeSurface, FileBadge, TerminalBadge};
pub use config_watch::{ConfigWatch, RefreshTrigger};
pub use fetcher::{FetchError, PriceFetcher, PriceSource};
pub use refresher::Refresher;
pub use store::Store;
