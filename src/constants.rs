//! Watcher constants
//!
//! Market-time values are hours on the +05:45 Nepal clock (see
//! `services::market_time`), never host-local hours.

/// Price API endpoint. Returns a JSON body with a numeric `ltp` field.
pub const PRICE_API_BASE: &str = "https://nepsetty.kokomo.workers.dev/api/stock";

/// Tracked symbol used until the user sets one.
pub const DEFAULT_SYMBOL: &str = "NMIC";

/// Nepal Time offset from UTC: +05:45.
pub const NPT_OFFSET_SECS: i32 = 5 * 3600 + 45 * 60;

/// First hour of the market-hours scheduler regime (inclusive).
pub const MARKET_OPEN_HOUR: u32 = 11;

/// End of the market-hours regime (exclusive) and the hour from which the
/// official close may be snapshotted.
pub const MARKET_CLOSE_HOUR: u32 = 15;

/// Baseline refresh cadence, active around the clock.
pub const BASELINE_INTERVAL_SECS: u64 = 60;

/// Fast refresh cadence while the market-hours regime is active.
pub const FAST_INTERVAL_SECS: u64 = 5;

/// Cadence of the keep-alive store ping during the market-hours regime.
pub const KEEP_ALIVE_INTERVAL_SECS: u64 = 25;

/// Badge background colors (shared by every badge surface).
pub mod badge_color {
    /// Positive change before market close.
    pub const UP: &str = "#4CAF50";
    /// Negative change before market close.
    pub const DOWN: &str = "#FF0000";
    /// Flat change, or any change once the market is closed.
    pub const NEUTRAL: &str = "#808080";
    /// Fetch failure.
    pub const ALERT: &str = "#FF0000";
}

/// Synced-scope store file (tracked symbol).
pub const CONFIG_FILE: &str = "config.json";

/// Local-scope store file (close records + last snapshot).
pub const CACHE_FILE: &str = "cache.json";

/// Touch target for "refresh now" requests from the CLI.
pub const REFRESH_TRIGGER_FILE: &str = "refresh";
