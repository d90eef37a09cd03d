use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde_json::json;
use tracing::warn;

use crate::constants::badge_color;
use crate::models::LastSnapshot;
use crate::services::market_time::is_after_close;

/// Badge background color.
///
/// Color policy (time + sign variant): before the 15:00 close the sign of
/// the change picks green/red/grey; from 15:00 on the badge is always grey
/// to signal a closed market. A fetch failure uses the alert color
/// regardless of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Up,
    Down,
    Neutral,
    Alert,
}

impl BadgeColor {
    pub fn for_change(change: f64, now: DateTime<FixedOffset>) -> Self {
        if is_after_close(now) {
            BadgeColor::Neutral
        } else if change > 0.0 {
            BadgeColor::Up
        } else if change < 0.0 {
            BadgeColor::Down
        } else {
            BadgeColor::Neutral
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            BadgeColor::Up => badge_color::UP,
            BadgeColor::Down => badge_color::DOWN,
            BadgeColor::Neutral => badge_color::NEUTRAL,
            BadgeColor::Alert => badge_color::ALERT,
        }
    }

    /// CSS class name for status-bar surfaces.
    pub fn class(self) -> &'static str {
        match self {
            BadgeColor::Up => "up",
            BadgeColor::Down => "down",
            BadgeColor::Neutral => "neutral",
            BadgeColor::Alert => "alert",
        }
    }

    /// ANSI background + foreground escape for the terminal surface.
    fn ansi(self) -> &'static str {
        match self {
            BadgeColor::Up => "\x1b[42;30m",
            BadgeColor::Down => "\x1b[41;97m",
            BadgeColor::Neutral => "\x1b[100;97m",
            BadgeColor::Alert => "\x1b[41;97m",
        }
    }
}

/// Percent change of `ltp` against `close`, unrounded. A zero close (no
/// meaningful reference) reads as unchanged.
pub fn percent_change(ltp: f64, close: f64) -> f64 {
    if close == 0.0 {
        0.0
    } else {
        (ltp - close) / close * 100.0
    }
}

/// Everything a badge surface needs to render one state: short text, a
/// background color, and a multi-line tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeState {
    pub text: String,
    pub color: BadgeColor,
    pub tooltip: String,
}

impl BadgeState {
    /// State for a freshly fetched quote. Display rounds the change and
    /// percent to two decimals; the badge text is the raw price.
    pub fn quote(symbol: &str, ltp: f64, close: f64, now: DateTime<FixedOffset>) -> Self {
        let change = ltp - close;
        let percent = percent_change(ltp, close);
        Self {
            text: ltp.to_string(),
            color: BadgeColor::for_change(change, now),
            tooltip: format!(
                "{}\nLTP: {}\nOfficial Close: {}\nChange: {:.2} ({:.2}%)",
                symbol, ltp, close, change, percent
            ),
        }
    }

    /// State restored from the last snapshot on startup, before any fetch
    /// has completed. The stored percent change stands in for the change
    /// sign since no fresh close lookup has happened yet.
    pub fn restored(snapshot: &LastSnapshot, now: DateTime<FixedOffset>) -> Self {
        Self {
            text: snapshot.ltp.to_string(),
            color: BadgeColor::for_change(snapshot.change_percent, now),
            tooltip: format!(
                "{}\nLTP: {}\nChange: {:.2}%",
                snapshot.symbol, snapshot.ltp, snapshot.change_percent
            ),
        }
    }

    /// Terminal error state; stays up until the next successful refresh.
    pub fn fetch_error() -> Self {
        Self {
            text: "ERR".to_string(),
            color: BadgeColor::Alert,
            tooltip: "Error fetching stock price".to_string(),
        }
    }
}

/// A surface the badge can be painted onto. Paints never fail upward; a
/// surface that cannot render logs and moves on.
pub trait BadgeSurface: Send + Sync {
    fn paint(&self, state: &BadgeState);
}

/// One colored line on stdout.
pub struct TerminalBadge;

impl BadgeSurface for TerminalBadge {
    fn paint(&self, state: &BadgeState) {
        let detail = state.tooltip.replace('\n', "  ");
        println!("{} {} \x1b[0m  {}", state.color.ansi(), state.text, detail);
    }
}

/// Status-bar JSON file surface, the custom-module format waybar and
/// friends poll. `class` drives CSS theming; `color` carries the raw hex
/// for bars that read it directly.
pub struct FileBadge {
    path: PathBuf,
}

impl FileBadge {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BadgeSurface for FileBadge {
    fn paint(&self, state: &BadgeState) {
        let payload = json!({
            "text": state.text,
            "tooltip": state.tooltip,
            "class": state.color.class(),
            "color": state.color.hex(),
        });
        if let Err(e) = std::fs::write(&self.path, payload.to_string()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write badge file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_time::npt;

    #[test]
    fn test_color_tracks_sign_before_close() {
        let noon = npt(2025, 3, 10, 12, 0);
        assert_eq!(BadgeColor::for_change(4.5, noon), BadgeColor::Up);
        assert_eq!(BadgeColor::for_change(-4.5, noon), BadgeColor::Down);
        assert_eq!(BadgeColor::for_change(0.0, noon), BadgeColor::Neutral);
    }

    #[test]
    fn test_color_always_neutral_after_close() {
        let evening = npt(2025, 3, 10, 15, 0);
        assert_eq!(BadgeColor::for_change(4.5, evening), BadgeColor::Neutral);
        assert_eq!(BadgeColor::for_change(-4.5, evening), BadgeColor::Neutral);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(510.0, 500.0), 2.0);
        assert_eq!(percent_change(495.0, 500.0), -1.0);
        assert_eq!(percent_change(1200.0, 0.0), 0.0);
    }

    #[test]
    fn test_quote_text_is_plain_price() {
        let state = BadgeState::quote("NABIL", 1200.0, 1200.0, npt(2025, 3, 10, 14, 0));
        assert_eq!(state.text, "1200");
        assert_eq!(state.color, BadgeColor::Neutral);
        assert!(state.tooltip.contains("Official Close: 1200"));
        assert!(state.tooltip.contains("Change: 0.00 (0.00%)"));
    }

    #[test]
    fn test_quote_rounds_display_to_two_decimals() {
        let state = BadgeState::quote("NMIC", 512.5, 500.0, npt(2025, 3, 10, 12, 0));
        assert_eq!(state.text, "512.5");
        assert_eq!(state.color, BadgeColor::Up);
        assert!(state.tooltip.contains("Change: 12.50 (2.50%)"));
    }

    #[test]
    fn test_restored_uses_stored_percent_for_sign() {
        let snapshot = LastSnapshot::new("NMIC", 500.0, 1.5);
        let state = BadgeState::restored(&snapshot, npt(2025, 3, 10, 12, 0));
        assert_eq!(state.text, "500");
        assert_eq!(state.color, BadgeColor::Up);
        assert!(state.tooltip.contains("Change: 1.50%"));

        let state = BadgeState::restored(&snapshot, npt(2025, 3, 10, 20, 0));
        assert_eq!(state.color, BadgeColor::Neutral);
    }

    #[test]
    fn test_fetch_error_state() {
        let state = BadgeState::fetch_error();
        assert_eq!(state.text, "ERR");
        assert_eq!(state.color, BadgeColor::Alert);
    }
}
