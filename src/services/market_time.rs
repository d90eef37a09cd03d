use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};

use crate::constants::{MARKET_CLOSE_HOUR, MARKET_OPEN_HOUR, NPT_OFFSET_SECS};

/// The fixed Nepal Time offset (+05:45).
///
/// All hour-of-day checks and date derivations in the watcher go through
/// this offset, never through the host timezone.
pub fn npt_offset() -> FixedOffset {
    FixedOffset::east_opt(NPT_OFFSET_SECS).expect("NPT offset is in range")
}

/// Current instant on the Nepal clock.
pub fn local_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&npt_offset())
}

/// Current market-local calendar date.
pub fn local_date() -> NaiveDate {
    local_now().date_naive()
}

/// Whether `now` falls inside the market-hours regime window [11, 15).
pub fn is_market_hours(now: DateTime<FixedOffset>) -> bool {
    let hour = now.hour();
    hour >= MARKET_OPEN_HOUR && hour < MARKET_CLOSE_HOUR
}

/// Whether `now` is at or past the 15:00 close, when the official close
/// may be snapshotted for the day.
pub fn is_after_close(now: DateTime<FixedOffset>) -> bool {
    now.hour() >= MARKET_CLOSE_HOUR
}

#[cfg(test)]
pub(crate) fn npt(y: i32, m: u32, d: u32, hour: u32, min: u32) -> DateTime<FixedOffset> {
    use chrono::TimeZone;
    npt_offset()
        .with_ymd_and_hms(y, m, d, hour, min, 0)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_five_forty_five() {
        assert_eq!(npt_offset().local_minus_utc(), 5 * 3600 + 45 * 60);
    }

    #[test]
    fn test_market_hours_boundary_is_half_open() {
        assert!(!is_market_hours(npt(2025, 3, 10, 10, 59)));
        assert!(is_market_hours(npt(2025, 3, 10, 11, 0)));
        assert!(is_market_hours(npt(2025, 3, 10, 14, 59)));
        assert!(!is_market_hours(npt(2025, 3, 10, 15, 0)));
    }

    #[test]
    fn test_after_close() {
        assert!(!is_after_close(npt(2025, 3, 10, 14, 59)));
        assert!(is_after_close(npt(2025, 3, 10, 15, 0)));
        assert!(is_after_close(npt(2025, 3, 10, 23, 30)));
    }

    #[test]
    fn test_date_follows_npt_not_utc() {
        use chrono::TimeZone;
        // 18:30 UTC is already 00:15 next day in Nepal.
        let late_utc = Utc.with_ymd_and_hms(2025, 3, 10, 18, 30, 0).unwrap();
        let local = late_utc.with_timezone(&npt_offset());
        assert_eq!(
            local.date_naive(),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
    }
}
