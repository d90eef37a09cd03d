use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Official close record for one symbol, keyed `close_<SYMBOL>` in the
/// local store scope.
///
/// Written at most once per symbol per market-local date, and only at or
/// after the 15:00 close. `date` is the market-local calendar date the
/// record belongs to; once it no longer matches "today" the record is
/// stale and the next post-close refresh overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePrice {
    /// Last traded price captured at snapshot time.
    pub price: f64,

    /// Market-local date (`YYYY-MM-DD`) the snapshot was taken on.
    pub date: NaiveDate,
}

impl ClosePrice {
    pub fn new(price: f64, date: NaiveDate) -> Self {
        Self { price, date }
    }

    /// Whether this record was snapshotted on the given market-local date.
    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}

/// Local-scope storage key for a symbol's close record.
pub fn close_key(symbol: &str) -> String {
    format!("close_{}", symbol)
}
