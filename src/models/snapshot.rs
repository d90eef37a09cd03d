use serde::{Deserialize, Serialize};

/// Last successfully observed quote, stored under the `lastStock` key in
/// the local scope and overwritten on every successful refresh.
///
/// Only used to repaint the badge immediately after a restart, before the
/// first network fetch completes; nothing else reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSnapshot {
    /// Symbol the snapshot belongs to.
    pub symbol: String,

    /// Last traded price at snapshot time.
    pub ltp: f64,

    /// Percent change versus the official close at snapshot time.
    #[serde(rename = "changePercent")]
    pub change_percent: f64,
}

impl LastSnapshot {
    pub fn new(symbol: impl Into<String>, ltp: f64, change_percent: f64) -> Self {
        Self {
            symbol: symbol.into(),
            ltp,
            change_percent,
        }
    }
}
