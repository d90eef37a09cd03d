use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::trace;

use crate::constants::{CACHE_FILE, CONFIG_FILE, DEFAULT_SYMBOL, REFRESH_TRIGGER_FILE};
use crate::error::Result;
use crate::models::{close_key, ClosePrice, LastSnapshot};

/// File-backed key-value store with two scopes.
///
/// The synced scope (`config.json`) holds the user's tracked symbol; the
/// local scope (`cache.json`) holds per-symbol close records and the last
/// observed snapshot. Writes are whole-document rewrites of small JSON
/// files; overlapping refresh cycles may interleave them and the last
/// write wins, which is fine because every write is a snapshot of current
/// truth rather than an accumulation.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

/// Synced scope: the single piece of user configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SyncedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
}

/// Local scope. The flattened map keeps close records under their
/// `close_<SYMBOL>` keys at the top level of the document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalCache {
    #[serde(
        rename = "lastStock",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    last_stock: Option<LastSnapshot>,

    #[serde(flatten)]
    closes: HashMap<String, ClosePrice>,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the synced-scope file, watched for symbol changes.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE)
    }

    /// Path of the "refresh now" trigger file, watched by the daemon.
    pub fn trigger_path(&self) -> PathBuf {
        self.data_dir.join(REFRESH_TRIGGER_FILE)
    }

    /// Tracked symbol, falling back to the default when unset.
    pub async fn symbol(&self) -> Result<String> {
        let config: SyncedConfig = self.read_document(&self.config_path()).await?;
        Ok(config.symbol.unwrap_or_else(|| DEFAULT_SYMBOL.to_string()))
    }

    pub async fn set_symbol(&self, symbol: &str) -> Result<()> {
        let config = SyncedConfig {
            symbol: Some(symbol.to_string()),
        };
        self.write_document(&self.config_path(), &config).await
    }

    pub async fn close_price(&self, symbol: &str) -> Result<Option<ClosePrice>> {
        let cache: LocalCache = self.read_document(&self.cache_path()).await?;
        Ok(cache.closes.get(&close_key(symbol)).cloned())
    }

    pub async fn set_close_price(&self, symbol: &str, record: ClosePrice) -> Result<()> {
        let mut cache: LocalCache = self.read_document(&self.cache_path()).await?;
        cache.closes.insert(close_key(symbol), record);
        self.write_document(&self.cache_path(), &cache).await
    }

    pub async fn last_snapshot(&self) -> Result<Option<LastSnapshot>> {
        let cache: LocalCache = self.read_document(&self.cache_path()).await?;
        Ok(cache.last_stock)
    }

    pub async fn save_snapshot(&self, snapshot: LastSnapshot) -> Result<()> {
        let mut cache: LocalCache = self.read_document(&self.cache_path()).await?;
        cache.last_stock = Some(snapshot);
        self.write_document(&self.cache_path(), &cache).await
    }

    /// Keep-alive ping: a no-op read of the local scope. The scheduler
    /// issues these during market hours so the process shows periodic
    /// storage activity to the host.
    pub async fn ping(&self) -> Result<()> {
        let cache: LocalCache = self.read_document(&self.cache_path()).await?;
        trace!(closes = cache.closes.len(), "Store ping");
        Ok(())
    }

    /// Touch the refresh trigger file. Each touch writes a fresh payload
    /// so file watchers observe a modification.
    pub async fn touch_refresh_trigger(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        tokio::fs::write(self.trigger_path(), stamp).await?;
        Ok(())
    }

    async fn read_document<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document<T: Serialize>(&self, path: &Path, document: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let json = serde_json::to_string_pretty(document)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Store;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store rooted in a fresh directory under the system temp dir.
    pub fn temp_store() -> Store {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "nepsewatch-test-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        Store::new(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_store;
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_symbol_defaults_to_nmic() {
        let store = temp_store();
        assert_eq!(store.symbol().await.unwrap(), "NMIC");
    }

    #[tokio::test]
    async fn test_symbol_roundtrip() {
        let store = temp_store();
        store.set_symbol("NABIL").await.unwrap();
        assert_eq!(store.symbol().await.unwrap(), "NABIL");
    }

    #[tokio::test]
    async fn test_close_record_keyed_by_symbol() {
        let store = temp_store();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        store
            .set_close_price("NMIC", ClosePrice::new(512.0, date))
            .await
            .unwrap();
        store
            .set_close_price("NABIL", ClosePrice::new(1200.0, date))
            .await
            .unwrap();

        let nmic = store.close_price("NMIC").await.unwrap().unwrap();
        assert_eq!(nmic.price, 512.0);
        let nabil = store.close_price("NABIL").await.unwrap().unwrap();
        assert_eq!(nabil.price, 1200.0);
        assert!(store.close_price("HIDCL").await.unwrap().is_none());

        // The on-disk document keeps the close_<SYMBOL> key shape.
        let raw = std::fs::read_to_string(store.cache_path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(doc.get("close_NMIC").is_some());
        assert!(doc.get("close_NABIL").is_some());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_and_overwrite() {
        let store = temp_store();
        assert!(store.last_snapshot().await.unwrap().is_none());

        store
            .save_snapshot(LastSnapshot::new("NMIC", 500.0, 1.5))
            .await
            .unwrap();
        store
            .save_snapshot(LastSnapshot::new("NMIC", 505.0, 2.5))
            .await
            .unwrap();

        let snapshot = store.last_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.ltp, 505.0);
        assert_eq!(snapshot.change_percent, 2.5);
    }

    #[tokio::test]
    async fn test_snapshot_save_preserves_close_records() {
        let store = temp_store();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        store
            .set_close_price("NMIC", ClosePrice::new(512.0, date))
            .await
            .unwrap();
        store
            .save_snapshot(LastSnapshot::new("NMIC", 500.0, -2.3))
            .await
            .unwrap();

        assert!(store.close_price("NMIC").await.unwrap().is_some());
        assert!(store.last_snapshot().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ping_tolerates_missing_cache() {
        let store = temp_store();
        store.ping().await.unwrap();
    }
}
