use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

use super::Theme;
use crate::core::provider::HistoryStore;
use crate::core::record::ConversionRecord;

/// Upper bound on the durable snapshot. Larger than the display cap on
/// purpose: the view truncates, the store does not have to.
pub const HISTORY_PERSIST_LIMIT: usize = 50;

const HISTORY_KEY: &str = "records";
const THEME_KEY: &str = "theme";

/// Durable local store backed by a fjall keyspace: the history snapshot
/// in one partition, small preferences in another.
#[derive(Clone)]
pub struct DiskStore {
    keyspace: Keyspace,
    history: PartitionHandle,
    prefs: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let history = keyspace.open_partition("history", PartitionCreateOptions::default())?;
        let prefs = keyspace.open_partition("prefs", PartitionCreateOptions::default())?;

        Ok(DiskStore {
            keyspace,
            history,
            prefs,
        })
    }

    /// Stored theme preference; defaults to light when unset or
    /// unreadable.
    pub fn theme(&self) -> Theme {
        self.prefs
            .get(THEME_KEY)
            .ok()
            .flatten()
            .and_then(|raw| String::from_utf8(raw.to_vec()).ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.prefs.insert(THEME_KEY, theme.to_string().as_bytes())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn read_records(&self) -> Result<Vec<ConversionRecord>> {
        match self.history.get(HISTORY_KEY)? {
            Some(raw) => serde_json::from_slice(&raw).context("Corrupt history snapshot"),
            None => Ok(Vec::new()),
        }
    }

    fn write_records(&self, records: &[ConversionRecord]) -> Result<()> {
        self.history
            .insert(HISTORY_KEY, serde_json::to_vec(records)?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for DiskStore {
    async fn load(&self) -> Result<Vec<ConversionRecord>> {
        self.read_records()
    }

    async fn append(&self, record: &ConversionRecord) -> Result<()> {
        let mut records = self.read_records()?;
        records.insert(0, record.clone());
        records.truncate(HISTORY_PERSIST_LIMIT);
        self.write_records(&records)?;
        debug!(len = records.len(), "History snapshot updated");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.history.remove(HISTORY_KEY)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("History snapshot cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RateSource;
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(n: usize) -> ConversionRecord {
        ConversionRecord {
            amount: n as f64,
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            converted_amount: n as f64 * 0.925,
            exchange_rate: 0.925,
            source: RateSource::Live,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_load_most_recent_first() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        assert!(store.load().await.unwrap().is_empty());

        store.append(&record(1)).await.unwrap();
        store.append(&record(2)).await.unwrap();

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 2.0);
        assert_eq!(records[1].amount, 1.0);
    }

    #[tokio::test]
    async fn test_snapshot_is_capped() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        for n in 0..HISTORY_PERSIST_LIMIT + 5 {
            store.append(&record(n)).await.unwrap();
        }

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), HISTORY_PERSIST_LIMIT);
        // The newest record survives the cap.
        assert_eq!(records[0].amount, (HISTORY_PERSIST_LIMIT + 4) as f64);
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        store.append(&record(1)).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = DiskStore::open(dir.path()).unwrap();
            store.append(&record(7)).await.unwrap();
        }

        let store = DiskStore::open(dir.path()).unwrap();
        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 7.0);
    }

    #[tokio::test]
    async fn test_theme_defaults_to_light_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = DiskStore::open(dir.path()).unwrap();

        assert_eq!(store.theme(), Theme::Light);

        store.set_theme(Theme::Dark).unwrap();
        assert_eq!(store.theme(), Theme::Dark);
    }
}
