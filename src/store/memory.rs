use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::provider::HistoryStore;
use crate::core::record::ConversionRecord;

/// In-memory history store. Used as the fallback when the on-disk
/// keyspace cannot be opened, so a session still runs with durability
/// degraded to its own lifetime.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ConversionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn load(&self) -> Result<Vec<ConversionRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn append(&self, record: &ConversionRecord) -> Result<()> {
        self.records.lock().await.insert(0, record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records.lock().await.clear();
        Ok(())
    }
}
