//! Seams between the session and its external collaborators.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use super::error::ConvertError;
use super::record::ConversionRecord;

#[async_trait]
pub trait ConversionProvider: Send + Sync {
    /// Supported currency codes mapped to their display names.
    async fn currencies(&self) -> Result<HashMap<String, String>, ConvertError>;

    /// Converts `amount` units of `from` into `to`.
    async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<ConversionRecord, ConvertError>;
}

/// Durable backing for the conversion history. Failures here are logged
/// and swallowed by the session; the in-memory view stays authoritative.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persisted records, most-recent-first.
    async fn load(&self) -> Result<Vec<ConversionRecord>>;

    /// Records a completed conversion.
    async fn append(&self, record: &ConversionRecord) -> Result<()>;

    /// Drops all persisted records.
    async fn clear(&self) -> Result<()>;
}
