//! The conversion session: input validation, request dispatch and the
//! ordered history cache behind both.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::error::ConvertError;
use super::provider::{ConversionProvider, HistoryStore};
use super::record::ConversionRecord;

/// How many records the view layer shows; the session retains the full
/// set and leaves truncation to consumers.
pub const HISTORY_DISPLAY_LIMIT: usize = 20;

const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Owns the currency map and the conversion history for one session.
/// Single logical flow: operations take `&mut self` and run to
/// completion, the provider and store awaits are the only suspension
/// points.
pub struct ConversionSession {
    provider: Arc<dyn ConversionProvider>,
    store: Arc<dyn HistoryStore>,
    currencies: HashMap<String, String>,
    history: Vec<ConversionRecord>,
    persist_failures: usize,
}

impl ConversionSession {
    /// Builds a session: fetches the currency map and the persisted
    /// history. Neither failure blocks session start; both are logged.
    pub async fn start(
        provider: Arc<dyn ConversionProvider>,
        store: Arc<dyn HistoryStore>,
    ) -> Self {
        let currencies = match provider.currencies().await {
            Ok(map) => {
                debug!(count = map.len(), "Currencies loaded");
                map
            }
            Err(e) => {
                warn!(error = %e, "Failed to load currencies");
                HashMap::new()
            }
        };

        let mut session = Self {
            provider,
            store,
            currencies,
            history: Vec::new(),
            persist_failures: 0,
        };
        session.load_initial_history().await;
        session
    }

    /// Loads persisted history, most-recent-first. On failure the
    /// session starts with an empty history.
    pub async fn load_initial_history(&mut self) -> &[ConversionRecord] {
        self.history = match self.store.load().await {
            Ok(records) => {
                debug!(count = records.len(), "Conversion history loaded");
                records
            }
            Err(e) => {
                warn!(error = %e, "Failed to load conversion history");
                Vec::new()
            }
        };
        &self.history
    }

    /// Converts `amount` units of `from` into `to`. Validation failures
    /// are reported before any request is issued. On success the record
    /// is prepended to the history and persisted; a persistence failure
    /// is logged and counted but never surfaced.
    pub async fn convert(
        &mut self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> Result<ConversionRecord, ConvertError> {
        let amount = validate_amount(amount)?;
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        if from == to {
            return Err(ConvertError::Validation(
                "Please select different currencies".to_string(),
            ));
        }

        let record = self.provider.convert(amount, &from, &to).await?;

        self.history.insert(0, record.clone());
        if let Err(e) = self.store.append(&record).await {
            self.persist_failures += 1;
            warn!(error = %e, "Failed to persist conversion record");
        }

        Ok(record)
    }

    /// All retained records, most-recent-first. Display consumers take
    /// the first [`HISTORY_DISPLAY_LIMIT`].
    pub fn history(&self) -> std::slice::Iter<'_, ConversionRecord> {
        self.history.iter()
    }

    /// Clears the in-memory history unconditionally, then asks the
    /// store to drop its records. A store failure is logged, never
    /// surfaced.
    pub async fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear persisted history");
        }
    }

    pub fn currencies(&self) -> &HashMap<String, String> {
        &self.currencies
    }

    /// Persistence failures swallowed during this session.
    pub fn persist_failures(&self) -> usize {
        self.persist_failures
    }
}

fn validate_amount(raw: &str) -> Result<f64, ConvertError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::Validation(
            "Please enter an amount".to_string(),
        ));
    }
    let amount: f64 = trimmed.parse().map_err(|_| {
        ConvertError::Validation("Please enter a valid number".to_string())
    })?;
    if !amount.is_finite() {
        return Err(ConvertError::Validation(
            "Please enter a valid number".to_string(),
        ));
    }
    if amount < 0.0 {
        return Err(ConvertError::Validation(
            "Amount cannot be negative".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(ConvertError::Validation(
            "Amount is too large".to_string(),
        ));
    }
    Ok(amount)
}
