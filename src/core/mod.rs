//! Core conversion contract: records, errors, seams and the session.

pub mod error;
pub mod provider;
pub mod record;
pub mod session;

// Re-export main types for cleaner imports
pub use error::ConvertError;
pub use provider::{ConversionProvider, HistoryStore};
pub use record::{ConversionRecord, RateSource};
pub use session::{ConversionSession, HISTORY_DISPLAY_LIMIT};
