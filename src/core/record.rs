//! Conversion result types shared across the provider and store seams.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// How the exchange rate behind a conversion was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    Cached,
    Same,
}

impl RateSource {
    /// Provenance line shown next to a conversion result.
    pub fn describe(&self) -> &'static str {
        match self {
            RateSource::Live => "Live exchange rate (updated in real-time)",
            RateSource::Cached => "Cached rate (offline mode)",
            RateSource::Same => "Same currency",
        }
    }
}

/// A single completed conversion. Records are never mutated after
/// creation; the history only prepends and clears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    #[serde(deserialize_with = "number_or_string")]
    pub converted_amount: f64,
    pub exchange_rate: f64,
    pub source: RateSource,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Backends emit `converted_amount` either as a JSON number or as a
/// numeric string; accept both.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// The reference backend timestamps records with a naive ISO-8601
/// instant; our own snapshots are RFC 3339. Parse either, naive
/// instants are taken as UTC.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
