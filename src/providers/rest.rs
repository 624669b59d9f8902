use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::core::error::ConvertError;
use crate::core::provider::{ConversionProvider, HistoryStore};
use crate::core::record::{ConversionRecord, RateSource};

/// Client for the conversion backend. Implements both the rate side
/// ([`ConversionProvider`]) and the persistence side ([`HistoryStore`]):
/// the backend records each conversion while serving it and exposes the
/// accumulated history behind its own endpoints.
pub struct RestProvider {
    base_url: String,
    http: reqwest::Client,
}

impl RestProvider {
    pub fn new(base_url: &str) -> Self {
        RestProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize, Debug)]
struct ConvertRequest<'a> {
    amount: String,
    from_currency: &'a str,
    to_currency: &'a str,
}

#[derive(Deserialize, Debug)]
struct ConvertResponse {
    success: bool,
    error: Option<String>,
    #[serde(default, deserialize_with = "optional_numeric")]
    converted_amount: Option<f64>,
    exchange_rate: Option<f64>,
    source: Option<RateSource>,
}

#[derive(Deserialize, Debug)]
struct ClearResponse {
    success: bool,
}

// `converted_amount` arrives as a JSON number or a numeric string.
fn optional_numeric<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => Some(s.trim().parse().map_err(serde::de::Error::custom)?),
    })
}

#[async_trait]
impl ConversionProvider for RestProvider {
    async fn currencies(&self) -> Result<HashMap<String, String>, ConvertError> {
        let url = format!("{}/api/currencies", self.base_url);
        debug!("Requesting currency list from {}", url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ConvertError::Network(format!(
                "HTTP error: {} fetching currency list",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            ConvertError::Network(format!("Failed to parse currency list: {e}"))
        })
    }

    async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
    ) -> Result<ConversionRecord, ConvertError> {
        let url = format!("{}/api/convert", self.base_url);
        debug!("Requesting conversion {from} -> {to} from {url}");

        let body = ConvertRequest {
            amount: amount.to_string(),
            from_currency: from,
            to_currency: to,
        };

        // The backend replies with a non-2xx status on rejection but
        // still carries the `success`/`error` body, so decode before
        // looking at the status.
        let response = self.http.post(&url).json(&body).send().await?;
        let reply: ConvertResponse = response.json().await.map_err(|e| {
            ConvertError::Network(format!("Failed to parse conversion response: {e}"))
        })?;

        if !reply.success {
            return Err(ConvertError::Rejected(
                reply.error.unwrap_or_else(|| "Conversion failed".to_string()),
            ));
        }

        let (Some(converted_amount), Some(exchange_rate), Some(source)) =
            (reply.converted_amount, reply.exchange_rate, reply.source)
        else {
            return Err(ConvertError::Network(
                "Conversion response is missing fields".to_string(),
            ));
        };

        Ok(ConversionRecord {
            amount,
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            converted_amount,
            exchange_rate,
            source,
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl HistoryStore for RestProvider {
    async fn load(&self) -> Result<Vec<ConversionRecord>> {
        let url = format!("{}/api/history", self.base_url);
        debug!("Requesting conversion history from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("History request failed: {url}"))?;
        if !response.status().is_success() {
            bail!("HTTP error: {} fetching history", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse history response")
    }

    // The backend already stored the record while serving the
    // conversion; there is nothing further to send.
    async fn append(&self, _record: &ConversionRecord) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let url = format!("{}/api/clear-history", self.base_url);
        debug!("Requesting history clear at {}", url);

        let response = self
            .http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("Clear request failed: {url}"))?;
        let reply: ClearResponse = response
            .json()
            .await
            .context("Failed to parse clear response")?;

        if !reply.success {
            bail!("Backend refused to clear history");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_convert_server(mock_response: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_conversion() {
        let mock_response = r#"{
            "success": true,
            "amount": 100.0,
            "from_currency": "USD",
            "converted_amount": 92.50,
            "to_currency": "EUR",
            "exchange_rate": 0.925,
            "source": "live"
        }"#;
        let mock_server = mock_convert_server(mock_response, 200).await;

        let provider = RestProvider::new(&mock_server.uri());
        let record = provider.convert(100.0, "USD", "EUR").await.unwrap();

        assert_eq!(record.amount, 100.0);
        assert_eq!(record.from_currency, "USD");
        assert_eq!(record.to_currency, "EUR");
        assert_eq!(record.converted_amount, 92.5);
        assert_eq!(record.exchange_rate, 0.925);
        assert_eq!(record.source, RateSource::Live);
    }

    #[tokio::test]
    async fn test_convert_sends_amount_as_string() {
        let mock_response = r#"{
            "success": true,
            "converted_amount": 92.5,
            "exchange_rate": 0.925,
            "source": "live"
        }"#;
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .and(body_json_string(
                r#"{"amount":"100","from_currency":"USD","to_currency":"EUR"}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        provider.convert(100.0, "USD", "EUR").await.unwrap();
    }

    #[tokio::test]
    async fn test_conversion_with_string_converted_amount() {
        let mock_response = r#"{
            "success": true,
            "converted_amount": "830.25",
            "exchange_rate": 83.025,
            "source": "cached"
        }"#;
        let mock_server = mock_convert_server(mock_response, 200).await;

        let provider = RestProvider::new(&mock_server.uri());
        let record = provider.convert(10.0, "USD", "INR").await.unwrap();

        assert_eq!(record.converted_amount, 830.25);
        assert_eq!(record.source, RateSource::Cached);
    }

    #[tokio::test]
    async fn test_rejected_conversion_carries_backend_message() {
        let mock_response = r#"{"success": false, "error": "rate unavailable"}"#;
        let mock_server = mock_convert_server(mock_response, 400).await;

        let provider = RestProvider::new(&mock_server.uri());
        let result = provider.convert(10.0, "USD", "XYZ").await;

        match result {
            Err(ConvertError::Rejected(message)) => assert_eq!(message, "rate unavailable"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_conversion_without_message_gets_fallback() {
        let mock_response = r#"{"success": false}"#;
        let mock_server = mock_convert_server(mock_response, 400).await;

        let provider = RestProvider::new(&mock_server.uri());
        let result = provider.convert(10.0, "USD", "EUR").await;

        match result {
            Err(ConvertError::Rejected(message)) => assert_eq!(message, "Conversion failed"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_conversion_response_is_a_network_error() {
        let mock_server = mock_convert_server("not json at all", 200).await;

        let provider = RestProvider::new(&mock_server.uri());
        let result = provider.convert(10.0, "USD", "EUR").await;
        assert!(matches!(result, Err(ConvertError::Network(_))));
    }

    #[tokio::test]
    async fn test_success_response_missing_fields_is_a_network_error() {
        let mock_response = r#"{"success": true}"#;
        let mock_server = mock_convert_server(mock_response, 200).await;

        let provider = RestProvider::new(&mock_server.uri());
        let result = provider.convert(10.0, "USD", "EUR").await;
        assert!(matches!(result, Err(ConvertError::Network(_))));
    }

    #[tokio::test]
    async fn test_currency_list_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/currencies"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"USD": "US Dollar", "EUR": "Euro", "JPY": "Japanese Yen"}"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        let currencies = provider.currencies().await.unwrap();

        assert_eq!(currencies.len(), 3);
        assert_eq!(currencies.get("EUR"), Some(&"Euro".to_string()));
    }

    #[tokio::test]
    async fn test_currency_list_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/currencies"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        let result = provider.currencies().await;
        assert!(matches!(result, Err(ConvertError::Network(_))));
    }

    #[tokio::test]
    async fn test_history_load_accepts_naive_timestamps() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {
                        "success": true,
                        "amount": 100.0,
                        "from_currency": "USD",
                        "to_currency": "EUR",
                        "converted_amount": 92.5,
                        "exchange_rate": 0.925,
                        "source": "live",
                        "timestamp": "2026-08-29T10:15:30.123456"
                    },
                    {
                        "amount": 10.0,
                        "from_currency": "GBP",
                        "to_currency": "JPY",
                        "converted_amount": "1902.50",
                        "exchange_rate": 190.25,
                        "source": "cached",
                        "timestamp": "2026-08-28T09:00:00+00:00"
                    }
                ]"#,
            ))
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        let history = provider.load().await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].from_currency, "USD");
        assert_eq!(history[1].converted_amount, 1902.5);
    }

    #[tokio::test]
    async fn test_history_load_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/history"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        assert!(provider.load().await.is_err());
    }

    #[tokio::test]
    async fn test_clear_history() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/clear-history"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        provider.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_history_refused_by_backend() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/clear-history"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"success": false, "error": "disk full"}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = RestProvider::new(&mock_server.uri());
        assert!(provider.clear().await.is_err());
    }
}
