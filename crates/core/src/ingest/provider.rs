use crate::config::Settings;
use crate::ingest::types::{ChartResponse, ChartResult, ScreenerQuote, ScreenerResponse};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const SCREENER_PATH: &str = "/v1/finance/screener/predefined/saved";
const CHART_PATH: &str = "/v8/finance/chart";

/// Trailing window for a price-history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    pub days: i64,
}

impl Lookback {
    pub const ONE_MONTH: Lookback = Lookback { days: 30 };

    pub fn bounds(self, now: DateTime<Utc>) -> (i64, i64) {
        let start = now - ChronoDuration::days(self.days);
        (start.timestamp(), now.timestamp())
    }
}

#[async_trait::async_trait]
pub trait ScreenerProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_screener(&self, collection: &str, count: usize) -> Result<Vec<ScreenerQuote>>;
}

#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Adjusted closes over the window, oldest first. Empty when the provider has no series.
    async fn fetch_adjusted_closes(&self, symbol: &str, window: Lookback) -> Result<Vec<f64>>;

    async fn fetch_display_name(&self, symbol: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .yahoo_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("YAHOO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(Self::headers())
            .build()
            .context("failed to build yahoo http client")?;

        Ok(Self { http, base_url })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        // Yahoo rejects requests without a browser-like agent.
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (compatible; folio/0.1)"),
        );
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .context("yahoo request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read yahoo response")?;
        if !status.is_success() {
            anyhow::bail!("yahoo HTTP {status}: {text}");
        }

        serde_json::from_str::<T>(&text)
            .with_context(|| format!("unexpected yahoo response shape: {text}"))
    }

    async fn fetch_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<ChartResult> {
        let url = self.url(&format!("{CHART_PATH}/{symbol}"));
        let body: ChartResponse = self.get_json(url, query).await?;
        if let Some(err) = body.chart.error.filter(|e| !e.is_null()) {
            anyhow::bail!("yahoo chart error for {symbol}: {err}");
        }
        body.chart
            .result
            .and_then(|r| r.into_iter().next())
            .with_context(|| format!("yahoo chart returned no result for {symbol}"))
    }
}

#[async_trait::async_trait]
impl ScreenerProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_screener"
    }

    async fn fetch_screener(&self, collection: &str, count: usize) -> Result<Vec<ScreenerQuote>> {
        let query = [
            ("scrIds", collection.to_string()),
            ("count", count.to_string()),
        ];
        let body: ScreenerResponse = self.get_json(self.url(SCREENER_PATH), &query).await?;
        if let Some(err) = body.finance.error.filter(|e| !e.is_null()) {
            anyhow::bail!("yahoo screener error for {collection}: {err}");
        }

        let quotes = body
            .finance
            .result
            .and_then(|r| r.into_iter().next())
            .map(|r| r.quotes)
            .unwrap_or_default();
        Ok(quotes)
    }
}

#[async_trait::async_trait]
impl PriceHistoryProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_adjusted_closes(&self, symbol: &str, window: Lookback) -> Result<Vec<f64>> {
        let (period1, period2) = window.bounds(Utc::now());
        let query = [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        let result = self.fetch_chart(symbol, &query).await?;
        Ok(result.adjusted_closes())
    }

    async fn fetch_display_name(&self, symbol: &str) -> Result<Option<String>> {
        let query = [("range", "1d".to_string()), ("interval", "1d".to_string())];
        let result = self.fetch_chart(symbol, &query).await?;
        Ok(result.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lookback_bounds_span_the_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        let (start, end) = Lookback::ONE_MONTH.bounds(now);
        assert_eq!(end - start, 30 * 24 * 3600);
        assert_eq!(end, now.timestamp());
    }

    #[test]
    fn url_joins_without_double_slash() {
        let settings = Settings {
            openai_api_key: None,
            anthropic_api_key: None,
            llm_provider: None,
            sentry_dsn: None,
            reports_dir: None,
            yahoo_base_url: Some("http://localhost:9999/".to_string()),
        };
        let client = YahooClient::from_settings(&settings).unwrap();
        assert_eq!(
            client.url(SCREENER_PATH),
            "http://localhost:9999/v1/finance/screener/predefined/saved"
        );
    }
}
