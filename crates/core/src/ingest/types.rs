use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerResponse {
    pub finance: ScreenerFinance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerFinance {
    #[serde(default)]
    pub result: Option<Vec<ScreenerResult>>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerResult {
    #[serde(default)]
    pub quotes: Vec<ScreenerQuote>,
}

/// One screener row. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerQuote {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(
        default,
        rename = "marketCap",
        alias = "market_cap",
        deserialize_with = "lenient_number"
    )]
    pub market_cap: Option<f64>,
    #[serde(
        default,
        rename = "averageDailyVolume3Month",
        alias = "average_daily_volume_3month",
        deserialize_with = "lenient_number"
    )]
    pub average_daily_volume_3_month: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, rename = "longName")]
    pub long_name: Option<String>,
    #[serde(default, rename = "shortName")]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub adjclose: Vec<AdjCloseSeries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjCloseSeries {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// Adjusted closes with gaps dropped. Empty when the series is missing.
    pub fn adjusted_closes(&self) -> Vec<f64> {
        self.indicators
            .adjclose
            .first()
            .map(|s| {
                s.adjclose
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|p| p.is_finite())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> Option<String> {
        self.meta
            .long_name
            .as_deref()
            .or(self.meta.short_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

// Some endpoints report numbers as `{"raw": 123, "fmt": "123"}`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Object(o)) => o.get("raw").and_then(Value::as_f64),
        _ => None,
    })
}
