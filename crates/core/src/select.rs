use crate::domain::industry::{find_industry, INDUSTRIES};
use crate::fallback::{FallbackReason, Sourced};
use crate::ingest::types::ScreenerQuote;
use crate::ingest::ScreenerProvider;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SelectionOptions {
    /// Tickers requested per industry.
    pub per_industry: usize,

    /// Cap on the aggregated pool.
    pub max_total: usize,

    /// Rows requested from the screener before local filtering.
    pub screener_count: usize,

    pub min_market_cap: f64,
    pub min_avg_volume: f64,

    /// Industries substituted (from the head of the catalog) when none are selected.
    pub default_industry_count: usize,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            per_industry: 5,
            max_total: 15,
            screener_count: 200,
            min_market_cap: 3_000_000_000.0,
            min_avg_volume: 300_000.0,
            default_industry_count: 3,
        }
    }
}

impl SelectionOptions {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("SELECT_PER_INDUSTRY") {
            if let Ok(n) = s.parse::<usize>() {
                out.per_industry = n;
            }
        }

        if let Ok(s) = std::env::var("SELECT_MAX_TOTAL") {
            if let Ok(n) = s.parse::<usize>() {
                out.max_total = n;
            }
        }

        out
    }
}

#[derive(Clone)]
pub struct TickerSelector {
    screener: Arc<dyn ScreenerProvider>,
    opts: SelectionOptions,
}

impl TickerSelector {
    pub fn new(screener: Arc<dyn ScreenerProvider>, opts: SelectionOptions) -> Self {
        Self { screener, opts }
    }

    /// Up to `count` symbols for one industry, live when the screener cooperates.
    pub async fn fetch_for_industry(&self, industry: &str, count: usize) -> Sourced<Vec<String>> {
        let Some(entry) = find_industry(industry) else {
            tracing::warn!(%industry, "no screener mapping for industry; using curated list");
            return Sourced::fallback(Vec::new(), FallbackReason::UnknownIndustry);
        };

        let curated = || sample(entry.fallback.iter().map(|s| s.to_string()).collect(), count);

        let quotes = match self
            .screener
            .fetch_screener(entry.screener_key, self.opts.screener_count)
            .await
        {
            Ok(q) => q,
            Err(err) => {
                tracing::warn!(
                    %industry,
                    provider = self.screener.provider_name(),
                    error = %err,
                    "live screener fetch failed; using curated list"
                );
                return Sourced::fallback(curated(), FallbackReason::transport(&err));
            }
        };

        if quotes.is_empty() {
            tracing::warn!(%industry, "screener returned no quotes; using curated list");
            return Sourced::fallback(curated(), FallbackReason::EmptyPayload);
        }

        let survivors = filter_quotes(&quotes, &self.opts);
        if survivors.is_empty() {
            tracing::warn!(
                %industry,
                quotes = quotes.len(),
                "no screener quotes survived filtering; using curated list"
            );
            return Sourced::fallback(curated(), FallbackReason::NoSurvivors);
        }

        Sourced::Live(sample(survivors, count))
    }

    /// Deduplicated random sample across `industries`, capped at `max_total`.
    pub async fn aggregate(
        &self,
        industries: &[String],
        per_industry: usize,
        max_total: usize,
    ) -> Vec<String> {
        let considered: Vec<&str> = if industries.is_empty() {
            INDUSTRIES
                .iter()
                .take(self.opts.default_industry_count)
                .map(|i| i.label)
                .collect()
        } else {
            industries.iter().map(String::as_str).collect()
        };

        let mut all = Vec::new();
        for industry in considered {
            let fetched = self.fetch_for_industry(industry, per_industry).await;
            tracing::debug!(
                %industry,
                live = fetched.is_live(),
                count = fetched.value().len(),
                "industry tickers fetched"
            );
            all.extend(fetched.into_value());
        }

        let unique = dedup_preserving_order(all);
        sample(unique, max_total)
    }

    /// `aggregate` with the configured sizes.
    pub async fn select(&self, industries: &[String]) -> Vec<String> {
        self.aggregate(industries, self.opts.per_industry, self.opts.max_total)
            .await
    }
}

fn filter_quotes(quotes: &[ScreenerQuote], opts: &SelectionOptions) -> Vec<String> {
    let symbols = quotes.iter().filter_map(|q| {
        let symbol = q.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

        let market = q.market.as_deref().unwrap_or("").to_ascii_lowercase();
        if !market.contains("us") {
            return None;
        }

        // Zero or missing means "not reported".
        if let Some(cap) = q.market_cap {
            if cap > 0.0 && cap < opts.min_market_cap {
                return None;
            }
        }
        if let Some(vol) = q.average_daily_volume_3_month {
            if vol > 0.0 && vol < opts.min_avg_volume {
                return None;
            }
        }

        Some(symbol.to_string())
    });

    dedup_preserving_order(symbols)
}

fn dedup_preserving_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn sample(mut items: Vec<String>, count: usize) -> Vec<String> {
    items.shuffle(&mut rand::thread_rng());
    items.truncate(count);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;

    struct FakeScreener {
        by_collection: HashMap<&'static str, Vec<ScreenerQuote>>,
        fail: bool,
    }

    impl FakeScreener {
        fn unavailable() -> Self {
            Self {
                by_collection: HashMap::new(),
                fail: true,
            }
        }

        fn with(collection: &'static str, quotes: Vec<ScreenerQuote>) -> Self {
            Self {
                by_collection: HashMap::from([(collection, quotes)]),
                fail: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl ScreenerProvider for FakeScreener {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_screener(&self, collection: &str, _count: usize) -> Result<Vec<ScreenerQuote>> {
            anyhow::ensure!(!self.fail, "screener offline");
            Ok(self.by_collection.get(collection).cloned().unwrap_or_default())
        }
    }

    fn quote(symbol: &str, market: &str, cap: Option<f64>, vol: Option<f64>) -> ScreenerQuote {
        ScreenerQuote {
            symbol: Some(symbol.to_string()),
            market: Some(market.to_string()),
            market_cap: cap,
            average_daily_volume_3_month: vol,
        }
    }

    fn selector(screener: FakeScreener) -> TickerSelector {
        TickerSelector::new(Arc::new(screener), SelectionOptions::default())
    }

    fn assert_unique(items: &[String]) {
        let set: HashSet<_> = items.iter().collect();
        assert_eq!(set.len(), items.len(), "duplicates in {items:?}");
    }

    #[test]
    fn filters_market_size_and_liquidity() {
        let quotes = vec![
            quote("AAPL", "us_market", Some(3.0e12), Some(5.0e7)),
            quote("SMOL", "us_market", Some(1.0e9), Some(5.0e7)),
            quote("THIN", "us_market", Some(5.0e9), Some(1.0e4)),
            quote("LSE1", "gb_market", Some(5.0e10), Some(5.0e7)),
            quote("NOCAP", "us_market", None, None),
            quote("ZERO", "us_market", Some(0.0), Some(0.0)),
            quote("AAPL", "us_market", Some(3.0e12), Some(5.0e7)),
            ScreenerQuote {
                symbol: None,
                market: Some("us_market".to_string()),
                ..Default::default()
            },
            ScreenerQuote {
                symbol: Some("NOMKT".to_string()),
                ..Default::default()
            },
        ];

        let out = filter_quotes(&quotes, &SelectionOptions::default());
        assert_eq!(out, vec!["AAPL", "NOCAP", "ZERO"]);
    }

    #[tokio::test]
    async fn live_results_are_sampled_from_survivors() {
        let quotes: Vec<_> = (0..12)
            .map(|i| quote(&format!("T{i}"), "us_market", Some(1.0e10), Some(1.0e6)))
            .collect();
        let pool: HashSet<String> = (0..12).map(|i| format!("T{i}")).collect();
        let sel = selector(FakeScreener::with("all_technology", quotes));

        let got = sel.fetch_for_industry("Technology", 5).await;
        assert!(got.is_live());
        let got = got.into_value();
        assert_eq!(got.len(), 5);
        assert_unique(&got);
        assert!(got.iter().all(|s| pool.contains(s)));
    }

    #[tokio::test]
    async fn falls_back_when_screener_is_down() {
        let sel = selector(FakeScreener::unavailable());
        let got = sel.fetch_for_industry("Energy", 4).await;
        assert!(matches!(got.reason(), Some(FallbackReason::Transport(_))));
        let curated = find_industry("Energy").unwrap().fallback;
        assert_eq!(got.value().len(), 4);
        assert!(got.value().iter().all(|s| curated.contains(&s.as_str())));
    }

    #[tokio::test]
    async fn distinguishes_empty_payload_from_filtered_out() {
        let sel = selector(FakeScreener::with("all_energy", vec![]));
        let got = sel.fetch_for_industry("Energy", 3).await;
        assert_eq!(got.reason(), Some(&FallbackReason::EmptyPayload));

        let sel = selector(FakeScreener::with(
            "all_energy",
            vec![quote("TINY", "us_market", Some(1.0e6), None)],
        ));
        let got = sel.fetch_for_industry("Energy", 3).await;
        assert_eq!(got.reason(), Some(&FallbackReason::NoSurvivors));
        assert_eq!(got.value().len(), 3);
    }

    #[tokio::test]
    async fn unknown_industry_skips_live_call() {
        // A failing screener would tag Transport; UnknownIndustry proves no call was made.
        let sel = selector(FakeScreener::unavailable());
        let got = sel.fetch_for_industry("Crypto", 5).await;
        assert_eq!(got.reason(), Some(&FallbackReason::UnknownIndustry));
        assert!(got.value().is_empty());
    }

    #[tokio::test]
    async fn technology_only_offline_yields_five_curated() {
        let sel = selector(FakeScreener::unavailable());
        let got = sel.aggregate(&["Technology".to_string()], 5, 15).await;
        let curated = find_industry("Technology").unwrap().fallback;
        assert_eq!(got.len(), 5);
        assert_unique(&got);
        assert!(got.iter().all(|s| curated.contains(&s.as_str())));
    }

    #[tokio::test]
    async fn empty_selection_uses_default_industries() {
        let sel = selector(FakeScreener::unavailable());
        let got = sel.aggregate(&[], 5, 15).await;
        assert!(!got.is_empty());
        assert!(got.len() <= 15);
        assert_unique(&got);

        let defaults: HashSet<&str> = INDUSTRIES
            .iter()
            .take(3)
            .flat_map(|i| i.fallback.iter().copied())
            .collect();
        assert!(got.iter().all(|s| defaults.contains(s.as_str())));
    }

    #[tokio::test]
    async fn aggregate_respects_cap_and_dedups_across_industries() {
        // Same curated-size pool for every industry, many overlapping symbols.
        let shared: Vec<_> = (0..6)
            .map(|i| quote(&format!("DUP{i}"), "us_market", None, None))
            .collect();
        let mut by_collection = HashMap::new();
        for industry in &INDUSTRIES {
            by_collection.insert(industry.screener_key, shared.clone());
        }
        let sel = selector(FakeScreener {
            by_collection,
            fail: false,
        });

        let all: Vec<String> = INDUSTRIES.iter().map(|i| i.label.to_string()).collect();
        let got = sel.aggregate(&all, 5, 4).await;
        assert!(got.len() <= 4);
        assert_unique(&got);

        let got = sel.aggregate(&all, 6, 100).await;
        assert_eq!(got.len(), 6);
        assert_unique(&got);
    }
}
