use crate::config::Settings;
use crate::domain::persona::PersonaCatalog;
use crate::domain::profile::InvestorProfile;
use crate::domain::signal::SignalMap;
use crate::ingest::YahooClient;
use crate::llm::LlmClient;
use crate::narrative::{NarrativeGenerator, FALLBACK_NARRATIVE};
use crate::select::{SelectionOptions, TickerSelector};
use crate::signals::SignalFetcher;
use crate::wizard::{Answers, ResultsView};
use std::sync::Arc;

/// Tickers used when a report is generated without an industry selection.
pub const DEFAULT_TICKERS: [&str; 5] = ["AAPL", "TSLA", "GOOG", "SPY", "VOO"];

#[derive(Debug, Clone)]
pub struct Report {
    pub profile: InvestorProfile,
    pub tickers: Vec<String>,
    pub signals: SignalMap,
    pub text: String,
}

/// Runs select → signals → narrative for a finished questionnaire.
#[derive(Clone)]
pub struct Advisor {
    catalog: Arc<PersonaCatalog>,
    selector: TickerSelector,
    signals: SignalFetcher,
    narrative: NarrativeGenerator,
}

impl Advisor {
    pub fn new(
        catalog: Arc<PersonaCatalog>,
        selector: TickerSelector,
        signals: SignalFetcher,
        narrative: NarrativeGenerator,
    ) -> Self {
        Self {
            catalog,
            selector,
            signals,
            narrative,
        }
    }

    /// Live Yahoo data plus the configured LLM. A missing LLM key degrades to fallback text.
    pub fn from_settings(settings: &Settings, catalog: Arc<PersonaCatalog>) -> anyhow::Result<Self> {
        let yahoo = Arc::new(YahooClient::from_settings(settings)?);

        let llm: Option<Arc<dyn LlmClient>> = match crate::llm::client_from_settings(settings) {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(error = %err, "LLM client unavailable; narratives will use fallback text");
                None
            }
        };

        Ok(Self::new(
            catalog,
            TickerSelector::new(yahoo.clone(), SelectionOptions::from_env()),
            SignalFetcher::new(yahoo.clone()),
            NarrativeGenerator::new(llm).with_name_resolver(yahoo),
        ))
    }

    pub fn catalog(&self) -> &Arc<PersonaCatalog> {
        &self.catalog
    }

    /// Everything the results screen shows. Never fails; provider problems degrade to fallbacks.
    pub async fn recommend(&self, answers: &Answers) -> ResultsView {
        let tickers = self.selector.select(&answers.industries).await;

        let profile = match answers.merge_into(&self.catalog) {
            Ok(p) => p,
            Err(err) => {
                tracing::error!(error = %err, "cannot build investor profile; using fallback narrative");
                return ResultsView::build(FALLBACK_NARRATIVE, &answers.industries, tickers);
            }
        };

        let report = self.report_for(profile, tickers).await;
        ResultsView::build(&report.text, &answers.industries, report.tickers)
    }

    /// Signals and narrative for an explicit ticker list.
    pub async fn report_for(&self, profile: InvestorProfile, tickers: Vec<String>) -> Report {
        let signals = self.signals.get_signals(&tickers).await;
        let narrative = self.narrative.generate(&profile, &signals).await;

        tracing::info!(
            persona = %profile.key,
            tickers = tickers.len(),
            live_narrative = narrative.is_live(),
            "recommendation generated"
        );

        Report {
            profile,
            tickers,
            signals,
            text: narrative.into_value(),
        }
    }

    /// Ticker pool for `industries`; empty selects the default industries.
    pub async fn select_tickers(&self, industries: &[String]) -> Vec<String> {
        self.selector.select(industries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::industry::find_industry;
    use crate::ingest::types::ScreenerQuote;
    use crate::ingest::{Lookback, PriceHistoryProvider, ScreenerProvider};
    use crate::llm::{CompletionRequest, Provider};
    use crate::narrative::FALLBACK_NARRATIVE;
    use crate::wizard::results::NO_RECOMMENDATIONS_NOTICE;

    struct Offline;

    #[async_trait::async_trait]
    impl ScreenerProvider for Offline {
        fn provider_name(&self) -> &'static str {
            "offline"
        }

        async fn fetch_screener(&self, _c: &str, _n: usize) -> anyhow::Result<Vec<ScreenerQuote>> {
            anyhow::bail!("offline")
        }
    }

    #[async_trait::async_trait]
    impl PriceHistoryProvider for Offline {
        fn provider_name(&self) -> &'static str {
            "offline"
        }

        async fn fetch_adjusted_closes(&self, _s: &str, _w: Lookback) -> anyhow::Result<Vec<f64>> {
            anyhow::bail!("offline")
        }

        async fn fetch_display_name(&self, _s: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("offline")
        }
    }

    struct Echo(&'static str);

    #[async_trait::async_trait]
    impl LlmClient for Echo {
        fn provider(&self) -> Provider {
            Provider::OpenAI
        }

        async fn complete(&self, _req: CompletionRequest) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn advisor(llm: Option<Arc<dyn LlmClient>>) -> Advisor {
        let offline = Arc::new(Offline);
        Advisor::new(
            Arc::new(PersonaCatalog::builtin()),
            TickerSelector::new(offline.clone(), SelectionOptions::default()),
            SignalFetcher::new(offline),
            NarrativeGenerator::new(llm),
        )
    }

    fn answers(industries: &[&str]) -> Answers {
        let mut a = Answers::new(&PersonaCatalog::builtin());
        a.industries = industries.iter().map(|s| s.to_string()).collect();
        a
    }

    #[tokio::test]
    async fn offline_pipeline_still_renders_blocks() {
        let llm: Arc<dyn LlmClient> = Arc::new(Echo("- AAPL - Apple\n  Rationale: x\n\n- MSFT - Microsoft"));
        let view = advisor(Some(llm)).recommend(&answers(&["Technology"])).await;

        assert_eq!(view.blocks.len(), 2);
        assert_eq!(view.notice, None);
        assert!(view.alignment_note.unwrap().contains("Technology"));

        let curated = find_industry("Technology").unwrap().fallback;
        assert_eq!(view.tickers.len(), 5);
        assert!(view.tickers.iter().all(|t| curated.contains(&t.as_str())));
    }

    #[tokio::test]
    async fn generation_failure_renders_fallback_block() {
        let view = advisor(None).recommend(&answers(&[])).await;
        assert_eq!(view.blocks.len(), 1);
        assert_eq!(view.blocks[0].lead, FALLBACK_NARRATIVE);
        assert_eq!(view.alignment_note, None);
        assert!(!view.tickers.is_empty());
    }

    #[tokio::test]
    async fn blank_generation_shows_notice() {
        let llm: Arc<dyn LlmClient> = Arc::new(Echo("   "));
        let view = advisor(Some(llm)).recommend(&answers(&[])).await;
        assert!(view.blocks.is_empty());
        assert_eq!(view.notice.as_deref(), Some(NO_RECOMMENDATIONS_NOTICE));
    }

    #[tokio::test]
    async fn signal_keys_are_the_ticker_pool() {
        let a = advisor(None);
        let profile = answers(&[]).merge_into(a.catalog()).unwrap();
        let tickers: Vec<String> = DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect();
        let report = a.report_for(profile, tickers.clone()).await;

        assert_eq!(report.signals.symbols().collect::<Vec<_>>(), DEFAULT_TICKERS.to_vec());
        assert_eq!(report.signals.get("TSLA").unwrap().ret, 0.05);
        assert_eq!(report.text, FALLBACK_NARRATIVE);
    }
}
