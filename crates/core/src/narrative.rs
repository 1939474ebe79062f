use crate::domain::profile::InvestorProfile;
use crate::domain::signal::{Signal, SignalMap};
use crate::fallback::{FallbackReason, Sourced};
use crate::ingest::PriceHistoryProvider;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{CompletionRequest, LlmClient};
use std::collections::HashMap;
use std::sync::Arc;

pub const FALLBACK_NARRATIVE: &str = "Fallback: Could not generate portfolio explanation.";

/// Kept low so repeated runs read alike.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

const DEFAULT_HOLDING: &str = "5+ years";
const RAW_LOG_CHARS: usize = 2_000;

#[derive(Clone)]
pub struct NarrativeGenerator {
    llm: Option<Arc<dyn LlmClient>>,
    names: Option<Arc<dyn PriceHistoryProvider>>,
    temperature: f32,
}

impl NarrativeGenerator {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self {
            llm,
            names: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Resolve display names for the prompt through `provider`.
    pub fn with_name_resolver(mut self, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        self.names = Some(provider);
        self
    }

    pub async fn generate(&self, profile: &InvestorProfile, signals: &SignalMap) -> Sourced<String> {
        let Some(llm) = self.llm.as_ref() else {
            tracing::warn!("no LLM client configured; returning fallback narrative");
            return Sourced::fallback(
                FALLBACK_NARRATIVE.to_string(),
                FallbackReason::Generation("no LLM client configured".to_string()),
            );
        };

        let names = self.resolve_names(signals).await;
        let prompt = build_prompt(profile, signals, &names);

        let req = CompletionRequest {
            prompt,
            temperature: self.temperature,
        };

        match llm.complete(req).await {
            Ok(text) => Sourced::Live(text.trim().to_string()),
            Err(err) => {
                if let Some(diag) = err.downcast_ref::<LlmDiagnosticsError>() {
                    tracing::debug!(
                        stage = diag.stage,
                        raw = diag.raw_excerpt(RAW_LOG_CHARS).as_deref().unwrap_or(""),
                        "raw model output"
                    );
                }
                tracing::error!(
                    provider = ?llm.provider(),
                    persona = %profile.key,
                    error = %err,
                    "narrative generation failed; returning fallback"
                );
                Sourced::fallback(
                    FALLBACK_NARRATIVE.to_string(),
                    FallbackReason::Generation(format!("{err:#}")),
                )
            }
        }
    }

    async fn resolve_names(&self, signals: &SignalMap) -> HashMap<String, String> {
        let mut out = HashMap::new();
        let Some(provider) = self.names.as_ref() else {
            return out;
        };

        for symbol in signals.symbols() {
            match provider.fetch_display_name(symbol).await {
                Ok(Some(name)) => {
                    out.insert(symbol.to_string(), name);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(%symbol, error = %err, "display name lookup failed");
                }
            }
        }
        out
    }
}

/// "AAPL (Apple Inc.): expected_return=3.2%, sentiment=78%"
pub fn format_signal_row(symbol: &str, name: Option<&str>, signal: &Signal) -> String {
    let label = match name.filter(|n| *n != symbol) {
        Some(n) => format!("{symbol} ({n})"),
        None => symbol.to_string(),
    };
    format!(
        "{label}: expected_return={:.1}%, sentiment={:.0}%",
        signal.ret * 100.0,
        signal.sentiment * 100.0
    )
}

pub fn build_prompt(
    profile: &InvestorProfile,
    signals: &SignalMap,
    names: &HashMap<String, String>,
) -> String {
    let industries = if profile.preferred_industries.is_empty() {
        "no specific industries selected".to_string()
    } else {
        profile.preferred_industries.join(", ")
    };
    let holding = profile
        .holding_period
        .map(|h| h.as_str())
        .unwrap_or(DEFAULT_HOLDING);

    let stock_block = signals
        .iter()
        .map(|s| format_signal_row(&s.symbol, names.get(&s.symbol).map(String::as_str), &s.signal))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a financial assistant helping a beginner investor.\n\n\
Investor: {name}\n\
Scenario: {scenario}\n\
Goal: {goal}\n\
Risk tolerance: {risk}\n\
Holding period: {holding}\n\
Preferred industries: {industries}\n\n\
Available stocks and funds with predicted returns and sentiment scores:\n\
{stock_block}\n\n\
Task: Recommend a 3-4 asset portfolio tailored to this investor and industries. \
Be concise, numerically grounded, and beginner-friendly.\n\n\
For EACH recommended asset, output exactly this Markdown shape, separated by a blank line:\n\
- TICKER - Company Name\n\
  Industry relevance: <max 20 words tying the company to the selected industry via a product/service/market role>\n\
  Rationale: 2-3 sentences; include expected_return (%) and sentiment (%) from above; keep it plain-English.\n\
  Pros: <1-2 short pros>\n\
  Cons: <1-2 short cons>\n\
  Recent performance: brief 1-year or 5-year context if useful (concise)\n\n\
Constraints:\n\
- Use the candidate list above; prioritize those aligned with the selected industries.\n\
- Keep each 'Industry relevance' to 20 words or fewer, specific and concrete.\n\
- Keep paragraphs short and readable; avoid long blocks of text.\n\
- End with one sentence reminding the user that final decisions are theirs.",
        name = profile.name,
        scenario = profile.scenario,
        goal = profile.goal,
        risk = profile.risk_tolerance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::persona::{PersonaCatalog, RiskLevel};
    use crate::domain::profile::HoldingPeriod;
    use crate::ingest::Lookback;
    use std::sync::Mutex;

    struct ScriptedLlm {
        reply: Result<String, String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider(&self) -> crate::llm::Provider {
            crate::llm::Provider::OpenAI
        }

        async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(req);
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    struct Names;

    #[async_trait::async_trait]
    impl PriceHistoryProvider for Names {
        fn provider_name(&self) -> &'static str {
            "names"
        }

        async fn fetch_adjusted_closes(&self, _symbol: &str, _w: Lookback) -> anyhow::Result<Vec<f64>> {
            Ok(vec![])
        }

        async fn fetch_display_name(&self, symbol: &str) -> anyhow::Result<Option<String>> {
            match symbol {
                "AAPL" => Ok(Some("Apple Inc.".to_string())),
                "SPY" => anyhow::bail!("rate limited"),
                _ => Ok(None),
            }
        }
    }

    fn profile() -> InvestorProfile {
        let catalog = PersonaCatalog::builtin();
        let mut p = InvestorProfile::from_persona(catalog.get("college_student").unwrap())
            .with_scenario("saving for grad school");
        p.risk_tolerance = RiskLevel::High;
        p.holding_period = Some(HoldingPeriod::MidTerm);
        p.preferred_industries = vec!["Technology".to_string(), "Energy".to_string()];
        p
    }

    fn signals() -> SignalMap {
        let mut m = SignalMap::new();
        m.insert("AAPL", Signal { ret: 0.032, sentiment: 0.78 });
        m.insert("SPY", Signal { ret: -0.0149, sentiment: 0.9 });
        m
    }

    #[test]
    fn formats_rows_with_optional_name() {
        let s = Signal { ret: 0.032, sentiment: 0.78 };
        assert_eq!(
            format_signal_row("AAPL", Some("Apple Inc."), &s),
            "AAPL (Apple Inc.): expected_return=3.2%, sentiment=78%"
        );
        assert_eq!(
            format_signal_row("AAPL", Some("AAPL"), &s),
            "AAPL: expected_return=3.2%, sentiment=78%"
        );
        assert_eq!(
            format_signal_row("XOM", None, &Signal { ret: 0.02, sentiment: 0.5 }),
            "XOM: expected_return=2.0%, sentiment=50%"
        );
    }

    #[test]
    fn prompt_interpolates_profile_fields() {
        let names = HashMap::from([("AAPL".to_string(), "Apple Inc.".to_string())]);
        let prompt = build_prompt(&profile(), &signals(), &names);

        assert!(prompt.contains("Investor: College Student\n"));
        assert!(prompt.contains("Scenario: saving for grad school\n"));
        assert!(prompt.contains("Goal: long-term balanced growth\n"));
        assert!(prompt.contains("Risk tolerance: high\n"));
        assert!(prompt.contains("Holding period: 4-7 years\n"));
        assert!(prompt.contains("Preferred industries: Technology, Energy\n"));
        assert!(prompt.contains(
            "AAPL (Apple Inc.): expected_return=3.2%, sentiment=78%\nSPY: expected_return=-1.5%, sentiment=90%"
        ));
        assert_eq!(prompt, build_prompt(&profile(), &signals(), &names));
    }

    #[test]
    fn prompt_defaults_for_missing_answers() {
        let catalog = PersonaCatalog::builtin();
        let p = InvestorProfile::from_persona(catalog.get("high_school_student").unwrap());
        let prompt = build_prompt(&p, &SignalMap::new(), &HashMap::new());
        assert!(prompt.contains("Scenario: balanced long-term growth\n"));
        assert!(prompt.contains("Holding period: 5+ years\n"));
        assert!(prompt.contains("Preferred industries: no specific industries selected\n"));
        assert!(prompt.contains("Risk tolerance: very low\n"));
    }

    #[tokio::test]
    async fn returns_trimmed_model_text_and_sends_temperature() {
        let llm = Arc::new(ScriptedLlm {
            reply: Ok("\n- AAPL - Apple Inc.\n\n".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let gen = NarrativeGenerator::new(Some(llm.clone())).with_name_resolver(Arc::new(Names));

        let out = gen.generate(&profile(), &signals()).await;
        assert!(out.is_live());
        assert_eq!(out.into_value(), "- AAPL - Apple Inc.");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].temperature, DEFAULT_TEMPERATURE);
        assert!(seen[0].prompt.contains("AAPL (Apple Inc.)"));
        assert!(seen[0].prompt.contains("SPY: expected_return"));
    }

    #[tokio::test]
    async fn model_failure_returns_exact_fallback() {
        let llm = Arc::new(ScriptedLlm {
            reply: Err("model overloaded".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let gen = NarrativeGenerator::new(Some(llm));

        let out = gen.generate(&profile(), &signals()).await;
        assert!(matches!(out.reason(), Some(FallbackReason::Generation(m)) if m.contains("overloaded")));
        assert_eq!(out.into_value(), FALLBACK_NARRATIVE);
    }

    #[tokio::test]
    async fn missing_client_returns_fallback() {
        let gen = NarrativeGenerator::new(None);
        let out = gen.generate(&profile(), &signals()).await;
        assert_eq!(out.into_value(), FALLBACK_NARRATIVE);
    }
}
