use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::advisor::{Advisor, DEFAULT_TICKERS};
use folio_core::domain::persona::{PersonaCatalog, RiskLevel};
use folio_core::domain::profile::HoldingPeriod;
use folio_core::ingest::{Lookback, PriceHistoryProvider, YahooClient};
use folio_core::storage::ReportWriter;
use folio_core::wizard::{Answers, ResultsView};

#[derive(Debug, Parser)]
#[command(name = "folio_report")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate and save a recommendation report for one persona.
    Generate(GenerateArgs),
    /// Print the latest adjusted close for a ticker to verify price-provider access.
    Check {
        #[arg(long, default_value = "AAPL")]
        ticker: String,
    },
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    #[arg(long, default_value = folio_core::domain::persona::DEFAULT_PERSONA_KEY)]
    persona: String,

    #[arg(long, default_value = "")]
    scenario: String,

    /// One of: very low, low, moderate, high. Defaults to the persona's level.
    #[arg(long)]
    risk: Option<String>,

    /// One of: 1-3 years, 4-7 years, 10+ years.
    #[arg(long)]
    holding: Option<String>,

    /// Comma-separated industry labels; picks tickers through the screener.
    #[arg(long, value_delimiter = ',')]
    industries: Vec<String>,

    /// Comma-separated tickers; overrides industry selection.
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Defaults to REPORTS_DIR, then `reports`.
    #[arg(long)]
    out_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = folio_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Generate(gen) => generate(&settings, gen).await,
        Command::Check { ticker } => check(&settings, &ticker).await,
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "report run failed");
    }
    result
}

async fn generate(settings: &folio_core::config::Settings, args: GenerateArgs) -> anyhow::Result<()> {
    let catalog = Arc::new(PersonaCatalog::builtin());
    let answers = answers_from_args(&catalog, &args)?;
    let advisor = Advisor::from_settings(settings, catalog.clone())?;

    let tickers = if !args.tickers.is_empty() {
        normalize_tickers(&args.tickers)
    } else if !answers.industries.is_empty() {
        advisor.select_tickers(&answers.industries).await
    } else {
        DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect()
    };

    let profile = answers.merge_into(&catalog)?;
    let started = chrono::Utc::now();
    let report = advisor.report_for(profile, tickers).await;
    let view = ResultsView::build(&report.text, &answers.industries, report.tickers);
    let markdown = view.to_markdown();

    tracing::info!(
        persona = %answers.persona_key,
        signals = %serde_json::to_string(&report.signals)?,
        elapsed_ms = (chrono::Utc::now() - started).num_milliseconds(),
        "report generated"
    );

    let writer = ReportWriter::new(
        args.out_dir
            .clone()
            .unwrap_or_else(|| settings.reports_dir().to_string()),
    );
    let outcome = writer.save(&answers.persona_key, &markdown).await;

    println!("{markdown}");
    println!("{}", outcome.message());
    anyhow::ensure!(outcome.is_saved(), "report was not saved");
    Ok(())
}

async fn check(settings: &folio_core::config::Settings, ticker: &str) -> anyhow::Result<()> {
    let yahoo = YahooClient::from_settings(settings)?;
    let ticker = ticker.trim().to_ascii_uppercase();

    let closes = yahoo
        .fetch_adjusted_closes(&ticker, Lookback::ONE_MONTH)
        .await
        .with_context(|| format!("price history request failed for {ticker}"))?;
    let last = closes
        .last()
        .with_context(|| format!("no adjusted closes returned for {ticker}"))?;

    let name = match yahoo.fetch_display_name(&ticker).await {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!(ticker = %ticker, error = %err, "display name lookup failed");
            None
        }
    };

    println!(
        "{ticker} ({}): latest adjusted close {last:.2} over {} sessions",
        name.as_deref().unwrap_or(&ticker),
        closes.len()
    );
    Ok(())
}

/// Questionnaire answers equivalent to the command-line flags.
fn answers_from_args(catalog: &PersonaCatalog, args: &GenerateArgs) -> anyhow::Result<Answers> {
    let persona_key = args.persona.trim();
    anyhow::ensure!(
        catalog.contains(persona_key),
        "unknown persona {persona_key:?}; expected one of: {}",
        catalog.iter().map(|p| p.key).collect::<Vec<_>>().join(", ")
    );

    let risk = args
        .risk
        .as_deref()
        .map(str::parse::<RiskLevel>)
        .transpose()?;
    if let Some(risk) = risk {
        anyhow::ensure!(risk.is_selectable(), "risk level {risk} cannot be chosen explicitly");
    }

    let mut industries: Vec<String> = Vec::new();
    for label in args.industries.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        anyhow::ensure!(
            folio_core::domain::industry::find_industry(label).is_some(),
            "unknown industry {label:?}"
        );
        if !industries.iter().any(|i| i == label) {
            industries.push(label.to_string());
        }
    }

    let mut answers = Answers::new(catalog);
    answers.persona_key = persona_key.to_string();
    answers.scenario = args.scenario.trim().to_string();
    answers.risk = risk;
    answers.holding = args
        .holding
        .as_deref()
        .map(str::parse::<HoldingPeriod>)
        .transpose()?;
    answers.industries = industries;
    Ok(answers)
}

fn normalize_tickers(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for t in raw.iter().map(|t| t.trim().to_ascii_uppercase()) {
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

fn init_sentry(settings: &folio_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["folio_report", "generate"];
        full.extend_from_slice(argv);
        match Args::parse_from(full).command {
            Command::Generate(args) => args,
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn generate_defaults_to_college_student() {
        let catalog = PersonaCatalog::builtin();
        let args = parse(&[]);
        let answers = answers_from_args(&catalog, &args).unwrap();
        assert_eq!(answers.persona_key, "college_student");
        assert_eq!(answers.risk, None);
        assert!(answers.industries.is_empty());
        assert!(args.tickers.is_empty());
    }

    #[test]
    fn flags_map_onto_answers() {
        let catalog = PersonaCatalog::builtin();
        let args = parse(&[
            "--persona",
            "defensive_investor",
            "--risk",
            "very low",
            "--holding",
            "4-7 years",
            "--industries",
            "Energy,Utilities,Energy",
        ]);
        let answers = answers_from_args(&catalog, &args).unwrap();
        assert_eq!(answers.risk, Some(RiskLevel::VeryLow));
        assert_eq!(answers.holding, Some(HoldingPeriod::MidTerm));
        assert_eq!(answers.industries, vec!["Energy", "Utilities"]);
    }

    #[test]
    fn rejects_unknown_values() {
        let catalog = PersonaCatalog::builtin();
        assert!(answers_from_args(&catalog, &parse(&["--persona", "day_trader"])).is_err());
        assert!(answers_from_args(&catalog, &parse(&["--risk", "customizable"])).is_err());
        assert!(answers_from_args(&catalog, &parse(&["--industries", "Crypto"])).is_err());
        assert!(answers_from_args(&catalog, &parse(&["--holding", "forever"])).is_err());
    }

    #[test]
    fn tickers_are_uppercased_and_deduplicated() {
        let args = parse(&["--tickers", "aapl, msft,AAPL,,spy"]);
        assert_eq!(normalize_tickers(&args.tickers), vec!["AAPL", "MSFT", "SPY"]);
    }

    #[test]
    fn check_defaults_to_aapl() {
        match Args::parse_from(["folio_report", "check"]).command {
            Command::Check { ticker } => assert_eq!(ticker, "AAPL"),
            other => panic!("expected check, got {other:?}"),
        }
    }
}
