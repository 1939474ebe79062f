pub mod advisor;
pub mod domain;
pub mod fallback;
pub mod ingest;
pub mod llm;
pub mod narrative;
pub mod select;
pub mod signals;
pub mod storage;
pub mod wizard;

pub mod config {
    use anyhow::Context;

    const DEFAULT_REPORTS_DIR: &str = "reports";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub openai_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub llm_provider: Option<String>,
        pub sentry_dsn: Option<String>,
        pub reports_dir: Option<String>,
        pub yahoo_base_url: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                llm_provider: std::env::var("LLM_PROVIDER").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                reports_dir: std::env::var("REPORTS_DIR").ok(),
                yahoo_base_url: std::env::var("YAHOO_QUERY_BASE_URL").ok(),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn reports_dir(&self) -> &str {
            self.reports_dir
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_REPORTS_DIR)
        }
    }
}
