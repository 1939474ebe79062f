pub mod anthropic;
pub mod error;
pub mod openai;

use crate::config::Settings;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn from_name(name: Option<&str>) -> anyhow::Result<Self> {
        match name.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("openai") => Ok(Provider::OpenAI),
            Some("anthropic") => Ok(Provider::Anthropic),
            Some(other) => anyhow::bail!("unsupported LLM_PROVIDER: {other}"),
        }
    }
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Single-turn text completion.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String>;
}

pub fn client_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn LlmClient>> {
    Ok(match Provider::from_name(settings.llm_provider.as_deref())? {
        Provider::OpenAI => Arc::new(openai::OpenAiClient::from_settings(settings)?),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::from_settings(settings)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_to_openai() {
        assert_eq!(Provider::from_name(None).unwrap(), Provider::OpenAI);
        assert_eq!(Provider::from_name(Some(" ")).unwrap(), Provider::OpenAI);
        assert_eq!(
            Provider::from_name(Some("Anthropic")).unwrap(),
            Provider::Anthropic
        );
        assert!(Provider::from_name(Some("bard")).is_err());
    }
}
