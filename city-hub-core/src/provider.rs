use crate::{
    config::Settings,
    model::{ProviderReply, SearchDepth},
    provider::tavily::TavilyProvider,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod tavily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Tavily,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Tavily => "tavily",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Tavily]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "tavily" => Ok(ProviderId::Tavily),
            _ => Err(anyhow::anyhow!("Unknown provider '{value}'. Supported providers: tavily.")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("no API key was provided to the search provider")]
    MissingApiKey,
    #[error("search provider rejected the API key: {0}")]
    Unauthorized(String),
    #[error("search provider rate limit exceeded")]
    RateLimited,
    #[error("search provider returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("request to search provider failed: {0}")]
    Request(String),
    #[error("failed to parse search provider response: {0}")]
    Parse(String),
    #[error("failed to build search provider client: {0}")]
    Client(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync + Debug {
    async fn search(
        &self,
        query: &str,
        search_depth: SearchDepth,
        max_results: u32,
    ) -> Result<ProviderReply, ProviderError>;
}

/// Construct a provider for `id` from an API key and optional overrides.
pub fn provider_from_settings(
    id: ProviderId,
    api_key: &str,
    settings: &Settings,
) -> Result<Arc<dyn SearchProvider>, ProviderError> {
    let provider: Arc<dyn SearchProvider> = match id {
        ProviderId::Tavily => {
            let mut builder = TavilyProvider::builder(api_key);
            if let Some(base_url) = &settings.base_url {
                builder = builder.base_url(base_url.clone());
            }
            if let Some(secs) = settings.timeout_secs {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            Arc::new(builder.build()?)
        }
    };

    Ok(provider)
}

/// Build the process-wide client, or `None` when it cannot be built.
///
/// Never fails: every failure is logged and leaves the hub without a client,
/// which later surfaces as an error record (or mock data, in mock mode).
pub fn init_client(settings: &Settings) -> Option<Arc<dyn SearchProvider>> {
    let Some(id) = settings.provider else {
        tracing::warn!("search provider not available. Install or configure one to enable real searches.");
        return None;
    };

    let Some(api_key) = settings.api_key.as_deref() else {
        tracing::info!(
            provider = %id,
            "{} not found. The {id} client will not be initialized. \
             Set it in .env or the environment to enable real searches.",
            crate::config::API_KEY_ENV
        );
        return None;
    };

    match provider_from_settings(id, api_key, settings) {
        Ok(client) => {
            tracing::info!(provider = %id, "initialized search client");
            Some(client)
        }
        Err(ProviderError::MissingApiKey) => {
            tracing::error!(provider = %id, "provider reported missing API key at initialization");
            None
        }
        Err(err) => {
            tracing::error!(provider = %id, error = %err, "failed to initialize search client");
            None
        }
    }
}
