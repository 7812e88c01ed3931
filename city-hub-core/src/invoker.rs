//! Runs a search against the configured provider, or stands in for it.

use std::sync::Arc;

use crate::{
    model::{ProviderReply, RawItem, SearchPayload, SearchParameters},
    provider::{ProviderError, SearchProvider},
};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "Tavily client not initialized. Set TAVILY_API_KEY or enable MOCK_TAVILY=1 in .env";
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Tavily reported missing API key when calling search.";

pub const MOCK_TITLE: &str = "Mock result";
pub const MOCK_URL: &str = "http://example.com";
pub const MOCK_SUMMARY: &str = "Mocked summary of results.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error("{}", NOT_CONFIGURED_MESSAGE)]
    NotConfigured,
    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,
    #[error("{0}")]
    ProviderFailure(String),
}

impl From<ProviderError> for InvokeError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingApiKey => InvokeError::MissingCredential,
            other => InvokeError::ProviderFailure(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchInvoker {
    client: Option<Arc<dyn SearchProvider>>,
    mock: bool,
}

impl SearchInvoker {
    pub fn new(client: Option<Arc<dyn SearchProvider>>, mock: bool) -> Self {
        Self { client, mock }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub fn is_mock(&self) -> bool {
        self.mock
    }

    /// Mock mode only applies when there is no client to ask.
    pub async fn invoke(
        &self,
        query: &str,
        params: SearchParameters,
    ) -> Result<SearchPayload, InvokeError> {
        let Some(client) = &self.client else {
            if self.mock {
                tracing::info!(query, "mock mode enabled, returning fake results");
                return Ok(mock_reply(query).into());
            }
            tracing::error!("{}", NOT_CONFIGURED_MESSAGE);
            return Err(InvokeError::NotConfigured);
        };

        match client.search(query, params.search_depth, params.max_results).await {
            Ok(reply) => {
                if matches!(reply, ProviderReply::Opaque(_)) {
                    tracing::warn!(query, "provider returned an unstructured response");
                }
                Ok(reply.into())
            }
            Err(ProviderError::MissingApiKey) => {
                tracing::error!(query, "{}", MISSING_CREDENTIAL_MESSAGE);
                Err(InvokeError::MissingCredential)
            }
            Err(err) => {
                tracing::error!(query, error = %err, "search failed");
                Err(err.into())
            }
        }
    }
}

fn mock_reply(query: &str) -> ProviderReply {
    ProviderReply::Structured {
        results: vec![RawItem {
            title: Some(MOCK_TITLE.to_string()),
            content: Some(format!("Mock content for '{query}'")),
            url: Some(MOCK_URL.to_string()),
        }],
        answer: Some(MOCK_SUMMARY.to_string()),
    }
}
