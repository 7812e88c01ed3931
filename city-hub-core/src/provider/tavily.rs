use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::model::{ProviderReply, RawItem, SearchDepth};

use super::{ProviderError, SearchProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

#[derive(Clone)]
pub struct TavilyProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Clone)]
pub struct TavilyProviderBuilder {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
}

const REDACTED: &str = "<redacted>";

impl std::fmt::Debug for TavilyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyProvider")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TavilyProviderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyProviderBuilder")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TavilyProviderBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<TavilyProvider, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let mut http = Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(|err| ProviderError::Client(err.to_string()))?;

        Ok(TavilyProvider {
            api_key: self.api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

impl TavilyProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> TavilyProviderBuilder {
        TavilyProviderBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    search_depth: SearchDepth,
    max_results: u32,
    include_answer: bool,
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(
        &self,
        query: &str,
        search_depth: SearchDepth,
        max_results: u32,
    ) -> Result<ProviderReply, ProviderError> {
        // `build` rejects blank keys; this covers a provider assembled any other way.
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let request = TavilySearchRequest { query, search_depth, max_results, include_answer: true };

        let res = self
            .http
            .post(self.search_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Request(err.to_string()))?;

        let status = res.status();
        let body = res.text().await.map_err(|err| ProviderError::Request(err.to_string()))?;

        if !status.is_success() {
            return Err(map_http_error(status, &body));
        }

        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<ProviderReply, ProviderError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| ProviderError::Parse(err.to_string()))?;

    Ok(reply_from_value(value))
}

/// Only a JSON object counts as a structured reply; anything else is kept as-is.
fn reply_from_value(value: Value) -> ProviderReply {
    let Value::Object(map) = value else {
        return ProviderReply::Opaque(value);
    };

    let results = map
        .get("results")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(raw_item_from_value).collect())
        .unwrap_or_default();

    let answer = map.get("answer").and_then(Value::as_str).map(str::to_owned);

    ProviderReply::Structured { results, answer }
}

fn raw_item_from_value(value: &Value) -> RawItem {
    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);

    RawItem { title: field("title"), content: field("content"), url: field("url") }
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    let message = error_message(body).unwrap_or_else(|| truncate_body(body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        _ => ProviderError::Api { status: status.as_u16(), message },
    }
}

// Tavily reports errors as {"detail": {"error": "..."}}; older responses use a flat field.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    json.get("detail")
        .and_then(|detail| detail.get("error"))
        .or_else(|| json.get("error"))
        .or_else(|| json.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_uses_wire_names() {
        let request = TavilySearchRequest {
            query: "current weather in Oslo",
            search_depth: SearchDepth::Advanced,
            max_results: 5,
            include_answer: true,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "current weather in Oslo",
                "search_depth": "advanced",
                "max_results": 5,
                "include_answer": true
            })
        );
    }

    #[test]
    fn builder_rejects_blank_key() {
        let err = TavilyProvider::new(" ").unwrap_err();
        assert_eq!(err, ProviderError::MissingApiKey);
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let provider = TavilyProvider::builder("tvly-key")
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(provider.search_url(), "http://localhost:8080/search");
    }

    #[test]
    fn parses_structured_reply() {
        let body = json!({
            "query": "q",
            "answer": "Sunny, 21C",
            "results": [
                {"title": "A", "url": "https://a.example", "content": "first", "score": 0.9},
                {"title": "B", "url": "https://b.example"}
            ],
            "response_time": 1.2
        })
        .to_string();

        let reply = parse_reply(&body).unwrap();
        assert_eq!(
            reply,
            ProviderReply::Structured {
                results: vec![
                    RawItem {
                        title: Some("A".into()),
                        content: Some("first".into()),
                        url: Some("https://a.example".into()),
                    },
                    RawItem { title: Some("B".into()), content: None, url: Some("https://b.example".into()) },
                ],
                answer: Some("Sunny, 21C".into()),
            }
        );
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = TavilyProvider::new("tvly-secret-123").unwrap();
        let printed = format!("{provider:?}");
        assert!(!printed.contains("tvly-secret-123"), "{printed}");
        assert!(printed.contains(REDACTED));

        let builder = TavilyProvider::builder("tvly-secret-123");
        assert!(!format!("{builder:?}").contains("tvly-secret-123"));
    }

    #[tokio::test]
    async fn blank_key_at_call_time_is_missing_api_key() {
        let provider = TavilyProvider {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        };

        let err = provider.search("q", SearchDepth::Basic, 5).await.unwrap_err();
        assert_eq!(err, ProviderError::MissingApiKey);
    }

    #[test]
    fn null_answer_is_treated_as_absent() {
        let reply = parse_reply(r#"{"answer": null, "results": []}"#).unwrap();
        assert_eq!(reply, ProviderReply::Structured { results: vec![], answer: None });
    }

    #[test]
    fn object_without_results_is_structured_and_empty() {
        let reply = parse_reply("{}").unwrap();
        assert_eq!(reply, ProviderReply::Structured { results: vec![], answer: None });
    }

    #[test]
    fn non_object_reply_is_opaque() {
        assert_eq!(parse_reply("\"ok\"").unwrap(), ProviderReply::Opaque(json!("ok")));
        assert_eq!(parse_reply("[1, 2]").unwrap(), ProviderReply::Opaque(json!([1, 2])));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_reply("<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn http_error_uses_nested_detail_message() {
        let body = json!({"detail": {"error": "Invalid API key"}}).to_string();
        let err = map_http_error(StatusCode::UNAUTHORIZED, &body);
        assert_eq!(err, ProviderError::Unauthorized("Invalid API key".into()));
    }

    #[test]
    fn http_error_falls_back_to_truncated_body() {
        let body = "x".repeat(250);
        let err = map_http_error(StatusCode::BAD_GATEWAY, &body);

        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), 203);
                assert!(message.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err, ProviderError::RateLimited);
    }
}
