use crate::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_CHARS, FetchError, SuggestionSource, below_min_chars, parse};
use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Marker replaced by the escaped query inside an endpoint template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Public API used when no endpoint is configured.
/// Answers with `[{ "name": "..." }]`.
pub const FALLBACK_ENDPOINT: &str = "https://restcountries.com/v2/name/{query}?fields=name";

/// Configuration for the HTTP suggestion fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Endpoint URL or template. `None` means use `fallback_endpoint`.
    pub endpoint: Option<String>,
    pub fallback_endpoint: String,
    pub min_chars: usize,
    pub max_results: usize,
    pub timeout_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            fallback_endpoint: FALLBACK_ENDPOINT.to_string(),
            min_chars: DEFAULT_MIN_CHARS,
            max_results: DEFAULT_MAX_RESULTS,
            timeout_ms: 5_000,
        }
    }
}

impl FetcherConfig {
    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: Some(endpoint.to_string()),
            ..Self::default()
        }
    }
}

/// Direct HTTP client for the suggestion endpoint.
pub struct SuggestionFetcher {
    http: Client,
    config: FetcherConfig,
}

impl std::fmt::Debug for SuggestionFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionFetcher")
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

impl SuggestionFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        tracing::info!("Suggestion fetcher targeting: {}", endpoint_of(&config));

        Ok(Self { http, config })
    }

    /// The template actually in use (configured endpoint or the fallback).
    pub fn endpoint(&self) -> &str {
        endpoint_of(&self.config)
    }

    /// Build the GET URL for an already trimmed query.
    pub(crate) fn request_url(&self, query: &str) -> Result<Url, FetchError> {
        let template = self.endpoint();

        if template.contains(QUERY_PLACEHOLDER) {
            let escaped = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
            let filled = template.replace(QUERY_PLACEHOLDER, &escaped);
            return Url::parse(&filled).map_err(|_| FetchError::InvalidEndpoint(template.to_string()));
        }

        let mut url =
            Url::parse(template).map_err(|_| FetchError::InvalidEndpoint(template.to_string()))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }
}

fn endpoint_of(config: &FetcherConfig) -> &str {
    config
        .endpoint
        .as_deref()
        .unwrap_or(&config.fallback_endpoint)
}

#[async_trait]
impl SuggestionSource for SuggestionFetcher {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let query = query.trim();
        if below_min_chars(query, self.config.min_chars) {
            return Ok(Vec::new());
        }

        let url = self.request_url(query)?;
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        Ok(parse::coerce_suggestions(&text, self.config.max_results))
    }
}
