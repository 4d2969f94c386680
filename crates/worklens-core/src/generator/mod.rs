//! Text generation behind a narrow seam.
//!
//! Reasoning narratives and AI insights come from an external text
//! generator. The `TextGenerator` trait keeps callers decoupled from any
//! concrete service; `GeneratorChain` walks an ordered list of HTTP
//! providers and falls back to a canned apology when none of them answer.
//! Replies are free text, so callers pull JSON out of them with
//! `extract_json_object` and treat parse failures as soft.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GeneratorError;

pub mod http;

pub use http::Provider;

/// Per-provider reply deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Returned when every provider in a chain has failed.
pub const FALLBACK_REPLY: &str =
    "Sorry, no text generation service is available right now. Please try again later.";

/// Anything that can turn a prompt into text.
pub trait TextGenerator: Send + Sync {
    /// Produce a free-text reply for the prompt.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GeneratorError>> + Send;
}

/// Ordered fallback chain over HTTP providers.
///
/// Providers are tried in order; a provider that errors, times out or
/// returns an empty reply is skipped. When the chain is exhausted the
/// call still succeeds, returning `FALLBACK_REPLY` -- callers downstream
/// handle it like any other unparseable reply.
pub struct GeneratorChain {
    providers: Vec<Provider>,
    timeout: Duration,
    client: Client,
}

impl GeneratorChain {
    /// Build a chain over the given providers with the default timeout.
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client: Client::new(),
        }
    }

    /// Override the per-provider timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Providers in the order they will be tried.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }
}

impl TextGenerator for GeneratorChain {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        for provider in &self.providers {
            match tokio::time::timeout(self.timeout, provider.call(&self.client, prompt)).await {
                Ok(Ok(text)) => {
                    if text.trim().is_empty() {
                        warn!(provider = provider.label(), "provider returned an empty reply");
                        continue;
                    }
                    debug!(provider = provider.label(), chars = text.len(), "provider answered");
                    return Ok(text);
                }
                Ok(Err(err)) => {
                    warn!(provider = provider.label(), error = %err, "provider failed, trying next");
                }
                Err(_) => {
                    warn!(
                        provider = provider.label(),
                        timeout_secs = self.timeout.as_secs(),
                        "provider timed out, trying next"
                    );
                }
            }
        }
        Ok(FALLBACK_REPLY.to_string())
    }
}

/// Slice out the first balanced `{...}` span in free text.
///
/// Tracks brace depth and skips braces inside JSON string literals.
/// Returns `None` when no opening brace exists or the braces never
/// balance.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Pull a typed payload out of a free-text reply, if one is there.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Option<T> {
    let span = extract_json_object(reply)?;
    serde_json::from_str(span).ok()
}
