//! HTTP provider flavors for the generator chain.

use reqwest::Client;
use serde_json::json;

use crate::error::GeneratorError;

/// A single upstream text-generation endpoint.
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI-style chat-completions endpoint.
    Chat {
        endpoint: String,
        model: String,
        api_key: Option<String>,
    },
    /// Bare prompt-in, text-out endpoint.
    Completion { endpoint: String },
}

impl Provider {
    /// Chat-completions provider.
    pub fn chat(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Provider::Chat {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }

    /// Plain completion provider.
    pub fn completion(endpoint: impl Into<String>) -> Self {
        Provider::Completion {
            endpoint: endpoint.into(),
        }
    }

    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Chat { .. } => "chat",
            Provider::Completion { .. } => "completion",
        }
    }

    pub(crate) async fn call(&self, client: &Client, prompt: &str) -> Result<String, GeneratorError> {
        match self {
            Provider::Chat {
                endpoint,
                model,
                api_key,
            } => chat_call(client, endpoint, model, api_key.as_deref(), prompt).await,
            Provider::Completion { endpoint } => completion_call(client, endpoint, prompt).await,
        }
    }
}

async fn chat_call(
    client: &Client,
    endpoint: &str,
    model: &str,
    api_key: Option<&str>,
    prompt: &str,
) -> Result<String, GeneratorError> {
    let body = json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt },
        ],
    });

    let mut request = client.post(endpoint).json(&body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let resp: serde_json::Value = request.send().await?.json().await?;

    if let Some(err) = resp.get("error") {
        return Err(GeneratorError::Rejected(err.to_string()));
    }

    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or(GeneratorError::MissingContent)
}

async fn completion_call(
    client: &Client,
    endpoint: &str,
    prompt: &str,
) -> Result<String, GeneratorError> {
    let body = json!({ "prompt": prompt });

    let raw = client
        .post(endpoint)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    // Some services wrap the text in a small JSON envelope, others return
    // it bare. Take whichever field is present, or the raw body.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
        if let Some(err) = value.get("error") {
            return Err(GeneratorError::Rejected(err.to_string()));
        }
        for key in ["text", "response", "content"] {
            if let Some(s) = value[key].as_str() {
                return Ok(s.to_string());
            }
        }
    }

    Ok(raw)
}
