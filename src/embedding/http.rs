//! OpenAI-compatible HTTP embedding provider.
//!
//! Sends `{model, input, dimensions}` to the configured endpoint and reads
//! `data[0].embedding`. Transport errors, 429 and 5xx responses are retried
//! with exponential backoff up to `max_retries` times. Any other failure is
//! returned at once. Callers treat an error as "no embedding".

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{l2_normalize, EmbeddingProvider};
use crate::config::EmbeddingConfig;

pub struct HttpEmbeddingProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
    max_retries: u32,
    backoff_base: Duration,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// Outcome of a failed request attempt.
enum AttemptError {
    /// Transient: worth another attempt.
    Retry(anyhow::Error),
    /// Permanent: retrying cannot help.
    Fail(anyhow::Error),
}

/// Read an API key from the named environment variable, ignoring blanks.
pub(crate) fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}

impl HttpEmbeddingProvider {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let api_key = api_key_from_env(&config.api_key_env);
        if api_key.is_none() {
            tracing::warn!(var = %config.api_key_env, "no API key set for embedding provider");
        }

        tracing::info!(
            endpoint = %config.endpoint,
            model = %config.model,
            dimensions = config.dimensions,
            "HTTP embedding provider ready"
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            dimensions: config.dimensions,
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(200),
        })
    }

    /// Override the retry backoff base (tests use zero).
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn request_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_base * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
                tracing::debug!(attempt, "retrying embedding request");
            }

            match self.send_request(texts) {
                Ok(embeddings) => return Ok(embeddings),
                Err(AttemptError::Fail(e)) => {
                    tracing::warn!(attempt, error = %e, "embedding request rejected");
                    return Err(e);
                }
                Err(AttemptError::Retry(e)) => {
                    tracing::warn!(attempt, error = %e, "embedding request failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("all retries exhausted")))
    }

    fn send_request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AttemptError> {
        let body = EmbedRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.dimensions,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .with_context(|| format!("HTTP request to {} failed", self.endpoint))
            .map_err(AttemptError::Retry)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let err = anyhow::anyhow!("embedding API returned {status}: {body}");
            return Err(if status.as_u16() == 429 || status.is_server_error() {
                AttemptError::Retry(err)
            } else {
                AttemptError::Fail(err)
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .context("failed to parse embedding response")
            .map_err(AttemptError::Fail)?;

        if parsed.data.len() != texts.len() {
            return Err(AttemptError::Fail(anyhow::anyhow!(
                "embedding API returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        parsed
            .data
            .into_iter()
            .map(|d| {
                if d.embedding.len() != self.dimensions {
                    return Err(AttemptError::Fail(anyhow::anyhow!(
                        "model returned {} dimensions, expected {}",
                        d.embedding.len(),
                        self.dimensions
                    )));
                }
                Ok(l2_normalize(&d.embedding))
            })
            .collect()
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request_embeddings(&[text])?
            .into_iter()
            .next()
            .context("embedding API returned no vectors")
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}
