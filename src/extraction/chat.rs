//! LLM-backed skill extraction over an OpenAI-compatible chat completion API.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{parse_skill_list, SkillExtractor};
use crate::config::ExtractionConfig;
use crate::embedding::http::api_key_from_env;

const SYSTEM_PROMPT: &str = "You extract concrete technical skill names from staffing requests. \
Reply with a comma-separated list of skill names only. Reply with an empty message if there are none.";

pub struct ChatSkillExtractor {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

fn extraction_prompt(query: &str) -> String {
    format!("List the technical skills required by this request.\n\nRequest: {query}")
}

impl ChatSkillExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key_from_env(&config.api_key_env),
        })
    }
}

impl SkillExtractor for ChatSkillExtractor {
    fn extract_skills(&self, query: &str) -> Result<Vec<String>> {
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: extraction_prompt(query),
                },
            ],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .with_context(|| format!("HTTP request to {} failed", self.endpoint))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("chat API returned {status}: {body}");
        }

        let parsed: ChatResponse = response.json().context("failed to parse chat response")?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let skills = parse_skill_list(&reply);
        tracing::debug!(count = skills.len(), "skills extracted");
        Ok(skills)
    }
}
