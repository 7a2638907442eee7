// src/predictor.rs

use crate::error::PredictError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Label used when there is no diff to describe.
pub const NOT_AVAILABLE: &str = "N/A";

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/mamiksik/CommitPredictorT5";

/// Turns a diff into a short description of the change.
pub trait FixTypePredictor {
    fn predict(&self, diff: &str) -> Result<String, PredictError>;
}

/// Predicts a label for `diff`, never sending an empty diff to the backend.
pub fn label_for(predictor: &dyn FixTypePredictor, diff: &str) -> Result<String, PredictError> {
    if diff.trim().is_empty() {
        return Ok(NOT_AVAILABLE.to_string());
    }
    predictor.predict(diff)
}

/// Keeps the first `max_tokens` whitespace-delimited tokens of `text`,
/// preserving the original spacing between them.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> &str {
    let mut seen = 0;
    let mut in_token = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_token {
                in_token = false;
                seen += 1;
                if seen == max_tokens {
                    return &text[..i];
                }
            }
        } else {
            if !in_token && seen == max_tokens {
                return &text[..i];
            }
            in_token = true;
        }
    }
    text
}

/// Labels every diff "N/A" without consulting a model.
pub struct SkipPredictor;

impl FixTypePredictor for SkipPredictor {
    fn predict(&self, _diff: &str) -> Result<String, PredictError> {
        Ok(NOT_AVAILABLE.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub max_input_tokens: usize,
    pub max_length: u32,
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            max_input_tokens: 512,
            max_length: 64,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generated>),
    Single(Generated),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Batch(items) => items.into_iter().next().map(|g| g.generated_text),
            GenerationResponse::Single(g) => Some(g.generated_text),
        }
    }
}

/// Calls a hosted sequence-to-sequence model over HTTP.
pub struct RemotePredictor {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
}

impl RemotePredictor {
    pub fn new(config: RemoteConfig) -> Result<Self, PredictError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("fixmsg")
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }
}

impl FixTypePredictor for RemotePredictor {
    fn predict(&self, diff: &str) -> Result<String, PredictError> {
        let body = GenerationRequest {
            inputs: truncate_tokens(diff, self.config.max_input_tokens),
            parameters: GenerationParameters { max_new_tokens: self.config.max_length },
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(PredictError::Status { status: status.as_u16(), body: text });
        }

        let parsed: GenerationResponse = serde_json::from_str(&text)
            .map_err(|e| PredictError::Response(format!("{e}: {text}")))?;
        parsed
            .into_text()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| PredictError::Response("empty generation list".to_string()))
    }
}
