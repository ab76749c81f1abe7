use std::time::Duration;

use base64::prelude::*;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, ModelConfig};
use crate::error::InvmapError;
use crate::llm::GenerativeModel;
use crate::render::{PageImage, PNG_MIME};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    Text(&'a str),
    InlineData(Blob),
}

#[derive(Debug, Serialize)]
struct Blob {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(model: &ModelConfig, api_key: String) -> Result<Self, InvmapError> {
        // The blocking client defaults to a 30s timeout; only bound requests
        // when one is configured.
        let client = Client::builder()
            .timeout(model.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| InvmapError::Model(format!("failed to build HTTP client: {e}")))?;

        Ok(GeminiClient {
            client,
            api_base: model.api_base.trim_end_matches('/').to_string(),
            model: model.name.clone(),
            api_key,
        })
    }

    /// Build a client from config; fails before any request when the
    /// credential is missing.
    pub fn from_config(config: &Config) -> Result<Self, InvmapError> {
        let api_key = config.api_key()?;
        info!(model = %config.model.name, url = %config.model.api_base, "Using Gemini backend");
        Self::new(&config.model, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

impl GenerativeModel for GeminiClient {
    fn generate(&self, prompt: &str, images: &[PageImage]) -> Result<String, InvmapError> {
        let request = build_request(prompt, images);
        debug!(images = images.len(), prompt_chars = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| InvmapError::Model(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InvmapError::ModelStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| InvmapError::Model(format!("unreadable response: {e}")))?;
        let text = reply_text(body);
        info!(chars = text.len(), "Model reply received");
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_request<'a>(prompt: &'a str, images: &[PageImage]) -> GenerateRequest<'a> {
    let mut parts = vec![Part::Text(prompt)];
    parts.extend(images.iter().map(|page| {
        Part::InlineData(Blob {
            mime_type: PNG_MIME,
            data: BASE64_STANDARD.encode(&page.png),
        })
    }));
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
    }
}

/// Text parts of the first candidate, concatenated.
fn reply_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}
