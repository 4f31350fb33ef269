use crate::config::{InsightSettings, DEFAULT_INSIGHT_MODEL};
use crate::error::{Result, TrackerError};
use crate::insight::InsightClient;
use crate::llm::types::*;
use log::debug;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Insight backend that calls Gemini's `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiInsightClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiInsightClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_INSIGHT_MODEL.to_string(),
        }
    }

    /// Builds a client from configuration. Fails when no API key is set.
    pub fn from_settings(settings: &InsightSettings) -> Result<Self> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            TrackerError::InvalidConfig("GEMINI_API_KEY is not set".to_string())
        })?;
        Ok(Self::new(api_key).with_model(settings.model.clone()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at another host, e.g. a local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) async fn generate_content(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(GenerationConfig {
                response_mime_type: "text/plain".to_string(),
            }),
        };

        debug!("Requesting insight from model {}", self.model);
        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(TrackerError::InsightFailure(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;
        extract_text(body)
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: GenerateContentResponse) -> Result<String> {
    let candidate = body
        .candidates
        .ok_or_else(|| TrackerError::InsightFailure("No candidates returned".to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| TrackerError::InsightFailure("Empty candidates list".to_string()))?;

    let text: Vec<String> = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(text),
            Part::Other(_) => None,
        })
        .collect();

    if text.is_empty() {
        return Err(TrackerError::InsightFailure(
            "Model returned non-text content".to_string(),
        ));
    }

    Ok(text.join(""))
}

impl InsightClient for GeminiInsightClient {
    async fn generate_insight(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }
}
