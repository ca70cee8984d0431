use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::GeminiSettings;
use pantry_core::gemini::{GenerateContentResponse, build_request, response_text};
use pantry_core::service::TextGenerator;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self> {
        Self::with_base_url(settings, API_BASE)
    }

    pub fn with_base_url(settings: &GeminiSettings, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "pantry/{} (recipe manager)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate_async(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, "requesting text generation");

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&build_request(prompt))
            .send()
            .await
            .context("Failed to reach Gemini API")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("Failed to read Gemini response")?;

        match serde_json::from_str::<GenerateContentResponse>(&body) {
            Ok(data) => {
                if !status.is_success() && data.error.is_none() {
                    anyhow::bail!("Gemini API error ({status})");
                }
                response_text(&data)
            }
            Err(_) if !status.is_success() => anyhow::bail!("Gemini API error ({status})"),
            Err(e) => Err(e).context("Failed to parse Gemini response"),
        }
    }
}

impl TextGenerator for GeminiClient {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.generate_async(prompt))
    }
}
