//! Client for OpenAI-compatible chat completion and image generation APIs.
//!
//! One [`OpenAiClient`] serves both [`TextService`] and [`ImageService`];
//! each call carries its own timeout since long-form completions take far
//! longer than image requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use postsmith_shared::{
    CompletionRequest, ImageRequest, ImageService, OpenAiSettings, PostsmithError, Result,
    TextService,
};

/// User-Agent string for model API requests.
const USER_AGENT: &str = concat!("Postsmith/", env!("CARGO_PKG_VERSION"));

/// Service name used in error messages.
const SERVICE: &str = "openai";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Bearer-authenticated client for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_timeout: Duration,
    image_timeout: Duration,
}

impl OpenAiClient {
    /// Build a client from resolved settings.
    pub fn new(settings: &OpenAiSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PostsmithError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            text_timeout: settings.text_timeout,
            image_timeout: settings.image_timeout,
        })
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R> {
        let url = format!("{}/{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| PostsmithError::Network(format!("{SERVICE} {path}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PostsmithError::Network(format!("{SERVICE} {path}: {e}")))?;

        if !status.is_success() {
            return Err(PostsmithError::api(SERVICE, status.as_u16(), &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| PostsmithError::parse(format!("invalid {path} response: {e}")))
    }
}

#[async_trait]
impl TextService for OpenAiClient {
    #[instrument(skip_all, fields(model = %request.constraints.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.constraints.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.constraints.max_tokens,
            temperature: request.constraints.temperature,
        };

        let response: ChatResponse = self
            .post_json("chat/completions", &body, self.text_timeout)
            .await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PostsmithError::validation("completion returned no choices"))?;

        debug!(finish_reason = ?choice.finish_reason, "completion received");

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(PostsmithError::validation("completion returned empty content")),
        }
    }
}

#[async_trait]
impl ImageService for OpenAiClient {
    #[instrument(skip_all, fields(model = %request.model, size = %request.size))]
    async fn generate_image(&self, request: &ImageRequest) -> Result<String> {
        let body = ImageGenerationRequest {
            model: &request.model,
            prompt: &request.prompt,
            size: &request.size,
            quality: &request.quality,
            n: 1,
        };

        let response: ImageGenerationResponse = self
            .post_json("images/generations", &body, self.image_timeout)
            .await?;

        response
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| PostsmithError::validation("image generation returned no URL"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
