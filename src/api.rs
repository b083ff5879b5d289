//! Schema-constrained extraction through an OpenAI-compatible API.
//!
//! This module turns normalized page text into a structured JSON record by
//! calling a chat-completions endpoint with a strict `json_schema` response
//! format. The provider enforces the schema; the client only checks that the
//! returned text parses as JSON.
//!
//! # Architecture
//!
//! - [`Extractor`]: Core trait defining async extraction, the seam the
//!   pipeline is generic over
//! - [`OpenAiExtractor`]: HTTP implementation against `/chat/completions`
//!
//! There is no retry: a failed call fails the source.

use crate::config::LotterySource;
use crate::error::{Error, Result};
use crate::schema::SchemaKind;
use crate::utils::{looks_truncated, truncate_for_log};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Upper bound on upstream error bodies kept in [`Error::Upstream`].
const ERROR_BODY_PREVIEW: usize = 500;

/// Everything the extractor needs to know about one page.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub source: &'a LotterySource,
    /// Capture timestamp, passed to the model as `FETCHED_AT`.
    pub fetched_at: &'a str,
    /// Normalized page text.
    pub text: &'a str,
}

impl ExtractionRequest<'_> {
    pub fn kind(&self) -> SchemaKind {
        SchemaKind::for_key(&self.source.key)
    }

    pub fn user_message(&self) -> String {
        format!(
            "LOTTERY_KEY: {key}\nLOTTERY_NAME: {name}\nSOURCE_URL: {url}\n\
             FETCHED_AT: {fetched_at}\n\nTEXT:\n{text}",
            key = self.source.key,
            name = self.source.name,
            url = self.source.url,
            fetched_at = self.fetched_at,
            text = self.text,
        )
    }
}

/// Trait for async structured extraction.
///
/// Implementors send one page to a model and return the parsed JSON payload
/// exactly as produced, without client-side schema validation.
pub trait Extractor {
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<Value>;
}

/// Connection settings for [`OpenAiExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub api_key: String,
    /// Base URL up to and including the version segment, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub model: String,
}

impl ExtractorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
pub struct JsonSchemaFormat {
    pub name: &'static str,
    pub schema: Value,
    pub strict: bool,
}

/// Chat-completions client with a strict JSON-schema response format.
#[derive(Debug, Clone)]
pub struct OpenAiExtractor {
    http: Client,
    config: ExtractorConfig,
}

impl OpenAiExtractor {
    /// Build the HTTP client used for every extraction call.
    ///
    /// # Arguments
    ///
    /// * `config` - Credential, base URL and model name
    ///
    /// # Errors
    ///
    /// [`Error::MissingApiKey`] when the key is empty or whitespace.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    pub fn build_body(&self, request: &ExtractionRequest<'_>) -> ChatRequest {
        let kind = request.kind();
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: kind.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_message(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: kind.name(),
                    schema: kind.json_schema(),
                    strict: true,
                },
            },
        }
    }
}

impl Extractor for OpenAiExtractor {
    #[instrument(level = "info", skip_all, fields(lottery = %request.source.key))]
    async fn extract(&self, request: &ExtractionRequest<'_>) -> Result<Value> {
        let t0 = Instant::now();
        let body = self.build_body(request);
        debug!(
            model = %body.model,
            schema = body.response_format.json_schema.name,
            text_chars = request.text.chars().count(),
            "Sending extraction request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                %status,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Extraction API call failed"
            );
            return Err(Error::Upstream {
                status: status.as_u16(),
                body: truncate_for_log(&text, ERROR_BODY_PREVIEW),
            });
        }

        let raw = response.text().await?;
        let data: Value = serde_json::from_str(&raw)?;
        let output = output_text(&data).ok_or(Error::EmptyPayload)?;

        let parsed = serde_json::from_str::<Value>(&output).map_err(|e| {
            warn!(
                error = %e,
                truncated = looks_truncated(&e),
                response_preview = %truncate_for_log(&output, 300),
                "Model returned non-JSON output"
            );
            Error::Parse(e)
        })?;

        info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Extraction succeeded");
        Ok(parsed)
    }
}

/// Pull the generated text out of a completion response.
///
/// Understands the chat-completions shape (`choices[0].message.content`) and,
/// for compatible gateways, the Responses API shapes (`output_text` or
/// `output[].content[].text`). Empty strings count as no output.
pub fn output_text(data: &Value) -> Option<String> {
    let chat = data
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str);
    let responses = || data.get("output_text").and_then(Value::as_str);
    let items = || {
        data.get("output")?
            .as_array()?
            .iter()
            .filter_map(|item| item.get("content")?.as_array())
            .flatten()
            .find_map(|part| part.get("text")?.as_str())
    };

    chat.or_else(responses)
        .or_else(items)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}
