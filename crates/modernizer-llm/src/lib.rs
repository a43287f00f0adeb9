//! Rewrite oracle backed by a hosted chat model.

mod anthropic;
mod markdown;
mod openai;

use std::thread;
use std::time::Duration;

use log::{debug, warn};
use modernizer_core::{LlmSettings, Provider, RewriteOracle};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

pub use markdown::strip_code_fence;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{} is not set; export it or add it to modernizer.toml", .0.api_key_var())]
    MissingApiKey(Provider),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: Provider,
        status: StatusCode,
        body: String,
    },

    #[error("{0} returned an empty reply")]
    EmptyReply(Provider),
}

pub type Result<T> = std::result::Result<T, LlmError>;

impl LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LlmError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            LlmError::MissingApiKey(_) | LlmError::EmptyReply(_) => false,
        }
    }
}

/// Blocking chat client for the configured provider.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    provider: Provider,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let api_key = settings
            .api_key()
            .ok_or(LlmError::MissingApiKey(settings.provider))?
            .to_string();
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| match settings.provider {
                Provider::Anthropic => anthropic::DEFAULT_BASE_URL.to_string(),
                Provider::OpenAi => openai::DEFAULT_BASE_URL.to_string(),
            });
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            provider: settings.provider,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_retries: settings.max_retries,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `system` as the instruction and `user` as the message, retrying
    /// transient failures up to `max_retries` times.
    pub fn complete(&self, system: &str, user: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.send(system, user) {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} request failed ({e}), retry {attempt}/{}",
                        self.provider, self.max_retries
                    );
                    thread::sleep(RETRY_BACKOFF * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn send(&self, system: &str, user: &str) -> Result<String> {
        debug!(
            "Sending {} chars to {} ({})",
            user.len(),
            self.provider,
            self.model
        );
        let text = match self.provider {
            Provider::Anthropic => {
                let body = anthropic::MessagesRequest {
                    model: &self.model,
                    max_tokens: self.max_tokens,
                    temperature: self.temperature,
                    system,
                    messages: vec![anthropic::Message {
                        role: "user",
                        content: user,
                    }],
                };
                let request = self
                    .http
                    .post(format!("{}{}", self.base_url, anthropic::MESSAGES_PATH))
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", anthropic::API_VERSION)
                    .json(&body);
                self.execute::<anthropic::MessagesResponse>(request)?.text()
            }
            Provider::OpenAi => {
                let body = openai::ChatRequest {
                    model: &self.model,
                    temperature: self.temperature,
                    messages: vec![
                        openai::ChatMessage {
                            role: "system",
                            content: system,
                        },
                        openai::ChatMessage {
                            role: "user",
                            content: user,
                        },
                    ],
                };
                let request = self
                    .http
                    .post(format!("{}{}", self.base_url, openai::COMPLETIONS_PATH))
                    .bearer_auth(&self.api_key)
                    .json(&body);
                self.execute::<openai::ChatResponse>(request)?.text()
            }
        };

        if text.trim().is_empty() {
            return Err(LlmError::EmptyReply(self.provider));
        }
        Ok(text)
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                provider: self.provider,
                status,
                body,
            });
        }
        Ok(response.json()?)
    }
}

impl RewriteOracle for LlmClient {
    fn propose(&self, code: &str, instructions: &str) -> Option<String> {
        match self.complete(instructions, code) {
            Ok(reply) => {
                let code = strip_code_fence(&reply);
                (!code.is_empty()).then_some(code)
            }
            Err(e) => {
                warn!("{} call failed: {e}", self.provider);
                None
            }
        }
    }
}
