//! Chat-completion client abstraction.
//!
//! The [`ChatClient`] trait decouples the conversation loop from the actual
//! backend (an OpenAI-compatible HTTP endpoint). Tests use scripted clients
//! that return predetermined replies without touching the network.

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::config::AgentConfig;
use crate::core::types::{ChatMessage, ChatReply, Role, Usage};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub tools: &'a [Value],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Abstraction over chat-completion backends.
pub trait ChatClient {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<ChatReply>;

    /// Endpoint identifier recorded in the call log.
    fn endpoint(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

/// Client for OpenAI-compatible HTTP endpoints.
pub struct HttpChatClient {
    client: Client,
    url: String,
    bearer_token: Option<String>,
}

impl HttpChatClient {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("build http client")?;
        let bearer_token = config.resolve_bearer_token();
        if bearer_token.is_none() {
            warn!(
                env = %config.bearer_token_env,
                "no bearer token configured, sending unauthenticated requests"
            );
        }
        Ok(Self {
            client,
            url: chat_completions_url(&config.endpoint_url),
            bearer_token,
        })
    }
}

impl ChatClient for HttpChatClient {
    #[instrument(skip_all, fields(model = request.model, messages = request.messages.len()))]
    fn complete(&self, request: &ChatRequest<'_>) -> Result<ChatReply> {
        let mut http = self.client.post(&self.url).json(request);
        if let Some(token) = &self.bearer_token {
            http = http.bearer_auth(token);
        }
        let response = http
            .send()
            .with_context(|| format!("send chat request to {}", self.url))?;
        let status = response.status();
        let body = response.text().context("read chat response body")?;
        if !status.is_success() {
            warn!(%status, "chat request failed");
            return Err(anyhow!("chat request failed with {status}: {}", body.trim()));
        }
        let reply = parse_completion(&body)?;
        debug!(tool_calls = reply.message.tool_calls.len(), "chat reply received");
        Ok(reply)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Extract the first choice's assistant message and usage.
pub fn parse_completion(body: &str) -> Result<ChatReply> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).context("parse chat completion response")?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("chat completion response has no choices"))?;
    let message = choice.message;
    if message.role != Role::Assistant {
        return Err(anyhow!("expected assistant message, got {:?}", message.role));
    }
    Ok(ChatReply {
        message,
        usage: parsed.usage,
    })
}

/// Accept either a base URL (`.../v1`) or the full completions URL.
pub fn chat_completions_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/chat/completions")
    }
}
