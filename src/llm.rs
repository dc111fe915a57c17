//! LLM client: an OpenAI-compatible chat-completions bridge. The transport
//! is a trait so the dispatcher and session tests can script replies; the
//! production implementation is [`QwenClient`] over `reqwest`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::dispatcher::{command_catalog, CommandEnvelope};
use crate::error::AppError;
use crate::registry::WidgetRegistry;

/// Per-request timeout for instruction round-trips.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for the startup handshake probe.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// The fixed prompt template. It is data, not code: iterating on the prompt
/// means editing the resource, and the placeholders are filled from the live
/// command catalog and registry at session start.
const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("../prompts/system_prompt.txt");

// ── Transport trait ──────────────────────────────────────────────

/// Asynchronous request/response seam to the model. `complete` returns the
/// raw response body; callers run it through [`extract_reply`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// One cheap round-trip to verify credentials and reachability. Flips
    /// the logical connected flag on success.
    async fn handshake(&self) -> Result<(), AppError>;

    /// Send one instruction (system prompt + user text) and return the raw
    /// response body.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, AppError>;

    fn is_connected(&self) -> bool;

    /// Drop the logical connection. In-flight completion handlers must
    /// become no-ops once this has run.
    fn close(&self);
}

// ── Production client ────────────────────────────────────────────

/// Connectionless HTTP client with a logical `connected` flag. One request
/// per call; multiple requests may be in flight.
pub struct QwenClient {
    http: reqwest::Client,
    config: LlmConfig,
    connected: AtomicBool,
}

impl QwenClient {
    pub fn new(config: LlmConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            config,
            connected: AtomicBool::new(false),
        })
    }

    fn request_body(&self, system_prompt: &str, user_text: &str) -> Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_text },
            ],
            "stream": false,
        })
    }

    async fn post(&self, body: &Value, timeout: Duration) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(AppError::Http {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[async_trait]
impl ChatTransport for QwenClient {
    async fn handshake(&self) -> Result<(), AppError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": "You are a connectivity probe. Reply with OK." },
                { "role": "user", "content": "ping" },
            ],
            "stream": false,
        });
        self.post(&body, HANDSHAKE_TIMEOUT).await?;
        self.connected.store(true, Ordering::SeqCst);
        info!(model = %self.config.model, "LLM handshake succeeded");
        Ok(())
    }

    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, AppError> {
        if !self.is_connected() {
            return Err(AppError::NotConnected);
        }
        debug!(len = user_text.len(), "sending instruction");
        self.post(&self.request_body(system_prompt, user_text), REQUEST_TIMEOUT)
            .await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!("LLM client closed");
    }
}

// ── System prompt ────────────────────────────────────────────────

/// Fill the prompt template with the command catalog and the identifiers
/// currently registered.
pub fn build_system_prompt(registry: &WidgetRegistry) -> String {
    let commands: Vec<String> = command_catalog()
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let mut line = format!("{}. {} - {}", i + 1, spec.name, spec.description);
            if let Some(hint) = params_hint(&spec.param_schema) {
                line.push_str(&format!(" (params: {hint})"));
            }
            line
        })
        .collect();

    let identifiers: Vec<String> = registry.ids().map(|id| format!("- {id}")).collect();

    SYSTEM_PROMPT_TEMPLATE
        .replace("{commands}", &commands.join("\n"))
        .replace("{identifiers}", &identifiers.join("\n"))
}

/// Compact `name: type` rendering of a params JSON schema.
fn params_hint(schema: &Value) -> Option<String> {
    let properties = schema.get("properties")?.as_object()?;
    if properties.is_empty() {
        return None;
    }
    let rendered: Vec<String> = properties
        .iter()
        .map(|(name, prop)| {
            let ty = prop.get("type").and_then(Value::as_str).unwrap_or("any");
            format!("{name}: {ty}")
        })
        .collect();
    Some(rendered.join(", "))
}

// ── Response extraction ──────────────────────────────────────────

/// What one LLM round-trip produced, after unwrapping the nested envelope.
#[derive(Debug, Clone)]
pub enum LlmReply {
    /// The inner content parsed as a command envelope.
    Command(CommandEnvelope),
    /// Plain prose from the model, rendered as an AI message.
    Prose(String),
    /// The endpoint reported or produced something unusable.
    Failure {
        error: String,
        message: String,
        raw_response: Option<String>,
    },
}

/// Unwrap a chat-completions response body: `choices[0].message.content`,
/// stripped of optional code fences, re-parsed as a command envelope when it
/// carries `command` and `description`.
pub fn extract_reply(body: &str) -> LlmReply {
    let root: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "response body is not JSON");
            return LlmReply::Failure {
                error: "parse failure".to_string(),
                message: e.to_string(),
                raw_response: Some(truncate(body, 500)),
            };
        }
    };

    if let Some(content) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
    {
        let cleaned = content.replace("```json", "").replace("```", "");
        let cleaned = cleaned.trim();
        if cleaned.starts_with('{') {
            if let Ok(envelope) = serde_json::from_str::<CommandEnvelope>(cleaned) {
                return LlmReply::Command(envelope);
            }
        }
        return LlmReply::Prose(content.trim().to_string());
    }

    if let Some(error) = root.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return LlmReply::Failure {
            error: "API error".to_string(),
            message,
            raw_response: None,
        };
    }

    // Unrecognized shape: fall back to raw-text rendering.
    LlmReply::Prose(truncate(body, 500))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ── Scripted transport for tests ─────────────────────────────────
