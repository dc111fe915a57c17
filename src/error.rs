use std::fmt;

use serde::Serialize;

use crate::registry::Capability;

/// Structured error type for the engine. Replaces stringly-typed errors so
/// callers (dispatcher, session, front ends) can match on the failure kind
/// and pick the right status color.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum AppError {
    MissingCredentials,
    NotConnected,
    Transport { message: String },
    Http { status: u16, body: String },
    UnknownCommand { kind: String },
    MissingParam { param: String },
    WidgetNotFound { id: String },
    CapabilityMismatch { id: String, needed: Capability },
    ColorParse { input: String },
    HistoryIndex { index: usize, len: usize },
    Execution { message: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingCredentials => write!(f, "QWEN_API_KEY is not set"),
            AppError::NotConnected => write!(f, "AI service not connected"),
            AppError::Transport { message } => write!(f, "connection error: {message}"),
            AppError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            AppError::UnknownCommand { kind } => write!(f, "unknown command kind: {kind}"),
            AppError::MissingParam { param } => write!(f, "missing parameter: {param}"),
            AppError::WidgetNotFound { id } => write!(f, "component not found: {id}"),
            AppError::CapabilityMismatch { id, needed } => {
                write!(f, "component {id} does not support {needed}")
            }
            AppError::ColorParse { input } => write!(f, "cannot recognize color: {input}"),
            AppError::HistoryIndex { index, len } => {
                write!(f, "history color {index} not found, only {len} recorded")
            }
            AppError::Execution { message } => write!(f, "execution error: {message}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport {
            message: e.to_string(),
        }
    }
}
