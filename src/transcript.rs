//! Append-only conversation transcript plus the status indicator. The
//! transcript never mutates past entries; front ends subscribe to render
//! lines as they are appended.

use serde::Serialize;

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sender {
    User,
    Ai,
    System,
}

impl Sender {
    pub fn prefix(self) -> &'static str {
        match self {
            Sender::User => "👤 You",
            Sender::Ai => "🤖 AI",
            Sender::System => "[system]",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn display_line(&self) -> String {
        match self.sender {
            Sender::System => format!("{} {}", self.sender.prefix(), self.text),
            _ => format!("{}: {}", self.sender.prefix(), self.text),
        }
    }
}

/// Status indicator colors, with the inline style each maps to on the
/// status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusColor {
    Green,
    Orange,
    Red,
}

impl StatusColor {
    pub fn label_style(self) -> &'static str {
        match self {
            StatusColor::Green => "text-fill: #2ecc71; font-weight: bold;",
            StatusColor::Orange => "text-fill: #f39c12; font-weight: bold;",
            StatusColor::Red => "text-fill: #e74c3c; font-weight: bold;",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub text: String,
    pub color: StatusColor,
}

pub type TranscriptObserver = Box<dyn Fn(&ChatMessage) + Send>;

/// The conversation view model: ordered messages and the current status.
pub struct Transcript {
    messages: Vec<ChatMessage>,
    status: Status,
    observers: Vec<TranscriptObserver>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            status: Status {
                text: "initializing".to_string(),
                color: StatusColor::Orange,
            },
            observers: Vec::new(),
        }
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sender: Sender, text: impl Into<String>) {
        let message = ChatMessage {
            sender,
            text: text.into(),
        };
        for observer in &self.observers {
            observer(&message);
        }
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether any line contains `needle`. Convenience for assertions and
    /// front-end smoke checks.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    pub fn set_status(&mut self, text: impl Into<String>, color: StatusColor) {
        self.status = Status {
            text: text.into(),
            color,
        };
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn subscribe(&mut self, observer: TranscriptObserver) {
        self.observers.push(observer);
    }
}
