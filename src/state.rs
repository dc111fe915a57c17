use parking_lot::Mutex;
use serde::Serialize;

use crate::model::ColorHistory;
use crate::registry::WidgetRegistry;
use crate::transcript::{Sender, StatusColor, Transcript};

// ── Session phase ────────────────────────────────────────────────

/// Lifecycle of one session. `NeedsCredentials` is terminal until restart;
/// user input is only accepted while `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Initializing,
    NeedsCredentials,
    Connecting,
    Connected,
    Disconnected,
}

// ── Session state ────────────────────────────────────────────────

/// Process-wide state shared by the session controller, dispatcher, and
/// front end. All widget and history access happens on the UI thread, so the
/// mutexes are uncontended; they exist to make the sharing across the async
/// boundary sound.
pub struct SessionState {
    pub registry: Mutex<WidgetRegistry>,
    pub history: Mutex<ColorHistory>,
    pub transcript: Mutex<Transcript>,
    phase: Mutex<SessionPhase>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            registry: Mutex::new(WidgetRegistry::new()),
            history: Mutex::new(ColorHistory::new()),
            transcript: Mutex::new(Transcript::new()),
            phase: Mutex::new(SessionPhase::Initializing),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the registry for the duration of `f`.
    pub fn with_registry<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&WidgetRegistry) -> R,
    {
        let guard = self.registry.lock();
        f(&guard)
    }

    /// Mutating access to the registry for the duration of `f`.
    pub fn with_registry_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut WidgetRegistry) -> R,
    {
        let mut guard = self.registry.lock();
        f(&mut guard)
    }

    pub fn with_history<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ColorHistory) -> R,
    {
        let guard = self.history.lock();
        f(&guard)
    }

    pub fn with_history_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ColorHistory) -> R,
    {
        let mut guard = self.history.lock();
        f(&mut guard)
    }

    pub fn with_transcript<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Transcript) -> R,
    {
        let guard = self.transcript.lock();
        f(&guard)
    }

    pub fn with_transcript_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Transcript) -> R,
    {
        let mut guard = self.transcript.lock();
        f(&mut guard)
    }

    /// Append one transcript line.
    pub fn say(&self, sender: Sender, text: impl Into<String>) {
        self.with_transcript_mut(|t| t.append(sender, text));
    }

    /// Update the status indicator and mirror it onto the `statusLabel`
    /// widget when one is registered.
    pub fn set_status(&self, text: &str, color: StatusColor) {
        self.with_transcript_mut(|t| t.set_status(text, color));
        self.with_registry(|registry| {
            if let Some(handle) = registry.lookup("statusLabel") {
                handle.with_mut(|w| {
                    w.set_text(text);
                    w.set_style(color.label_style());
                });
            }
        });
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock()
    }

    pub fn set_phase(&self, phase: SessionPhase) {
        *self.phase.lock() = phase;
    }
}
