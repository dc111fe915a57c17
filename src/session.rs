//! Session controller: owns the startup sequence, the user-input → LLM →
//! dispatcher cycle, and teardown. Network round-trips run on the async
//! runtime; everything that touches widgets is marshaled back through the
//! [`UiScheduler`].

use std::sync::Arc;

use tracing::{error, info};

use crate::dispatcher;
use crate::llm::{self, ChatTransport, LlmReply};
use crate::model::Color;
use crate::selection::{self, SelectionSource};
use crate::state::{SessionPhase, SessionState};
use crate::surface::UiScheduler;
use crate::transcript::{Sender, StatusColor};

pub struct Session {
    state: Arc<SessionState>,
    scheduler: Arc<dyn UiScheduler>,
    transport: Option<Arc<dyn ChatTransport>>,
}

impl Session {
    /// Build a session over an already-seeded registry. `transport` is
    /// `None` when no API key could be discovered.
    pub fn new(
        state: Arc<SessionState>,
        scheduler: Arc<dyn UiScheduler>,
        transport: Option<Arc<dyn ChatTransport>>,
    ) -> Self {
        Self {
            state,
            scheduler,
            transport,
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// Startup: welcome banner, registry report, then the LLM handshake.
    /// Ends in `Connected`, `Disconnected`, or the terminal
    /// `NeedsCredentials`.
    pub async fn startup(&self) {
        self.state.set_phase(SessionPhase::Initializing);
        self.state.set_status("initializing", StatusColor::Orange);

        self.state.say(Sender::System, "🤖 AI control assistant started");
        self.state.say(
            Sender::System,
            "type a natural-language instruction, for example:",
        );
        for example in [
            "  • 'hide button 1'",
            "  • 'set the title to red'",
            "  • 'set the color picker to blue'",
            "  • 'show the color history'",
        ] {
            self.state.say(Sender::System, example);
        }

        let registered = self.state.with_registry(crate::registry::WidgetRegistry::len);
        self.state.say(
            Sender::System,
            format!("{registered} controllable components registered"),
        );

        let Some(transport) = &self.transport else {
            self.state.set_phase(SessionPhase::NeedsCredentials);
            self.state
                .say(Sender::System, "❌ QWEN_API_KEY environment variable not found");
            self.state.say(
                Sender::System,
                "set it and restart: export QWEN_API_KEY=your_key_here",
            );
            self.state.set_status("needs API key", StatusColor::Red);
            return;
        };

        self.state.set_phase(SessionPhase::Connecting);
        self.state.say(Sender::System, "connecting to AI service...");
        self.state.set_status("connecting", StatusColor::Orange);

        match transport.handshake().await {
            Ok(()) => {
                self.state.set_phase(SessionPhase::Connected);
                self.state.say(Sender::System, "✅ connected to AI assistant");
                self.state.set_status("connected", StatusColor::Green);
                info!("session connected");
            }
            Err(e) => {
                self.state.set_phase(SessionPhase::Disconnected);
                self.state.say(Sender::System, format!("❌ failed to connect: {e}"));
                self.state.set_status("connection failed", StatusColor::Red);
                error!(error = %e, "handshake failed");
            }
        }
    }

    /// One user submission: echo, think, ask the model, dispatch the reply
    /// on the UI thread. Submissions are serialized — this future completes
    /// only after the reply has been handed to the scheduler.
    pub async fn submit(&self, input: &str) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }

        let connected = self.state.phase() == SessionPhase::Connected
            && self
                .transport
                .as_ref()
                .is_some_and(|t| t.is_connected());
        if !connected {
            self.state.say(Sender::System, "❌ AI service not connected");
            self.state.set_status("not connected", StatusColor::Red);
            return;
        }
        // `connected` guarantees a transport.
        let Some(transport) = self.transport.clone() else {
            return;
        };

        self.state.say(Sender::User, text);
        self.state.set_status("AI thinking...", StatusColor::Orange);

        let prompt = self.state.with_registry(|r| llm::build_system_prompt(r));
        let result = transport.complete(&prompt, text).await;

        // Teardown may have raced the request; late completions are no-ops.
        if !transport.is_connected() {
            return;
        }

        let state = self.state.clone();
        self.scheduler.run_on_ui(Box::new(move || match result {
            Ok(body) => match llm::extract_reply(&body) {
                LlmReply::Command(envelope) => {
                    dispatcher::dispatch(&state, &envelope);
                }
                LlmReply::Prose(prose) => {
                    state.say(Sender::Ai, prose);
                    state.set_status("ready", StatusColor::Green);
                }
                LlmReply::Failure {
                    error: kind,
                    message,
                    raw_response,
                } => {
                    if let Some(raw) = raw_response {
                        // Parse failures degrade to raw-text rendering.
                        state.say(Sender::Ai, raw);
                        state.set_status("ready", StatusColor::Green);
                    } else {
                        state.say(Sender::System, format!("❌ {kind}: {message}"));
                        state.set_status("request failed", StatusColor::Red);
                    }
                }
            },
            Err(e) => {
                state.say(Sender::System, format!("❌ {e}"));
                state.set_status("request failed", StatusColor::Red);
            }
        }));
    }

    /// Manual picker event from the surface; enters the shared selection
    /// pipeline.
    pub fn picker_changed(&self, color: Color) {
        selection::handle_color_selection(&self.state, color, SelectionSource::ManualPick);
    }

    /// Teardown: closes the LLM client. Does not wait for in-flight
    /// requests; their completion handlers no-op once disconnected.
    pub fn shutdown(&self) {
        if let Some(transport) = &self.transport {
            transport.close();
        }
        self.state.set_phase(SessionPhase::Disconnected);
        self.state.say(Sender::System, "AI connection closed");
        self.state.set_status("disconnected", StatusColor::Red);
        info!("session shut down");
    }
}
