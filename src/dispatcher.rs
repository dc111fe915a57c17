//! Command dispatcher: validates envelopes coming back from the LLM and
//! routes them to the widget mutator or the color history. Every surface
//! (AI replies, tests, front-end shortcuts) dispatches through the same
//! executor, and every dispatch ends in exactly one terminal status.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;
use crate::model::color;
use crate::mutator;
use crate::selection::{self, SelectionSource};
use crate::state::SessionState;
use crate::transcript::{Sender, StatusColor};

// ── Envelope ─────────────────────────────────────────────────────

/// The JSON object the LLM replies with. `command` and `description` are
/// mandatory; everything else depends on the command kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub command: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub params: Value,
    pub description: String,
}

// ── Params ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChangeTextParams {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChangeColorParams {
    pub color: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetStyleParams {
    pub style: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ApplyHistoryColorParams {
    /// 1-based history index; 1 is the most recently used color.
    pub index: usize,
    pub target: String,
}

// ── Taxonomy ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    ShowComponent,
    HideComponent,
    ChangeText,
    ChangeColor,
    SetColorPicker,
    SetStyle,
    ShowColorHistory,
    ClearColorHistory,
    ApplyHistoryColor,
}

impl CommandKind {
    /// Resolve a `command` field, case-insensitively.
    pub fn resolve(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "showcomponent" => Some(Self::ShowComponent),
            "hidecomponent" => Some(Self::HideComponent),
            "changetext" => Some(Self::ChangeText),
            "changecolor" => Some(Self::ChangeColor),
            "setcolorpicker" => Some(Self::SetColorPicker),
            "setstyle" => Some(Self::SetStyle),
            "showcolorhistory" => Some(Self::ShowColorHistory),
            "clearcolorhistory" => Some(Self::ClearColorHistory),
            "applyhistorycolor" => Some(Self::ApplyHistoryColor),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ShowComponent => "showComponent",
            Self::HideComponent => "hideComponent",
            Self::ChangeText => "changeText",
            Self::ChangeColor => "changeColor",
            Self::SetColorPicker => "setColorPicker",
            Self::SetStyle => "setStyle",
            Self::ShowColorHistory => "showColorHistory",
            Self::ClearColorHistory => "clearColorHistory",
            Self::ApplyHistoryColor => "applyHistoryColor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ShowComponent => "Show a UI component",
            Self::HideComponent => "Hide a UI component",
            Self::ChangeText => "Change a component's text",
            Self::ChangeColor => "Change a component's background color",
            Self::SetColorPicker => "Set the color picker's value",
            Self::SetStyle => "Replace a component's inline style",
            Self::ShowColorHistory => "List the recently used colors",
            Self::ClearColorHistory => "Clear the color history",
            Self::ApplyHistoryColor => "Apply a history color to a component",
        }
    }

    pub fn all() -> &'static [CommandKind] {
        &[
            Self::ShowComponent,
            Self::HideComponent,
            Self::ChangeText,
            Self::ChangeColor,
            Self::SetColorPicker,
            Self::SetStyle,
            Self::ShowColorHistory,
            Self::ClearColorHistory,
            Self::ApplyHistoryColor,
        ]
    }
}

// ── Catalog ──────────────────────────────────────────────────────

/// One taxonomy entry with the JSON schema of its params, fed into the
/// system prompt.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub param_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| empty_object_schema())
}

/// The complete command catalog, in prompt order.
pub fn command_catalog() -> Vec<CommandSpec> {
    CommandKind::all()
        .iter()
        .map(|kind| CommandSpec {
            name: kind.name(),
            description: kind.description(),
            param_schema: match kind {
                CommandKind::ChangeText => schema_value::<ChangeTextParams>(),
                CommandKind::ChangeColor | CommandKind::SetColorPicker => {
                    schema_value::<ChangeColorParams>()
                }
                CommandKind::SetStyle => schema_value::<SetStyleParams>(),
                CommandKind::ApplyHistoryColor => schema_value::<ApplyHistoryColorParams>(),
                _ => empty_object_schema(),
            },
        })
        .collect()
}

// ── Dispatch ─────────────────────────────────────────────────────

/// Terminal status of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Success,
    Failed,
    Error,
}

impl DispatchStatus {
    pub fn color(self) -> StatusColor {
        match self {
            Self::Success => StatusColor::Green,
            Self::Failed => StatusColor::Orange,
            Self::Error => StatusColor::Red,
        }
    }
}

fn typed_params<T: serde::de::DeserializeOwned>(
    envelope: &CommandEnvelope,
    required: &str,
) -> Result<T, AppError> {
    serde_json::from_value(envelope.params.clone()).map_err(|_| AppError::MissingParam {
        param: required.to_string(),
    })
}

/// Validate and execute one envelope. Prints the envelope's description,
/// runs the command, and settles the status indicator exactly once.
pub fn dispatch(state: &SessionState, envelope: &CommandEnvelope) -> DispatchStatus {
    state.say(Sender::Ai, envelope.description.clone());

    let Some(kind) = CommandKind::resolve(&envelope.command) else {
        warn!(command = %envelope.command, "unknown command kind");
        state.say(
            Sender::System,
            format!("❌ unknown command kind: {}", envelope.command),
        );
        state.set_status("execution failed", StatusColor::Orange);
        return DispatchStatus::Failed;
    };

    match execute(state, kind, envelope) {
        Ok(()) => {
            state.set_status("command executed", StatusColor::Green);
            DispatchStatus::Success
        }
        Err(AppError::Execution { message }) => {
            state.say(Sender::System, format!("❌ execution error: {message}"));
            state.set_status("execution error", StatusColor::Red);
            DispatchStatus::Error
        }
        Err(e) => {
            state.say(Sender::System, format!("❌ {e}"));
            state.set_status("execution failed", StatusColor::Orange);
            DispatchStatus::Failed
        }
    }
}

fn execute(state: &SessionState, kind: CommandKind, envelope: &CommandEnvelope) -> Result<(), AppError> {
    match kind {
        CommandKind::ShowComponent => {
            let notice = state.with_registry(|r| mutator::show(r, &envelope.target))?;
            state.say(Sender::System, notice);
            Ok(())
        }
        CommandKind::HideComponent => {
            let notice = state.with_registry(|r| mutator::hide(r, &envelope.target))?;
            state.say(Sender::System, notice);
            Ok(())
        }
        CommandKind::ChangeText => {
            let params: ChangeTextParams = typed_params(envelope, "text")?;
            let notice =
                state.with_registry(|r| mutator::set_text(r, &envelope.target, &params.text))?;
            state.say(Sender::System, notice);
            Ok(())
        }
        CommandKind::ChangeColor => {
            let params: ChangeColorParams = typed_params(envelope, "color")?;
            let color = state
                .with_history(|h| color::parse(&params.color, h))
                .ok_or_else(|| AppError::ColorParse {
                    input: params.color.clone(),
                })?;
            let notice =
                state.with_registry(|r| mutator::set_background(r, &envelope.target, &color))?;
            state.say(Sender::System, notice);
            state.with_history_mut(|h| h.add(color));
            Ok(())
        }
        CommandKind::SetColorPicker => {
            let params: ChangeColorParams = typed_params(envelope, "color")?;
            let color = state
                .with_history(|h| color::parse(&params.color, h))
                .ok_or_else(|| AppError::ColorParse {
                    input: params.color.clone(),
                })?;
            state.with_registry(|r| mutator::set_picker_value(r, &envelope.target, &color))?;
            selection::handle_color_selection(state, color, SelectionSource::AiCommand);
            Ok(())
        }
        CommandKind::SetStyle => {
            let params: SetStyleParams = typed_params(envelope, "style")?;
            let notice =
                state.with_registry(|r| mutator::set_style(r, &envelope.target, &params.style))?;
            state.say(Sender::System, notice);
            Ok(())
        }
        CommandKind::ShowColorHistory => {
            let snapshot = state.with_history(crate::model::ColorHistory::snapshot);
            if snapshot.is_empty() {
                state.say(Sender::System, "📭 color history is empty");
                return Ok(());
            }
            state.say(Sender::System, "🎨 recently used colors:");
            for (i, entry) in snapshot.iter().enumerate() {
                state.say(
                    Sender::System,
                    format!("  {}. {} ({})", i + 1, entry.display_name(), entry.hex()),
                );
            }
            Ok(())
        }
        CommandKind::ClearColorHistory => {
            state.with_history_mut(crate::model::ColorHistory::clear);
            state.say(Sender::System, "✅ color history cleared");
            Ok(())
        }
        CommandKind::ApplyHistoryColor => {
            let params: ApplyHistoryColorParams = typed_params(envelope, "index/target")?;
            let color = state
                .with_history(|h| h.get(params.index))
                .ok_or_else(|| AppError::HistoryIndex {
                    index: params.index,
                    len: state.with_history(crate::model::ColorHistory::len),
                })?;
            let source = format!("history color {}", params.index);
            let notice = state.with_registry(|r| {
                mutator::apply_labeled_background(r, &params.target, &color, &source)
            })?;
            state.say(Sender::System, notice);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::Color;
    use crate::surface;
    use crate::transcript::Sender;

    fn seeded_state() -> SessionState {
        let state = SessionState::new();
        state.with_registry_mut(surface::seed_default);
        state
    }

    fn envelope(command: &str, target: &str, params: Value, description: &str) -> CommandEnvelope {
        CommandEnvelope {
            command: command.to_string(),
            target: target.to_string(),
            params,
            description: description.to_string(),
        }
    }

    fn error_lines(state: &SessionState) -> usize {
        state.with_transcript(|t| {
            t.messages()
                .iter()
                .filter(|m| m.text.starts_with('❌'))
                .count()
        })
    }

    fn widget_style(state: &SessionState, id: &str) -> String {
        state.with_registry(|r| r.lookup(id).unwrap().with(|w| w.style()))
    }

    #[test]
    fn hide_component_end_to_end() {
        let state = seeded_state();
        let status = dispatch(
            &state,
            &envelope("hideComponent", "btn1", serde_json::json!({}), "Hiding btn1"),
        );
        assert_eq!(status, DispatchStatus::Success);
        assert!(!state.with_registry(|r| r.lookup("btn1").unwrap().with(|w| w.is_visible())));
        assert!(state.with_transcript(|t| t.contains("Hiding btn1")));
        assert!(state.with_transcript(|t| t.contains("✅ hidden: btn1")));
        assert_eq!(
            state.with_transcript(|t| t.status().color),
            StatusColor::Green
        );
    }

    #[test]
    fn unknown_command_produces_one_error_and_no_mutation() {
        let state = seeded_state();
        let before = widget_style(&state, "btn1");
        let status = dispatch(
            &state,
            &envelope("executeAction", "btn1", serde_json::json!({}), "doing things"),
        );
        assert_eq!(status, DispatchStatus::Failed);
        assert_eq!(error_lines(&state), 1);
        assert_eq!(widget_style(&state, "btn1"), before);
        assert!(state.with_registry(|r| r.lookup("btn1").unwrap().with(|w| w.is_visible())));
        assert_eq!(
            state.with_transcript(|t| t.status().color),
            StatusColor::Orange
        );
    }

    #[test]
    fn change_text_without_param_fails_cleanly() {
        let state = seeded_state();
        let status = dispatch(
            &state,
            &envelope("changeText", "btn1", serde_json::json!({}), "renaming"),
        );
        assert_eq!(status, DispatchStatus::Failed);
        assert!(state.with_transcript(|t| t.contains("missing parameter: text")));
    }

    #[test]
    fn change_color_parses_and_records_history() {
        let state = seeded_state();
        let status = dispatch(
            &state,
            &envelope(
                "changeColor",
                "btn2",
                serde_json::json!({ "color": "red" }),
                "painting btn2 red",
            ),
        );
        assert_eq!(status, DispatchStatus::Success);
        assert!(widget_style(&state, "btn2").contains("background-color: #FF0000;"));
        assert_eq!(state.with_history(|h| h.get(1)).unwrap().hex(), "#FF0000");
    }

    #[test]
    fn change_color_rejects_unknown_literal() {
        let state = seeded_state();
        let status = dispatch(
            &state,
            &envelope(
                "changeColor",
                "btn2",
                serde_json::json!({ "color": "blurple" }),
                "painting",
            ),
        );
        assert_eq!(status, DispatchStatus::Failed);
        assert!(state.with_transcript(|t| t.contains("cannot recognize color: blurple")));
        assert!(state.with_history(crate::model::ColorHistory::is_empty));
    }

    #[test]
    fn set_color_picker_runs_the_selection_pipeline() {
        let state = seeded_state();
        let status = dispatch(
            &state,
            &envelope(
                "setColorPicker",
                "colorPicker",
                serde_json::json!({ "color": "blue" }),
                "set picker blue",
            ),
        );
        assert_eq!(status, DispatchStatus::Success);

        let picker = state
            .with_registry(|r| r.lookup("colorPicker").unwrap().with(|w| w.picker_value()))
            .unwrap();
        assert_eq!(picker.hex(), "#0000FF");
        assert_eq!(state.with_history(|h| h.get(1)).unwrap().hex(), "#0000FF");

        let btn1 = widget_style(&state, "btn1");
        assert!(btn1.contains("background-color: #0000FF;"));
        assert!(btn1.contains("text-fill: white;"));
        assert!(widget_style(&state, "titleLabel").contains("text-fill: #0000FF;"));
        assert!(state.with_transcript(|t| t.contains("selected color: 蓝色 (#0000FF)")));
    }

    #[test]
    fn apply_history_color_targets_params_target() {
        let state = seeded_state();
        state.with_history_mut(|h| h.add(Color::from_u8(0xFF, 0, 0)));
        let status = dispatch(
            &state,
            &envelope(
                "applyHistoryColor",
                "btn2",
                serde_json::json!({ "index": 1, "target": "btn2" }),
                "applying newest color",
            ),
        );
        assert_eq!(status, DispatchStatus::Success);
        let style = widget_style(&state, "btn2");
        assert!(style.contains("background-color: #FF0000;"));
        assert!(style.contains("text-fill: white;"));
    }

    #[test]
    fn apply_history_color_after_clear_reports_missing_entry() {
        let state = seeded_state();
        state.with_history_mut(|h| h.add(Color::from_u8(0xFF, 0, 0)));
        dispatch(
            &state,
            &envelope("clearColorHistory", "", serde_json::json!({}), "cleared"),
        );
        assert!(state.with_history(crate::model::ColorHistory::is_empty));

        let status = dispatch(
            &state,
            &envelope(
                "applyHistoryColor",
                "btn2",
                serde_json::json!({ "index": 1, "target": "btn2" }),
                "applying",
            ),
        );
        assert_eq!(status, DispatchStatus::Failed);
        assert!(state.with_transcript(|t| t.contains("history color 1 not found")));
    }

    #[test]
    fn show_color_history_when_empty() {
        let state = seeded_state();
        let status = dispatch(
            &state,
            &envelope("showColorHistory", "", serde_json::json!({}), "listing"),
        );
        assert_eq!(status, DispatchStatus::Success);
        assert!(state.with_transcript(|t| t.contains("📭 color history is empty")));
        assert_eq!(
            state.with_transcript(|t| t.status().color),
            StatusColor::Green
        );
    }

    #[test]
    fn show_color_history_lists_newest_first() {
        let state = seeded_state();
        state.with_history_mut(|h| {
            h.add(Color::from_u8(0xFF, 0, 0));
            h.add(Color::from_u8(0, 0, 0xFF));
        });
        dispatch(
            &state,
            &envelope("showColorHistory", "", serde_json::json!({}), "listing"),
        );
        assert!(state.with_transcript(|t| t.contains("1. 蓝色 (#0000FF)")));
        assert!(state.with_transcript(|t| t.contains("2. 红色 (#FF0000)")));
    }

    #[test]
    fn description_precedes_mutation_notice() {
        let state = seeded_state();
        dispatch(
            &state,
            &envelope("hideComponent", "btn1", serde_json::json!({}), "Hiding btn1"),
        );
        let order: Vec<(Sender, String)> = state.with_transcript(|t| {
            t.messages()
                .iter()
                .map(|m| (m.sender, m.text.clone()))
                .collect()
        });
        let desc_pos = order.iter().position(|(_, t)| t == "Hiding btn1").unwrap();
        let notice_pos = order.iter().position(|(_, t)| t.contains("hidden")).unwrap();
        assert!(desc_pos < notice_pos);
        assert_eq!(order[desc_pos].0, Sender::Ai);
    }

    #[test]
    fn catalog_covers_the_whole_taxonomy() {
        let catalog = command_catalog();
        assert_eq!(catalog.len(), CommandKind::all().len());
        let change_color = catalog
            .iter()
            .find(|spec| spec.name == "changeColor")
            .unwrap();
        assert!(change_color.param_schema.get("properties").is_some());
    }

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(
            CommandKind::resolve("HIDECOMPONENT"),
            Some(CommandKind::HideComponent)
        );
        assert_eq!(
            CommandKind::resolve("ApplyHistoryColor"),
            Some(CommandKind::ApplyHistoryColor)
        );
        assert_eq!(CommandKind::resolve("executeAction"), None);
    }
}
