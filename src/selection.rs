//! The color-selection pipeline. Manual picker events, preset buttons,
//! history-swatch clicks, and `setColorPicker` commands all funnel through
//! one entry point, so every originating surface produces the same side
//! effects: history entry, transcript notice, auto-applied colors.

use tracing::warn;

use crate::error::AppError;
use crate::model::{color, Color};
use crate::mutator;
use crate::state::SessionState;
use crate::transcript::Sender;

/// Widgets a selection propagates to beyond the picker itself.
const AUTO_APPLY_BACKGROUND: &str = "btn1";
const AUTO_APPLY_FOREGROUND: &str = "titleLabel";

/// Where a color selection originated. The label appears in the transcript
/// notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    ManualPick,
    AiCommand,
    PresetButton,
    HistorySwatch,
}

impl SelectionSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::ManualPick => "manual pick",
            Self::AiCommand => "AI command",
            Self::PresetButton => "preset button",
            Self::HistorySwatch => "history swatch",
        }
    }
}

/// Run the full selection pipeline: record the color, announce it, and
/// apply it to the auto-apply set.
pub fn handle_color_selection(state: &SessionState, color: Color, source: SelectionSource) {
    state.with_history_mut(|h| h.add(color));

    state.say(
        Sender::System,
        format!(
            "{} selected color: {} ({})",
            source.label(),
            color.display_name(),
            color.hex()
        ),
    );

    // Auto-apply failures are not user errors; the widgets may simply not be
    // part of this surface.
    let applied = state.with_registry(|r| mutator::set_background(r, AUTO_APPLY_BACKGROUND, &color));
    if let Err(e) = applied {
        warn!(error = %e, "auto-apply background skipped");
    }
    let applied = state.with_registry(|r| mutator::set_foreground(r, AUTO_APPLY_FOREGROUND, &color));
    if let Err(e) = applied {
        warn!(error = %e, "auto-apply foreground skipped");
    }
}

/// Preset-button entry point: resolve the preset literal, move the picker,
/// run the pipeline.
pub fn apply_preset(state: &SessionState, literal: &str) -> Result<(), AppError> {
    let color = state
        .with_history(|h| color::parse(literal, h))
        .ok_or_else(|| AppError::ColorParse {
            input: literal.to_string(),
        })?;
    move_picker(state, color);
    handle_color_selection(state, color, SelectionSource::PresetButton);
    Ok(())
}

/// History-swatch entry point: re-select the color at the given 1-based
/// index.
pub fn apply_swatch(state: &SessionState, index: usize) -> Result<(), AppError> {
    let color = state
        .with_history(|h| h.get(index))
        .ok_or_else(|| AppError::HistoryIndex {
            index,
            len: state.with_history(crate::model::ColorHistory::len),
        })?;
    move_picker(state, color);
    handle_color_selection(state, color, SelectionSource::HistorySwatch);
    Ok(())
}

fn move_picker(state: &SessionState, color: Color) {
    let moved = state.with_registry(|r| mutator::set_picker_value(r, "colorPicker", &color));
    if let Err(e) = moved {
        warn!(error = %e, "picker not present on this surface");
    }
}

/// Tooltip text for a history swatch.
pub fn swatch_tooltip(color: &Color) -> String {
    format!(
        "color: {}\nhex: {}\nclick to apply",
        color.display_name(),
        color.hex()
    )
}
