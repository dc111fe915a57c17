//! Typed mutations against registered widgets. Every operation validates the
//! target's capability set before touching the widget and returns the
//! transcript notice for the dispatcher to print.

use crate::error::AppError;
use crate::model::Color;
use crate::registry::{Capability, WidgetHandle, WidgetRegistry};
use crate::style;

fn handle_for<'r>(registry: &'r WidgetRegistry, id: &str) -> Result<&'r WidgetHandle, AppError> {
    registry.lookup(id).ok_or_else(|| AppError::WidgetNotFound {
        id: id.to_string(),
    })
}

fn require(handle: &WidgetHandle, id: &str, cap: Capability) -> Result<(), AppError> {
    if handle.has(cap) {
        Ok(())
    } else {
        Err(AppError::CapabilityMismatch {
            id: id.to_string(),
            needed: cap,
        })
    }
}

/// Make a widget visible and part of the layout again. Idempotent.
pub fn show(registry: &WidgetRegistry, id: &str) -> Result<String, AppError> {
    let handle = handle_for(registry, id)?;
    handle.with_mut(|w| w.set_visible(true));
    Ok(format!("✅ shown: {id}"))
}

/// Hide a widget and release its layout slot. Idempotent.
pub fn hide(registry: &WidgetRegistry, id: &str) -> Result<String, AppError> {
    let handle = handle_for(registry, id)?;
    handle.with_mut(|w| w.set_visible(false));
    Ok(format!("✅ hidden: {id}"))
}

pub fn set_text(registry: &WidgetRegistry, id: &str, text: &str) -> Result<String, AppError> {
    let handle = handle_for(registry, id)?;
    require(handle, id, Capability::Text)?;
    handle.with_mut(|w| w.set_text(text));
    Ok(format!("✅ text updated: {id} → {text}"))
}

/// Update a widget's background, preserving its non-color inline styling.
/// Text-bearing widgets also get a contrasting foreground.
pub fn set_background(
    registry: &WidgetRegistry,
    id: &str,
    color: &Color,
) -> Result<String, AppError> {
    merge_background(registry, id, color)?;
    Ok(format!("✅ color updated: {id} → {}", color.hex()))
}

/// Background update on behalf of a named source (history re-application,
/// auto-apply). The notice names the source and the widget.
pub fn apply_labeled_background(
    registry: &WidgetRegistry,
    id: &str,
    color: &Color,
    source: &str,
) -> Result<String, AppError> {
    merge_background(registry, id, color)?;
    Ok(format!(
        "✅ applied {source} to {} ({})",
        registry.display_name(id),
        color.display_name()
    ))
}

fn merge_background(registry: &WidgetRegistry, id: &str, color: &Color) -> Result<(), AppError> {
    let handle = handle_for(registry, id)?;
    require(handle, id, Capability::BackgroundColor)?;
    let text_fill = handle.has(Capability::Text).then(|| color.contrast_text());
    handle.with_mut(|w| {
        let merged = style::merge_background(&w.style(), color, text_fill);
        w.set_style(&merged);
    });
    Ok(())
}

/// Update only the foreground (text) color, keeping the rest of the style.
pub fn set_foreground(registry: &WidgetRegistry, id: &str, color: &Color) -> Result<(), AppError> {
    let handle = handle_for(registry, id)?;
    require(handle, id, Capability::ForegroundColor)?;
    handle.with_mut(|w| {
        let merged = style::merge_foreground(&w.style(), color);
        w.set_style(&merged);
    });
    Ok(())
}

/// Replace the widget's inline style verbatim.
pub fn set_style(registry: &WidgetRegistry, id: &str, new_style: &str) -> Result<String, AppError> {
    let handle = handle_for(registry, id)?;
    handle.with_mut(|w| w.set_style(new_style));
    Ok(format!("✅ style updated: {id}"))
}

/// Set a color picker's current value. The caller routes the observer chain
/// (history, transcript, auto-apply) through the selection pipeline.
pub fn set_picker_value(
    registry: &WidgetRegistry,
    id: &str,
    color: &Color,
) -> Result<(), AppError> {
    let handle = handle_for(registry, id)?;
    require(handle, id, Capability::ColorPickerValue)?;
    handle.with_mut(|w| w.set_picker_value(*color));
    Ok(())
}
