//! Inline-style merging. Background changes must not clobber unrelated
//! declarations (padding, sizing), so the style string is parsed into
//! declarations, color-related properties are filtered out, and the result
//! is re-joined behind the new color declarations.

use crate::model::Color;

/// Properties owned by the color pipeline. A background update drops these
/// from the existing style before prepending its own declarations.
pub const COLOR_PROPERTIES: [&str; 3] = ["background-color", "text-fill", "border-color"];

/// Split an inline style into `(property, value)` declarations. Segments
/// without a `:` are dropped.
fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|segment| {
            let (property, value) = segment.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some((property.to_string(), value.to_string()))
        })
        .collect()
}

/// Remove every declaration whose property appears in `props`, returning the
/// re-joined residue.
pub fn strip_properties(style: &str, props: &[&str]) -> String {
    let kept: Vec<String> = declarations(style)
        .into_iter()
        .filter(|(property, _)| !props.contains(&property.as_str()))
        .map(|(property, value)| format!("{property}: {value};"))
        .collect();
    kept.join(" ")
}

/// Replace the background of an inline style, preserving everything that is
/// not a color declaration. `text_fill` adds a contrasting foreground for
/// text-bearing widgets.
pub fn merge_background(style: &str, background: &Color, text_fill: Option<&str>) -> String {
    let mut merged = format!("background-color: {};", background.hex());
    if let Some(fill) = text_fill {
        merged.push_str(&format!(" text-fill: {fill};"));
    }
    let residue = strip_properties(style, &COLOR_PROPERTIES);
    if !residue.is_empty() {
        merged.push(' ');
        merged.push_str(&residue);
    }
    merged
}

/// Replace only the foreground (`text-fill`) of an inline style.
pub fn merge_foreground(style: &str, foreground: &Color) -> String {
    let mut merged = format!("text-fill: {};", foreground.hex());
    let residue = strip_properties(style, &["text-fill"]);
    if !residue.is_empty() {
        merged.push(' ');
        merged.push_str(&residue);
    }
    merged
}
