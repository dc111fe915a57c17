//! Widget registry: the name → widget mapping the dispatcher mutates
//! through. Widgets are described by capability sets captured at
//! registration, not by their concrete type.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::surface::Widget;

// ── Capabilities ─────────────────────────────────────────────────

/// One mutation operation a widget can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Capability {
    Visibility,
    Text,
    BackgroundColor,
    ForegroundColor,
    Style,
    ColorPickerValue,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Capability::Visibility => 1,
            Capability::Text => 1 << 1,
            Capability::BackgroundColor => 1 << 2,
            Capability::ForegroundColor => 1 << 3,
            Capability::Style => 1 << 4,
            Capability::ColorPickerValue => 1 << 5,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Visibility => "visibility",
            Capability::Text => "text",
            Capability::BackgroundColor => "background-color",
            Capability::ForegroundColor => "foreground-color",
            Capability::Style => "style",
            Capability::ColorPickerValue => "color-picker-value",
        };
        f.write_str(name)
    }
}

/// The set of operations one widget supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn of(caps: &[Capability]) -> Self {
        let mut bits = 0;
        for cap in caps {
            bits |= cap.bit();
        }
        Self { bits }
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.bits & cap.bit() != 0
    }
}

// ── Handles and the registry ─────────────────────────────────────

/// A registered widget: shared access to the live widget plus its
/// capability set, discovered once at registration.
#[derive(Clone)]
pub struct WidgetHandle {
    widget: Arc<Mutex<dyn Widget>>,
    caps: CapabilitySet,
}

impl WidgetHandle {
    pub fn new(widget: impl Widget + 'static) -> Self {
        let caps = widget.capabilities();
        Self {
            widget: Arc::new(Mutex::new(widget)),
            caps,
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.caps
    }

    pub fn has(&self, cap: Capability) -> bool {
        self.caps.contains(cap)
    }

    /// Read access to the widget for the duration of `f`.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&dyn Widget) -> R,
    {
        let guard = self.widget.lock();
        f(&*guard)
    }

    /// Mutating access to the widget for the duration of `f`.
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut dyn Widget) -> R,
    {
        let mut guard = self.widget.lock();
        f(&mut *guard)
    }
}

/// Identifier → handle map. Identifiers are case-sensitive, registered once
/// at session start, never removed or reassigned. Insertion order is the
/// order the system prompt lists the identifiers in.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: IndexMap<String, WidgetHandle>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget under `id`. Re-registration is refused: entries are
    /// never reassigned for the lifetime of the session.
    pub fn register(&mut self, id: &str, widget: impl Widget + 'static) {
        if self.widgets.contains_key(id) {
            warn!(id, "ignoring re-registration of widget");
            return;
        }
        debug!(id, "registered widget");
        self.widgets.insert(id.to_string(), WidgetHandle::new(widget));
    }

    pub fn lookup(&self, id: &str) -> Option<&WidgetHandle> {
        self.widgets.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Human-readable label for transcript messages: the widget's current
    /// text when it has one, otherwise the identifier.
    pub fn display_name(&self, id: &str) -> String {
        self.lookup(id)
            .and_then(|handle| handle.with(|w| w.text().filter(|t| !t.is_empty())))
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::surface::HeadlessWidget;

    #[test]
    fn capability_set_contains_exactly_what_it_was_built_from() {
        let set = CapabilitySet::of(&[Capability::Text, Capability::Style]);
        assert!(set.contains(Capability::Text));
        assert!(set.contains(Capability::Style));
        assert!(!set.contains(Capability::ColorPickerValue));
        assert!(!CapabilitySet::empty().contains(Capability::Visibility));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut registry = WidgetRegistry::new();
        registry.register("btn1", HeadlessWidget::button("Button 1"));
        assert!(registry.lookup("btn1").is_some());
        assert!(registry.lookup("Btn1").is_none());
    }

    #[test]
    fn re_registration_keeps_the_original() {
        let mut registry = WidgetRegistry::new();
        registry.register("btn1", HeadlessWidget::button("first"));
        registry.register("btn1", HeadlessWidget::button("second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.display_name("btn1"), "first");
    }

    #[test]
    fn ids_keep_registration_order() {
        let mut registry = WidgetRegistry::new();
        crate::surface::seed_default(&mut registry);
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(
            ids,
            vec![
                "btn1",
                "btn2",
                "sampleText",
                "colorPicker",
                "titleLabel",
                "chatArea",
                "controlPanel",
                "statusLabel",
                "commandInput",
                "executeButton",
            ]
        );
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let mut registry = WidgetRegistry::new();
        registry.register("controlPanel", HeadlessWidget::panel());
        assert_eq!(registry.display_name("controlPanel"), "controlPanel");
        assert_eq!(registry.display_name("missing"), "missing");
    }
}
