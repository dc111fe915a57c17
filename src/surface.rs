//! The Widget Surface: the minimal interface the engine needs from whatever
//! toolkit renders the widgets. The real toolkit (native, browser, TUI) plugs
//! in behind [`Widget`] and [`UiScheduler`]; the headless implementation here
//! backs the terminal front end and the test suite.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::model::Color;
use crate::registry::{Capability, CapabilitySet};

// ── Widget trait ─────────────────────────────────────────────────

/// One live widget, described by the operations it supports rather than by
/// its class identity. Mutations are only invoked for capabilities the
/// widget declared at registration, so the accessors default to no-ops.
pub trait Widget: Send {
    /// Capability set captured by the registry at registration time.
    fn capabilities(&self) -> CapabilitySet;

    fn is_visible(&self) -> bool;

    /// Sets visibility and layout inclusion together: a hidden widget also
    /// gives up its layout slot.
    fn set_visible(&mut self, visible: bool);

    fn text(&self) -> Option<String> {
        None
    }

    fn set_text(&mut self, _text: &str) {}

    fn style(&self) -> String;

    fn set_style(&mut self, style: &str);

    fn picker_value(&self) -> Option<Color> {
        None
    }

    fn set_picker_value(&mut self, _value: Color) {}
}

// ── UI scheduling ────────────────────────────────────────────────

pub type UiTask = Box<dyn FnOnce() + Send>;

/// Marshals work onto the UI thread. Widget reads and mutations must only
/// happen in tasks submitted here; network I/O must never run here.
pub trait UiScheduler: Send + Sync {
    fn run_on_ui(&self, task: UiTask);
}

/// Runs tasks immediately on the calling thread. Suitable for tests and for
/// hosts that are themselves single-threaded.
pub struct InlineScheduler;

impl UiScheduler for InlineScheduler {
    fn run_on_ui(&self, task: UiTask) {
        task();
    }
}

/// Queue-backed scheduler: tasks accumulate until the owning thread drains
/// them. The terminal front end drains between prompt iterations.
pub struct QueueScheduler {
    tx: mpsc::UnboundedSender<UiTask>,
}

impl UiScheduler for QueueScheduler {
    fn run_on_ui(&self, task: UiTask) {
        // A closed queue means the UI loop is gone; dropping the task is the
        // required no-op for late completions.
        let _ = self.tx.send(task);
    }
}

/// Receiving half of a [`QueueScheduler`]; owned by the UI loop.
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<UiTask>,
}

impl UiQueue {
    /// Run every queued task, returning how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

pub fn ui_queue() -> (Arc<QueueScheduler>, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(QueueScheduler { tx }), UiQueue { rx })
}

// ── Headless widgets ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetKind {
    Button,
    Label,
    TextField,
    TextArea,
    Panel,
    ColorPicker,
}

/// In-memory widget used by the terminal front end and the tests. Records
/// exactly the state the mutation contract touches.
pub struct HeadlessWidget {
    kind: WidgetKind,
    visible: bool,
    in_layout: bool,
    text: Option<String>,
    style: String,
    picker: Option<Color>,
}

impl HeadlessWidget {
    fn new(kind: WidgetKind, text: Option<&str>) -> Self {
        Self {
            kind,
            visible: true,
            in_layout: true,
            text: text.map(str::to_string),
            style: String::new(),
            picker: matches!(kind, WidgetKind::ColorPicker).then_some(Color::WHITE),
        }
    }

    pub fn button(text: &str) -> Self {
        Self::new(WidgetKind::Button, Some(text))
    }

    pub fn label(text: &str) -> Self {
        Self::new(WidgetKind::Label, Some(text))
    }

    pub fn text_field(text: &str) -> Self {
        Self::new(WidgetKind::TextField, Some(text))
    }

    pub fn text_area() -> Self {
        Self::new(WidgetKind::TextArea, Some(""))
    }

    pub fn panel() -> Self {
        Self::new(WidgetKind::Panel, None)
    }

    pub fn color_picker() -> Self {
        Self::new(WidgetKind::ColorPicker, None)
    }

    pub fn in_layout(&self) -> bool {
        self.in_layout
    }
}

impl Widget for HeadlessWidget {
    fn capabilities(&self) -> CapabilitySet {
        match self.kind {
            WidgetKind::Button | WidgetKind::Label | WidgetKind::TextField | WidgetKind::TextArea => {
                CapabilitySet::of(&[
                    Capability::Visibility,
                    Capability::Text,
                    Capability::BackgroundColor,
                    Capability::ForegroundColor,
                    Capability::Style,
                ])
            }
            WidgetKind::Panel => CapabilitySet::of(&[
                Capability::Visibility,
                Capability::BackgroundColor,
                Capability::Style,
            ]),
            WidgetKind::ColorPicker => CapabilitySet::of(&[
                Capability::Visibility,
                Capability::Style,
                Capability::ColorPickerValue,
            ]),
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.in_layout = visible;
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        if self.text.is_some() {
            self.text = Some(text.to_string());
        }
    }

    fn style(&self) -> String {
        self.style.clone()
    }

    fn set_style(&mut self, style: &str) {
        self.style = style.to_string();
    }

    fn picker_value(&self) -> Option<Color> {
        self.picker
    }

    fn set_picker_value(&mut self, value: Color) {
        if self.picker.is_some() {
            self.picker = Some(value);
        }
    }
}

/// Seed the registry with the default widget set the system prompt
/// advertises.
pub fn seed_default(registry: &mut crate::registry::WidgetRegistry) {
    registry.register("btn1", HeadlessWidget::button("Button 1"));
    registry.register("btn2", HeadlessWidget::button("Button 2"));
    registry.register("sampleText", HeadlessWidget::text_field("sample text"));
    registry.register("colorPicker", HeadlessWidget::color_picker());
    registry.register("titleLabel", HeadlessWidget::label("AI Control Panel"));
    registry.register("chatArea", HeadlessWidget::text_area());
    registry.register("controlPanel", HeadlessWidget::panel());
    registry.register("statusLabel", HeadlessWidget::label("initializing"));
    registry.register("commandInput", HeadlessWidget::text_field(""));
    registry.register("executeButton", HeadlessWidget::button("🚀 Run"));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn hiding_removes_from_layout() {
        let mut btn = HeadlessWidget::button("b");
        btn.set_visible(false);
        assert!(!btn.is_visible());
        assert!(!btn.in_layout());
        btn.set_visible(true);
        assert!(btn.is_visible());
        assert!(btn.in_layout());
    }

    #[test]
    fn panel_has_no_text_capability() {
        let panel = HeadlessWidget::panel();
        assert!(!panel.capabilities().contains(Capability::Text));
        assert!(panel.capabilities().contains(Capability::BackgroundColor));
    }

    #[test]
    fn picker_declares_picker_capability_only_on_pickers() {
        let picker = HeadlessWidget::color_picker();
        assert!(picker.capabilities().contains(Capability::ColorPickerValue));
        let btn = HeadlessWidget::button("b");
        assert!(!btn.capabilities().contains(Capability::ColorPickerValue));
    }

    #[test]
    fn queue_scheduler_defers_until_drained() {
        let (scheduler, mut queue) = ui_queue();
        let flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let set = flag.clone();
        scheduler.run_on_ui(Box::new(move || {
            set.store(true, std::sync::atomic::Ordering::SeqCst);
        }));
        assert!(!flag.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(queue.drain(), 1);
        assert!(flag.load(std::sync::atomic::Ordering::SeqCst));
    }
}
