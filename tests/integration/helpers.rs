use chatview::host::{CallMode, Host, HostSettings, StaticHost};
use chatview::theme::{BasicAdapter, Theme, ThemeUtil};
use chatview::view::{ChatView, SimulatedSurface};
use serde_json::{Value, json};
use std::rc::Rc;
use std::time::Instant;

/// A theme on a headless surface, answered by an in-process host.
pub fn sync_theme(settings: HostSettings, width: u16, height: u16) -> (Theme, SimulatedSurface) {
    theme_with_host(CallMode::Synchronous, Rc::new(StaticHost::new(settings)), width, height)
}

pub fn theme_with_host(
    mode: CallMode,
    host: Rc<dyn Host>,
    width: u16,
    height: u16,
) -> (Theme, SimulatedSurface) {
    let surface = SimulatedSurface::new(width, height);
    let util = ThemeUtil::new(mode, host);
    let view = ChatView::new(Box::new(surface.clone()), true, Instant::now());
    (Theme::new(view, util, BasicAdapter::factory(None)), surface)
}

/// Host settings with a 24h clock and a fixed informational color.
pub fn settings() -> HostSettings {
    let mut settings = HostSettings::default();
    settings.options.insert("options.ui.look.chat.time-format".to_owned(), json!("HH:mm"));
    settings
        .colors
        .insert("options.ui.look.colors.messages.informational".to_owned(), "#808080".to_owned());
    settings
}

pub fn message(sender: &str, text: &str, time: &str) -> Value {
    json!({"type": "message", "sender": sender, "message": text, "time": time})
}

pub fn body(theme: &Theme) -> String {
    let view = theme.view();
    view.document().inner_markup(view.root())
}
