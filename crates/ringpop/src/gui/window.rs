use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use ringmenu::Point;

/// Fallback used before the surface is mapped on a monitor.
pub const DEFAULT_MONITOR_HEIGHT: f64 = 1440.0;

pub fn get_cursor_position(window: &gtk::ApplicationWindow) -> Option<Point> {
    gdk::Display::default()
        .and_then(|d| d.default_seat())
        .and_then(|s| s.pointer())
        .zip(window.surface())
        .and_then(|(p, s)| s.device_position(&p))
        .map(|(x, y, _)| Point::new(x, y))
}

/// Full-screen transparent overlay that grabs the keyboard while shown.
pub fn init_layer_shell(window: &gtk::ApplicationWindow) {
    window.init_layer_shell();
    window.set_layer(Layer::Overlay);
    window.set_namespace(Some("ringpop"));
    window.set_exclusive_zone(-1);
    for edge in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
        window.set_anchor(edge, true);
    }
    window.set_keyboard_mode(KeyboardMode::Exclusive);
}

pub fn current_monitor(window: &gtk::ApplicationWindow) -> Option<gdk::Monitor> {
    let display = gdk::Display::default()?;
    let surface = window.surface()?;
    display.monitor_at_surface(&surface)
}

pub fn monitor_height(window: &gtk::ApplicationWindow) -> f64 {
    current_monitor(window)
        .map(|m| m.geometry().height() as f64)
        .filter(|h| *h > 0.0)
        .unwrap_or(DEFAULT_MONITOR_HEIGHT)
}

/// Window-local centre, used when the pointer position is unknown.
pub fn window_center(window: &gtk::ApplicationWindow) -> Point {
    Point::new(window.width() as f64 / 2.0, window.height() as f64 / 2.0)
}
