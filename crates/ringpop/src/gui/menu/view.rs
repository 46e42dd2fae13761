use super::model::State;
use super::{
    CENTER_CIRCLE_RADIUS, ICON_INACTIVE_ALPHA, ICON_SIZE, LABEL_FONT_SIZE, SLOT_FILL, SLOT_RADIUS,
    TRACK_WIDTH,
};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use ringmenu::{Glyph, ItemView, Point, RingLayout};
use std::f64::consts::{PI, TAU};

struct ItemRenderer<'a> {
    view: &'a ItemView<'a>,
    center: Point,
    radius: f64,
    scale: f64,
    state: SlotState,
    pixbuf: Option<&'a Pixbuf>,
}

impl ItemRenderer<'_> {
    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_circle(cr, colors)?;
        match (self.view.glyph, self.pixbuf) {
            (Glyph::Icon(_), Some(pixbuf)) => self.draw_icon(cr, pixbuf),
            (glyph, _) => self.draw_text(cr, &glyph.to_string()),
        }
    }

    fn draw_circle(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        set_color(cr, self.state.color(colors));
        cr.arc(self.center.x, self.center.y, self.radius, 0.0, 2.0 * PI);
        cr.fill()
    }

    fn draw_icon(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        let icon_scale = (self.radius * 2.0 * 0.75) / ICON_SIZE as f64;
        let (iw, ih) = (
            pixbuf.width() as f64 * icon_scale,
            pixbuf.height() as f64 * icon_scale,
        );

        cr.save()?;
        cr.translate(self.center.x - iw / 2.0, self.center.y - ih / 2.0);
        cr.scale(icon_scale, icon_scale);
        cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        if self.view.highlighted {
            cr.paint()?;
        } else {
            cr.paint_with_alpha(ICON_INACTIVE_ALPHA)?;
        }
        cr.restore()
    }

    fn draw_text(&self, cr: &Context, text: &str) -> Result<(), cairo::Error> {
        cr.set_source_rgb(1.0, 1.0, 1.0);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(LABEL_FONT_SIZE * self.scale);
        if let Ok(ext) = cr.text_extents(text) {
            cr.move_to(
                self.center.x - ext.width() / 2.0 - ext.x_bearing(),
                self.center.y + ext.height() / 2.0,
            );
            cr.show_text(text)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Highlighted,
    Idle,
    /// Nothing happens when picked.
    Inert,
}

impl SlotState {
    fn resolve(highlighted: bool, has_action: bool) -> Self {
        if highlighted {
            Self::Highlighted
        } else if has_action {
            Self::Idle
        } else {
            Self::Inert
        }
    }

    fn color(&self, colors: &ThemeColors) -> Srgba<f64> {
        match self {
            Self::Highlighted => colors.highlighted,
            Self::Idle => colors.idle,
            Self::Inert => colors.inert,
        }
    }
}

/// Disc radius in menu units: full size unless the nearest neighbour is closer.
fn slot_radius(layout: &RingLayout, item: usize) -> f64 {
    let n = layout.len();
    let before = layout.gap((item + n - 1) % n).unwrap_or(TAU);
    let after = layout.gap(item).unwrap_or(TAU);
    let tightest = before.min(after).min(PI);
    let room = layout.radius() * (tightest / 2.0).sin() * SLOT_FILL;
    SLOT_RADIUS.min(room).max(SLOT_RADIUS * 0.25)
}

pub fn draw(cr: &Context, state: &State, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let Some(session) = state.menu.session() else {
        return Ok(());
    };
    let scale = state.scale_factor;

    draw_center_circle(cr, state, colors)?;

    for layout in session.layouts().iter().filter(|l| !l.is_empty()) {
        set_color(cr, colors.track);
        cr.set_line_width(TRACK_WIDTH * scale);
        cr.arc(state.center.x, state.center.y, layout.radius() * scale, 0.0, TAU);
        cr.stroke()?;
    }

    for view in state.menu.item_views() {
        let Some(layout) = session.layouts().get(view.item.ring) else {
            continue;
        };
        let has_action = state.menu.item(view.item).is_some_and(|i| i.has_action());
        let pixbuf = match view.glyph {
            Glyph::Icon(name) => state.pixbufs.get(name),
            Glyph::Text(_) => None,
        };

        ItemRenderer {
            view: &view,
            center: state.to_screen(view.position()),
            radius: slot_radius(layout, view.item.item) * scale,
            scale,
            state: SlotState::resolve(view.highlighted, has_action),
            pixbuf,
        }
        .draw(cr, colors)?;
    }
    Ok(())
}

fn draw_center_circle(
    cr: &Context,
    state: &State,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.center_circle);
    cr.arc(
        state.center.x,
        state.center.y,
        CENTER_CIRCLE_RADIUS * state.scale_factor,
        0.0,
        2.0 * PI,
    );
    cr.fill()
}

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}
