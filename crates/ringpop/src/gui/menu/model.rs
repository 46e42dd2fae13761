use crate::config::{Config, ConfigError, ItemConfig, RingConfig, SlotConfig, SpringConfig};
use crate::gui::menu::{ICON_SIZE, PRIMARY_BUTTON, REFERENCE_HEIGHT, icons};
use gdk_pixbuf::Pixbuf;
use ringmenu::{
    Glyph, IconName, Item, Menu, MenuError, Point, PointerEvent, Ring, SessionOutcome, Spring,
};
use std::collections::HashMap;

/// Builds the menu described by `config`, innermost ring first.
pub fn build_menu(config: &Config) -> Result<Menu, ConfigError> {
    let mut menu = Menu::new();
    menu.set_dead_zone(config.menu.dead_zone);
    menu.set_ring_spacing(config.menu.ring_spacing)
        .map_err(ConfigError::Settings)?;

    for (index, ring_cfg) in config.rings.iter().enumerate() {
        let default_radius = config.menu.first_radius + index as f64 * config.menu.ring_spacing;
        let ring = build_ring(index, ring_cfg, default_radius)?;
        menu.add_ring(ring)
            .map_err(|source| ConfigError::Menu { ring: index, source })?;
    }

    Ok(menu)
}

fn build_ring(index: usize, cfg: &RingConfig, default_radius: f64) -> Result<Ring, ConfigError> {
    let wrap = |source: MenuError| ConfigError::Menu { ring: index, source };

    let mut ring = Ring::new(cfg.radius.unwrap_or(default_radius));
    for (slot, slot_cfg) in cfg.slots.iter().enumerate() {
        match slot_cfg {
            SlotConfig::Spring(spring) => {
                ring.add_spring(build_spring(spring).map_err(wrap)?);
            }
            SlotConfig::Item(item) => {
                let item = build_item(item).ok_or(ConfigError::EmptyItem { ring: index, slot })?;
                ring.add_item(item);
            }
        }
    }

    if let Some(heading) = cfg.gravity {
        ring.set_gravity_angle(heading.radians()).map_err(wrap)?;
    }
    for group in &cfg.groups {
        ring.add_gravity_group(group.toward.radians(), group.start..group.start + group.count)
            .map_err(wrap)?;
    }

    Ok(ring)
}

fn build_spring(cfg: &SpringConfig) -> Result<Spring, MenuError> {
    let spring = Spring::with_elasticity(cfg.spring)?;
    match cfg.rest {
        Some(degrees) => spring.with_rest_length(degrees.to_radians()),
        None => Ok(spring),
    }
}

fn build_item(cfg: &ItemConfig) -> Option<Item> {
    let glyph = match (&cfg.icon, &cfg.label) {
        (Some(icon), _) => Glyph::Icon(icon.clone()),
        (None, Some(label)) => Glyph::Text(label.clone()),
        (None, None) => return None,
    };

    let mut item = Item::new(glyph).tag(cfg.tag.unwrap_or_default());
    if let Some(icon) = &cfg.selected_icon {
        item = item.selected_glyph(Glyph::Icon(icon.clone()));
    }
    if let Some(action) = cfg.action() {
        item = item.on_activate(action.into_callback());
    }
    Some(item)
}

/// What the window should do after feeding the menu an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorAction {
    pub should_redraw: bool,
    pub should_close: bool,
}

impl CursorAction {
    pub fn new(should_redraw: bool, should_close: bool) -> Self {
        Self {
            should_redraw,
            should_close,
        }
    }
}

impl From<SessionOutcome> for CursorAction {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Tracking { redraw } => Self::new(redraw, false),
            SessionOutcome::Activated(_) | SessionOutcome::Dismissed => Self::new(true, true),
            SessionOutcome::Inactive => Self::new(false, true),
        }
    }
}

/// The on-screen menu. `center` and pointer positions are in surface pixels;
/// the menu itself pops up at the origin of menu space.
pub struct State {
    pub menu: Menu,
    pub center: Point,
    pub scale_factor: f64,
    pub pixbufs: HashMap<IconName, Pixbuf>,
    pending: Option<Config>,
}

impl State {
    pub fn new(menu: Menu) -> Self {
        Self {
            menu,
            center: Point::default(),
            scale_factor: 1.0,
            pixbufs: HashMap::new(),
            pending: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut state = Self::new(build_menu(config)?);
        state.load_icons();
        Ok(state)
    }

    pub fn to_menu_space(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.center.x) / self.scale_factor,
            -(screen.y - self.center.y) / self.scale_factor,
        )
    }

    pub fn to_screen(&self, menu: Point) -> Point {
        Point::new(
            self.center.x + menu.x * self.scale_factor,
            self.center.y - menu.y * self.scale_factor,
        )
    }

    /// Pops the menu up around `center`. Returns false if a session was already open.
    pub fn show(&mut self, center: Point, monitor_height: f64) -> bool {
        if !self.menu.is_active() {
            self.center = center;
            self.scale_factor = (monitor_height / REFERENCE_HEIGHT).max(f64::EPSILON);
        }
        match self.menu.pop_up_at_location(Point::default()) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Show ignored: {}", e);
                false
            }
        }
    }

    pub fn update_cursor(&mut self, cursor: Point) -> CursorAction {
        let location = self.to_menu_space(cursor);
        self.feed(PointerEvent::moved(location))
    }

    /// The primary button confirms the highlighted item; any other button cancels.
    pub fn click(&mut self, button: u32, cursor: Point) -> CursorAction {
        let event = if button == PRIMARY_BUTTON {
            PointerEvent::confirm(Some(self.to_menu_space(cursor)))
        } else {
            PointerEvent::cancel()
        };
        self.feed(event)
    }

    pub fn cancel(&mut self) -> CursorAction {
        self.feed(PointerEvent::cancel())
    }

    /// The window was hidden or lost focus from outside.
    pub fn focus_lost(&mut self) -> CursorAction {
        self.feed(PointerEvent::focus_lost())
    }

    /// Swaps in a new configuration, or parks it until the open session ends.
    /// Returns true when the menu was replaced.
    pub fn reload(&mut self, config: Config) -> Result<bool, ConfigError> {
        if self.menu.is_active() {
            log::info!("Menu is open, deferring configuration reload");
            self.pending = Some(config);
            return Ok(false);
        }
        self.apply(&config)?;
        Ok(true)
    }

    pub fn has_pending_reload(&self) -> bool {
        self.pending.is_some()
    }

    fn feed(&mut self, event: PointerEvent) -> CursorAction {
        let action = CursorAction::from(self.menu.handle_event(event));
        if action.should_close {
            self.apply_pending();
        }
        action
    }

    fn apply_pending(&mut self) {
        if let Some(config) = self.pending.take()
            && let Err(e) = self.apply(&config)
        {
            log::error!("Failed to apply deferred config: {}", e);
        }
    }

    fn apply(&mut self, config: &Config) -> Result<(), ConfigError> {
        self.menu = build_menu(config)?;
        icons::clear_cache();
        self.load_icons();
        Ok(())
    }

    fn load_icons(&mut self) {
        let names: Vec<IconName> = self
            .menu
            .items()
            .flat_map(|item| [Some(item.glyph()), item.alternate_glyph()])
            .flatten()
            .filter_map(|glyph| match glyph {
                Glyph::Icon(name) => Some(name.clone()),
                Glyph::Text(_) => None,
            })
            .collect();

        self.pixbufs = names
            .into_iter()
            .filter_map(|name| {
                let path = icons::find_icon_path(&name)?;
                match Pixbuf::from_file_at_scale(&path, ICON_SIZE, ICON_SIZE, true) {
                    Ok(pixbuf) => Some((name, pixbuf)),
                    Err(e) => {
                        log::warn!("Failed to load icon {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringmenu::{ItemRef, SessionState};
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn config(json: &str) -> Config {
        serde_json::from_str(json).unwrap()
    }

    fn two_ring_config() -> Config {
        config(
            r#"{
                "menu": {"dead_zone": 20.0, "first_radius": 100.0, "ring_spacing": 80.0},
                "rings": [
                    {
                        "gravity": "north",
                        "slots": [
                            {"label": "A", "tag": 1},
                            {"label": "B", "tag": 2},
                            {"label": "C", "tag": 3},
                            {"label": "D", "tag": 4}
                        ]
                    },
                    {
                        "groups": [{"toward": "east", "start": 0, "count": 3}],
                        "slots": [
                            {"label": "E"},
                            {"spring": 0.5},
                            {"label": "F", "selected_icon": "go-next"}
                        ]
                    }
                ]
            }"#,
        )
    }

    fn screen_of(state: &State, item: ItemRef) -> Point {
        let radius = state.menu.ring(item.ring).unwrap().radius();
        let angle = state.menu.item_angle(item).unwrap();
        state.to_screen(Point::default().orbit(radius, angle))
    }

    #[test]
    fn test_build_menu_from_config() {
        let menu = build_menu(&two_ring_config()).unwrap();
        assert_eq!(menu.ring_count(), 2);
        assert_eq!(menu.dead_zone(), 20.0);
        assert_eq!(menu.ring(0).unwrap().radius(), 100.0);
        assert_eq!(menu.ring(1).unwrap().radius(), 180.0);
        assert_eq!(menu.ring(1).unwrap().slot_count(), 3);
        assert_eq!(menu.ring(1).unwrap().item_count(), 2);

        let tags: Vec<i64> = menu.items_in_ring(0).unwrap().map(Item::tag_value).collect();
        assert_eq!(tags, vec![1, 2, 3, 4]);

        let gravity = menu.gravity(1, 0).unwrap();
        assert_eq!(gravity.range, 0..3);
        assert!(gravity.angle.abs() < 1e-12);
    }

    #[test]
    fn test_build_menu_centres_ring_on_gravity() {
        let menu = build_menu(&two_ring_config()).unwrap();
        let angles: Vec<f64> = (0..4)
            .map(|i| menu.item_angle(ItemRef::new(0, i)).unwrap())
            .collect();
        let spread: f64 = angles[1..]
            .iter()
            .map(|a| (a - angles[0]).rem_euclid(TAU))
            .sum();
        let centroid = (angles[0] + spread / 4.0).rem_euclid(TAU);
        assert!((centroid - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_build_menu_rejects_empty_item() {
        let cfg = config(r#"{"rings": [{"slots": [{"label": "ok"}, {"tag": 7}]}]}"#);
        assert!(matches!(
            build_menu(&cfg),
            Err(ConfigError::EmptyItem { ring: 0, slot: 1 })
        ));
    }

    #[test]
    fn test_build_menu_rejects_bad_spring_and_group() {
        let cfg = config(r#"{"rings": [{"slots": [{"label": "a"}, {"spring": -1.0}]}]}"#);
        assert!(matches!(
            build_menu(&cfg),
            Err(ConfigError::Menu {
                ring: 0,
                source: MenuError::InvalidElasticity(_)
            })
        ));

        let cfg = config(
            r#"{"rings": [{}, {"groups": [{"toward": 90.0, "start": 1, "count": 5}],
                "slots": [{"label": "a"}, {"label": "b"}]}]}"#,
        );
        assert!(matches!(
            build_menu(&cfg),
            Err(ConfigError::Menu {
                ring: 1,
                source: MenuError::GravityRangeOutOfBounds { .. }
            })
        ));
    }

    #[test]
    fn test_build_menu_rejects_misordered_radii() {
        let cfg = config(r#"{"rings": [{"radius": 200.0}, {"radius": 100.0}]}"#);
        assert!(matches!(
            build_menu(&cfg),
            Err(ConfigError::Menu {
                ring: 1,
                source: MenuError::RadiusOutOfOrder { .. }
            })
        ));

        let cfg = config(r#"{"rings": [{"radius": -4.0}]}"#);
        assert!(matches!(
            build_menu(&cfg),
            Err(ConfigError::Menu {
                ring: 0,
                source: MenuError::InvalidRadius(_)
            })
        ));

        let cfg = config(r#"{"menu": {"ring_spacing": -1.0}, "rings": [{}]}"#);
        assert!(matches!(
            build_menu(&cfg),
            Err(ConfigError::Settings(MenuError::InvalidRingSpacing(_)))
        ));
    }

    #[test]
    fn test_screen_space_flips_y_and_scales() {
        let mut state = State::new(Menu::new());
        state.center = Point::new(500.0, 400.0);
        state.scale_factor = 2.0;

        assert_eq!(state.to_menu_space(Point::new(520.0, 380.0)), Point::new(10.0, 10.0));
        assert_eq!(state.to_screen(Point::new(10.0, 10.0)), Point::new(520.0, 380.0));
    }

    #[test]
    fn test_show_highlight_and_confirm() {
        let mut state = State::new(build_menu(&two_ring_config()).unwrap());
        assert!(state.show(Point::new(960.0, 540.0), REFERENCE_HEIGHT / 2.0));
        assert_eq!(state.scale_factor, 0.5);
        assert_eq!(state.menu.session_state(), SessionState::Presenting);
        assert!(!state.show(Point::new(0.0, 0.0), REFERENCE_HEIGHT));
        assert_eq!(state.center, Point::new(960.0, 540.0));

        let target = ItemRef::new(1, 1);
        let at = screen_of(&state, target);
        assert_eq!(state.update_cursor(at), CursorAction::new(true, false));
        assert_eq!(state.menu.highlighted(), Some(target));
        assert_eq!(state.update_cursor(at), CursorAction::new(false, false));

        assert_eq!(state.click(PRIMARY_BUTTON, at), CursorAction::new(true, true));
        assert!(!state.menu.is_active());
    }

    #[test]
    fn test_dead_zone_and_other_buttons_cancel() {
        let mut state = State::new(build_menu(&two_ring_config()).unwrap());
        state.show(Point::new(100.0, 100.0), REFERENCE_HEIGHT);

        let action = state.update_cursor(Point::new(105.0, 100.0));
        assert!(!action.should_close);
        assert_eq!(state.menu.highlighted(), None);

        let at = screen_of(&state, ItemRef::new(0, 0));
        state.update_cursor(at);
        assert_eq!(state.click(3, at), CursorAction::new(true, true));
        assert!(!state.menu.is_active());
        assert_eq!(state.cancel(), CursorAction::new(false, true));
    }

    #[test]
    fn test_reload_is_deferred_while_open() {
        let mut state = State::new(build_menu(&two_ring_config()).unwrap());
        let smaller = config(r#"{"rings": [{"slots": [{"label": "only"}]}]}"#);

        state.show(Point::new(0.0, 0.0), REFERENCE_HEIGHT);
        assert!(!state.reload(smaller.clone()).unwrap());
        assert!(state.has_pending_reload());
        assert_eq!(state.menu.ring_count(), 2);

        assert!(state.focus_lost().should_close);
        assert!(!state.has_pending_reload());
        assert_eq!(state.menu.ring_count(), 1);

        assert!(state.reload(two_ring_config()).unwrap());
        assert_eq!(state.menu.ring_count(), 2);
    }

    #[test]
    fn test_builtin_config_builds() {
        let cfg = crate::config::builtin_config().unwrap();
        let menu = build_menu(&cfg).unwrap();
        assert!(menu.items().count() > 0);
    }
}
