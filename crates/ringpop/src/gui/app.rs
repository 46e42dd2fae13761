use crate::config;
use crate::events::AppEvent;
use crate::gui::menu::{self, CursorAction, State};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use ringmenu::Point;
use std::cell::RefCell;
use std::rc::Rc;

pub struct AppModel {
    pub state: Rc<RefCell<State>>,
    pub visible: bool,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Cancel,
    Click(u32, Point),
    CursorMove(Point),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl AppModel {
    fn apply(&mut self, action: CursorAction) {
        if action.should_close {
            self.visible = false;
        }
        if action.should_redraw {
            self.drawing_area.queue_draw();
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (State, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("ringpop"),
            #[watch]
            set_visible: model.visible,
            #[watch]
            set_opacity: if model.visible { 1.0 } else { 0.0 },
            add_css_class: "ringpop-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Cancel);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "ringpop-canvas",

                add_controller = gtk::EventControllerMotion {
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::CursorMove(Point::new(x, y)));
                    }
                },

                add_controller = gtk::GestureClick {
                    set_button: 0,
                    connect_released[sender] => move |gesture, _, x, y| {
                        sender.input(AppMsg::Click(gesture.current_button(), Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, rx) = init;

        theme::load_css();
        window::init_layer_shell(&root);

        let model = AppModel {
            state: Rc::new(RefCell::new(state)),
            visible: false,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                if let Err(e) = menu::draw(cr, &state_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => {
                self.visible = true;
                self.root.set_visible(true);

                let center = window::get_cursor_position(&self.root)
                    .unwrap_or_else(|| window::window_center(&self.root));
                let height = window::monitor_height(&self.root);

                if self.state.borrow_mut().show(center, height) {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Hide => {
                let action = self.state.borrow_mut().focus_lost();
                self.apply(action);
                self.visible = false;
            }
            AppMsg::Cancel => {
                let action = self.state.borrow_mut().cancel();
                self.apply(action);
            }
            AppMsg::Click(button, point) => {
                if !self.visible {
                    return;
                }
                let action = self.state.borrow_mut().click(button, point);
                self.apply(action);
            }
            AppMsg::CursorMove(point) => {
                if !self.visible {
                    return;
                }
                let action = self.state.borrow_mut().update_cursor(point);
                self.apply(action);
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => match self.state.borrow_mut().reload(new_config) {
                    Ok(true) => {
                        self.drawing_area.queue_draw();
                        log::info!("Configuration reloaded");
                    }
                    Ok(false) => {}
                    Err(e) => log::error!("Rejected new config: {}", e),
                },
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}
