pub mod icons;
pub mod model;
pub mod view;

pub use model::{CursorAction, State, build_menu};
pub use view::draw;

pub const REFERENCE_HEIGHT: f64 = 1440.0;
pub const ICON_SIZE: i32 = 256;
pub const SLOT_RADIUS: f64 = 30.0; // item disc size at full room
pub const SLOT_FILL: f64 = 0.85; // share of the chord to the nearest neighbour a disc may use
pub const CENTER_CIRCLE_RADIUS: f64 = 24.0;
pub const TRACK_WIDTH: f64 = 2.0;
pub const ICON_INACTIVE_ALPHA: f64 = 0.6;
pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const PRIMARY_BUTTON: u32 = 1;
