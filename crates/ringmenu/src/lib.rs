//! Radial ring menus: items laid out on concentric rings around a pivot,
//! spaced by springs, biased by gravity groups, and picked by pointer angle.

pub mod error;
pub mod geometry;
pub mod item;
pub mod layout;
pub mod macros;
pub mod menu;
pub mod ring;
pub mod session;
pub mod spring;

pub use error::MenuError;
pub use geometry::{Point, Polar};
pub use item::{Action, Glyph, IconName, Item, Label};
pub use layout::RingLayout;
pub use menu::Menu;
pub use ring::{GravityGroup, Ring, Slot};
pub use session::{
    Band, ItemRef, ItemView, PointerEvent, PointerKind, Session, SessionOutcome, SessionState,
};
pub use spring::Spring;

pub const DEFAULT_RADIUS: f64 = 96.0; // innermost ring
pub const DEFAULT_RING_SPACING: f64 = 72.0; // radius step for rings added on demand
