use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconName(String);

crate::impl_string_newtype!(IconName);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

crate::impl_string_newtype!(Label);

/// What the renderer shows for an item. Icons are names or paths resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Glyph {
    Text(Label),
    Icon(IconName),
}

pub type Action = Rc<dyn Fn(&Item)>;

/// Leaf entry of a ring.
pub struct Item {
    glyph: Glyph,
    selected_glyph: Option<Glyph>,
    action: Option<Action>,
    tag: i64,
    payload: Option<Box<dyn Any>>,
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("glyph", &self.glyph)
            .field("selected_glyph", &self.selected_glyph)
            .field("has_action", &self.action.is_some())
            .field("tag", &self.tag)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

impl Item {
    pub fn new(glyph: Glyph) -> Self {
        Self {
            glyph,
            selected_glyph: None,
            action: None,
            tag: 0,
            payload: None,
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(Glyph::Text(Label::new(text)))
    }

    pub fn with_icon(icon: impl Into<String>) -> Self {
        Self::new(Glyph::Icon(IconName::new(icon)))
    }

    pub fn selected_glyph(mut self, glyph: Glyph) -> Self {
        self.selected_glyph = Some(glyph);
        self
    }

    pub fn on_activate(mut self, action: impl Fn(&Item) + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn tag(mut self, tag: i64) -> Self {
        self.tag = tag;
        self
    }

    pub fn payload(mut self, payload: impl Any) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.glyph = Glyph::Text(Label::new(text));
    }

    pub fn set_glyph(&mut self, glyph: Glyph) {
        self.glyph = glyph;
    }

    pub fn set_selected_glyph(&mut self, glyph: Option<Glyph>) {
        self.selected_glyph = glyph;
    }

    pub fn set_action(&mut self, action: Option<Action>) {
        self.action = action;
    }

    pub fn set_tag(&mut self, tag: i64) {
        self.tag = tag;
    }

    pub fn set_payload(&mut self, payload: Option<Box<dyn Any>>) {
        self.payload = payload;
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    pub fn alternate_glyph(&self) -> Option<&Glyph> {
        self.selected_glyph.as_ref()
    }

    /// Glyph to present, taking highlight into account.
    pub fn presented_glyph(&self, highlighted: bool) -> &Glyph {
        match (highlighted, &self.selected_glyph) {
            (true, Some(selected)) => selected,
            _ => &self.glyph,
        }
    }

    pub fn tag_value(&self) -> i64 {
        self.tag
    }

    pub fn payload_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref().and_then(|p| p.downcast_ref::<T>())
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Runs the action, if any. Returns whether one ran.
    pub fn activate(&self) -> bool {
        match self.action.clone() {
            Some(action) => {
                action(self);
                true
            }
            None => false,
        }
    }
}
