use crate::error::MenuError;
use crate::geometry::Point;
use crate::item::Item;
use crate::layout::RingLayout;
use crate::ring::{self, GravityGroup, Ring, Slot};
use crate::session::{
    ItemRef, ItemView, PointerEvent, Session, SessionOutcome, SessionState, Step,
};
use crate::spring::Spring;
use crate::{DEFAULT_RADIUS, DEFAULT_RING_SPACING};
use std::ops::Range;

/// Concentric rings of items, innermost first, plus the session currently on screen.
#[derive(Debug)]
pub struct Menu {
    rings: Vec<Ring>,
    ring_spacing: f64,
    dead_zone: f64,
    session: Option<Session>,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        Self {
            rings: Vec::new(),
            ring_spacing: DEFAULT_RING_SPACING,
            dead_zone: 0.0,
            session: None,
        }
    }

    pub fn ring_spacing(&self) -> f64 {
        self.ring_spacing
    }

    /// Radius step used for rings created implicitly by [`Menu::add_item`].
    pub fn set_ring_spacing(&mut self, spacing: f64) -> Result<(), MenuError> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(MenuError::InvalidRingSpacing(spacing));
        }
        self.ring_spacing = spacing;
        Ok(())
    }

    pub fn dead_zone(&self) -> f64 {
        self.dead_zone
    }

    /// Distance from the pivot under which no ring is hit.
    pub fn set_dead_zone(&mut self, radius: f64) {
        self.dead_zone = radius.max(0.0);
    }

    fn ensure_idle(&self) -> Result<(), MenuError> {
        match self.session {
            Some(_) => Err(MenuError::SessionActive),
            None => Ok(()),
        }
    }

    fn ring_index(&self, index: usize) -> Result<usize, MenuError> {
        if index < self.rings.len() {
            Ok(index)
        } else {
            Err(MenuError::RingOutOfBounds {
                index,
                count: self.rings.len(),
            })
        }
    }

    /// Existing ring, or a fresh outermost ring when `index` equals the ring count.
    fn ring_for_insert(&mut self, index: usize) -> Result<&mut Ring, MenuError> {
        self.ensure_idle()?;
        if index == self.rings.len() {
            let radius = self.next_radius();
            self.rings.push(Ring::new(radius));
        }
        let index = self.ring_index(index)?;
        Ok(&mut self.rings[index])
    }

    /// `radius` must fit strictly between the rings at `inner` and `outer`.
    fn check_radius_between(
        &self,
        index: usize,
        radius: f64,
        inner: Option<usize>,
        outer: Option<usize>,
    ) -> Result<(), MenuError> {
        let radius = ring::check_radius(radius)?;
        let inner = inner.map_or(0.0, |i| self.rings[i].radius());
        let outer = outer.map_or(f64::INFINITY, |i| self.rings[i].radius());
        if inner < radius && radius < outer {
            Ok(())
        } else {
            Err(MenuError::RadiusOutOfOrder {
                index,
                radius,
                inner,
                outer,
            })
        }
    }

    fn check_ring_order(&self) -> Result<(), MenuError> {
        (0..self.rings.len()).try_for_each(|i| {
            let outer = (i + 1 < self.rings.len()).then_some(i + 1);
            self.check_radius_between(i, self.rings[i].radius(), i.checked_sub(1), outer)
        })
    }

    fn next_radius(&self) -> f64 {
        self.rings
            .last()
            .map_or(DEFAULT_RADIUS, |r| r.radius() + self.ring_spacing)
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn ring(&self, index: usize) -> Result<&Ring, MenuError> {
        Ok(&self.rings[self.ring_index(index)?])
    }

    pub fn ring_mut(&mut self, index: usize) -> Result<&mut Ring, MenuError> {
        self.ensure_idle()?;
        let index = self.ring_index(index)?;
        Ok(&mut self.rings[index])
    }

    /// Appends an outermost ring; its radius must exceed every existing one.
    pub fn add_ring(&mut self, ring: Ring) -> Result<usize, MenuError> {
        self.ensure_idle()?;
        let count = self.rings.len();
        self.check_radius_between(count, ring.radius(), count.checked_sub(1), None)?;
        self.rings.push(ring);
        Ok(self.rings.len() - 1)
    }

    pub fn insert_ring(&mut self, ring: Ring, position: usize) -> Result<(), MenuError> {
        self.ensure_idle()?;
        if position > self.rings.len() {
            return Err(MenuError::RingOutOfBounds {
                index: position,
                count: self.rings.len(),
            });
        }
        let outer = (position < self.rings.len()).then_some(position);
        self.check_radius_between(position, ring.radius(), position.checked_sub(1), outer)?;
        self.rings.insert(position, ring);
        Ok(())
    }

    pub fn set_ring_radius(&mut self, ring: usize, radius: f64) -> Result<(), MenuError> {
        self.ensure_idle()?;
        let ring = self.ring_index(ring)?;
        let outer = (ring + 1 < self.rings.len()).then_some(ring + 1);
        self.check_radius_between(ring, radius, ring.checked_sub(1), outer)?;
        self.rings[ring].set_radius(radius)
    }

    pub fn remove_ring(&mut self, position: usize) -> Result<Ring, MenuError> {
        self.ensure_idle()?;
        let position = self.ring_index(position)?;
        Ok(self.rings.remove(position))
    }

    /// Appends an item to `ring`, creating that ring if it is one past the last.
    pub fn add_item(&mut self, item: Item, ring: usize) -> Result<usize, MenuError> {
        Ok(self.ring_for_insert(ring)?.add_item(item))
    }

    pub fn insert_item(&mut self, item: Item, position: usize, ring: usize) -> Result<(), MenuError> {
        self.insert_slot(Slot::Item(item), position, ring)
    }

    pub fn add_spring(&mut self, spring: Spring, ring: usize) -> Result<usize, MenuError> {
        Ok(self.ring_for_insert(ring)?.add_spring(spring))
    }

    pub fn insert_slot(
        &mut self,
        slot: impl Into<Slot>,
        position: usize,
        ring: usize,
    ) -> Result<(), MenuError> {
        if ring == self.rings.len() && position > 0 {
            self.ensure_idle()?;
            return Err(MenuError::SlotOutOfBounds {
                index: position,
                count: 0,
            });
        }
        self.ring_for_insert(ring)?.insert_slot(slot, position)
    }

    pub fn remove_slot(&mut self, position: usize, ring: usize) -> Result<Slot, MenuError> {
        self.ring_mut(ring)?.remove_slot(position)
    }

    pub fn set_gravity_angle(&mut self, angle: f64, ring: usize) -> Result<(), MenuError> {
        let ring = self.ring_mut(ring)?;
        ring.set_gravity_angle(angle)?;
        ring.clear_gravity_groups();
        Ok(())
    }

    pub fn set_gravity_angle_in_range(
        &mut self,
        angle: f64,
        ring: usize,
        range: Range<usize>,
    ) -> Result<(), MenuError> {
        self.ring_mut(ring)?.add_gravity_group(angle, range)
    }

    /// Declared angle and slot range of effective group `group` of `ring`.
    pub fn gravity(&self, ring: usize, group: usize) -> Result<GravityGroup, MenuError> {
        self.ring(ring)?
            .gravity_group(group)
            .ok_or(MenuError::GravityGroupNotFound { index: group })
    }

    /// All items, innermost ring first, in slot order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.rings.iter().flat_map(Ring::items)
    }

    pub fn items_in_ring(&self, ring: usize) -> Result<impl Iterator<Item = &Item>, MenuError> {
        Ok(self.ring(ring)?.items())
    }

    pub fn item(&self, item: ItemRef) -> Option<&Item> {
        self.rings.get(item.ring)?.item(item.item)
    }

    /// Layout of one ring: the session snapshot while one is open, otherwise a fresh solve.
    pub fn ring_layout(&self, ring: usize) -> Result<RingLayout, MenuError> {
        let index = self.ring_index(ring)?;
        Ok(match &self.session {
            Some(session) => session.layouts()[index].clone(),
            None => self.rings[index].layout(),
        })
    }

    /// Resolved angle, from the live snapshot while a session is open.
    /// While idle this solves the whole ring; use [`Menu::ring_layout`] to
    /// read every angle of a ring at once.
    pub fn item_angle(&self, item: ItemRef) -> Option<f64> {
        match &self.session {
            Some(session) => session.layouts().get(item.ring)?.angle(item.item),
            None => self.rings.get(item.ring)?.item_angle(item.item),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, Session::state)
    }

    pub fn highlighted(&self) -> Option<ItemRef> {
        self.session.as_ref().and_then(Session::highlighted)
    }

    /// Opens a session centred on `pivot`. Fails without side effects if one is already open.
    pub fn pop_up_at_location(&mut self, pivot: Point) -> Result<(), MenuError> {
        if self.session.is_some() {
            log::warn!("Ignoring pop-up at {:?}: a session is already active", pivot);
            return Err(MenuError::SessionActive);
        }
        self.check_ring_order()?;
        let layouts = self.rings.iter().map(Ring::layout).collect();
        self.session = Some(Session::begin(pivot, layouts, self.dead_zone));
        Ok(())
    }

    pub fn pop_up_with_event(&mut self, event: &PointerEvent) -> Result<(), MenuError> {
        let pivot = event.location.ok_or(MenuError::EventWithoutLocation)?;
        self.pop_up_at_location(pivot)
    }

    pub fn handle_event(&mut self, event: PointerEvent) -> SessionOutcome {
        let Some(session) = self.session.as_mut() else {
            return SessionOutcome::Inactive;
        };

        match session.handle(event) {
            Step::Tracking { redraw } => SessionOutcome::Tracking { redraw },
            Step::Dismiss(chosen) => {
                let Some(mut session) = self.session.take() else {
                    return SessionOutcome::Inactive;
                };
                let outcome = match chosen.and_then(|r| self.item(r).map(|item| (r, item))) {
                    Some((item_ref, item)) => {
                        log::debug!("Activating {:?} ({})", item_ref, item.glyph());
                        item.activate();
                        SessionOutcome::Activated(item_ref)
                    }
                    None => SessionOutcome::Dismissed,
                };
                session.close();
                log::debug!("Session {} after {:?}", session.state(), event.kind);
                outcome
            }
        }
    }

    /// Ends the session without running any action.
    pub fn dismiss(&mut self) -> SessionOutcome {
        self.handle_event(PointerEvent::cancel())
    }

    /// Items to draw for the open session; empty when idle.
    pub fn item_views(&self) -> Vec<ItemView<'_>> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let highlighted = session.highlighted();

        self.rings
            .iter()
            .zip(session.layouts())
            .enumerate()
            .flat_map(|(r, (ring, layout))| {
                ring.items()
                    .zip(layout.angles())
                    .enumerate()
                    .map(move |(i, (item, &angle))| {
                        let item_ref = ItemRef::new(r, i);
                        let lit = highlighted == Some(item_ref);
                        ItemView {
                            item: item_ref,
                            glyph: item.presented_glyph(lit),
                            highlighted: lit,
                            angle,
                            radius: layout.radius(),
                            pivot: session.pivot(),
                        }
                    })
            })
            .collect()
    }
}
