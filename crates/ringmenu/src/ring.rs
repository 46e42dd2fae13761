use crate::error::MenuError;
use crate::item::Item;
use crate::layout::{self, RingLayout};
use crate::spring::Spring;
use crate::DEFAULT_RADIUS;
use std::ops::Range;

#[derive(Debug)]
pub enum Slot {
    Item(Item),
    Spring(Spring),
}

impl Slot {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Slot::Item(item) => Some(item),
            Slot::Spring(_) => None,
        }
    }

    pub fn as_spring(&self) -> Option<&Spring> {
        match self {
            Slot::Spring(spring) => Some(spring),
            Slot::Item(_) => None,
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self, Slot::Item(_))
    }
}

impl From<Item> for Slot {
    fn from(item: Item) -> Self {
        Slot::Item(item)
    }
}

impl From<Spring> for Slot {
    fn from(spring: Spring) -> Self {
        Slot::Spring(spring)
    }
}

/// Slot range whose item centroid is pulled toward `angle`.
#[derive(Debug, Clone, PartialEq)]
pub struct GravityGroup {
    pub angle: f64,
    pub range: Range<usize>,
}

#[derive(Debug)]
pub struct Ring {
    slots: Vec<Slot>,
    radius: f64,
    gravity_angle: f64,
    // sorted by start, never overlapping
    groups: Vec<GravityGroup>,
    open_group: Option<(f64, usize)>,
}

impl Default for Ring {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

impl Ring {
    pub fn new(radius: f64) -> Self {
        Self {
            slots: Vec::new(),
            radius,
            gravity_angle: 0.0,
            groups: Vec::new(),
            open_group: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Ordering against neighbouring rings is checked by [`crate::Menu`].
    pub fn set_radius(&mut self, radius: f64) -> Result<(), MenuError> {
        self.radius = check_radius(radius)?;
        Ok(())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn item_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_item()).count()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.slots.iter().filter_map(Slot::as_item)
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items().nth(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.slots
            .iter_mut()
            .filter_map(|s| match s {
                Slot::Item(item) => Some(item),
                Slot::Spring(_) => None,
            })
            .nth(index)
    }

    /// Appends an item and returns its slot index.
    pub fn add_item(&mut self, item: Item) -> usize {
        self.push_slot(Slot::Item(item))
    }

    pub fn add_spring(&mut self, spring: Spring) -> usize {
        self.push_slot(Slot::Spring(spring))
    }

    pub fn add_spring_with_elasticity(&mut self, k: f64) -> Result<usize, MenuError> {
        Ok(self.add_spring(Spring::with_elasticity(k)?))
    }

    fn push_slot(&mut self, slot: Slot) -> usize {
        self.slots.push(slot);
        self.slots.len() - 1
    }

    pub fn insert_slot(&mut self, slot: impl Into<Slot>, position: usize) -> Result<(), MenuError> {
        if position > self.slots.len() {
            return Err(MenuError::SlotOutOfBounds {
                index: position,
                count: self.slots.len(),
            });
        }
        self.slots.insert(position, slot.into());

        for group in &mut self.groups {
            if group.range.start >= position {
                group.range = group.range.start + 1..group.range.end + 1;
            } else if position < group.range.end {
                group.range.end += 1;
            }
        }
        if let Some((_, start)) = &mut self.open_group
            && *start > position
        {
            *start += 1;
        }
        Ok(())
    }

    pub fn remove_slot(&mut self, position: usize) -> Result<Slot, MenuError> {
        if position >= self.slots.len() {
            return Err(MenuError::SlotOutOfBounds {
                index: position,
                count: self.slots.len(),
            });
        }
        let removed = self.slots.remove(position);

        for group in &mut self.groups {
            if position < group.range.start {
                group.range = group.range.start - 1..group.range.end - 1;
            } else if position < group.range.end {
                group.range.end -= 1;
            }
        }
        self.groups.retain(|g| !g.range.is_empty());
        if let Some((_, start)) = &mut self.open_group
            && *start > position
        {
            *start -= 1;
        }
        Ok(removed)
    }

    pub fn gravity_angle(&self) -> f64 {
        self.gravity_angle
    }

    /// Angle of the implicit whole-ring group, used while no explicit group exists.
    pub fn set_gravity_angle(&mut self, angle: f64) -> Result<(), MenuError> {
        self.gravity_angle = check_angle(angle)?;
        Ok(())
    }

    pub fn add_gravity_group(&mut self, angle: f64, range: Range<usize>) -> Result<(), MenuError> {
        let angle = check_angle(angle)?;
        if range.is_empty() {
            return Err(MenuError::EmptyGravityRange { range });
        }
        if range.end > self.slots.len() {
            return Err(MenuError::GravityRangeOutOfBounds {
                range,
                count: self.slots.len(),
            });
        }
        if let Some(existing) = self
            .groups
            .iter()
            .find(|g| g.range.start < range.end && range.start < g.range.end)
        {
            return Err(MenuError::GravityOverlap {
                range,
                existing: existing.range.clone(),
            });
        }

        let at = self
            .groups
            .partition_point(|g| g.range.start < range.start);
        self.groups.insert(at, GravityGroup { angle, range });
        Ok(())
    }

    /// Starts a group covering every slot added until [`Ring::end_gravity_group`].
    pub fn begin_gravity_group(&mut self, angle: f64) -> Result<(), MenuError> {
        if self.open_group.is_some() {
            return Err(MenuError::GravityGroupAlreadyOpen);
        }
        let angle = check_angle(angle)?;
        self.open_group = Some((angle, self.slots.len()));
        Ok(())
    }

    pub fn end_gravity_group(&mut self) -> Result<(), MenuError> {
        let (angle, start) = self.open_group.take().ok_or(MenuError::NoOpenGravityGroup)?;
        let range = start..self.slots.len();
        if range.is_empty() {
            log::debug!("Discarding empty gravity group at slot {}", start);
            return Ok(());
        }
        self.add_gravity_group(angle, range)
    }

    pub fn clear_gravity_groups(&mut self) {
        self.groups.clear();
        self.open_group = None;
    }

    pub fn has_explicit_gravity(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Groups the solver honours: the explicit ones, or one spanning the whole ring.
    pub fn gravity_groups(&self) -> Vec<GravityGroup> {
        if self.groups.is_empty() {
            vec![GravityGroup {
                angle: self.gravity_angle,
                range: 0..self.slots.len(),
            }]
        } else {
            self.groups.clone()
        }
    }

    pub fn gravity_group(&self, index: usize) -> Option<GravityGroup> {
        self.gravity_groups().into_iter().nth(index)
    }

    pub fn layout(&self) -> RingLayout {
        layout::solve(&self.slots, &self.gravity_groups(), self.radius)
    }

    pub fn item_angle(&self, index: usize) -> Option<f64> {
        self.layout().angle(index)
    }
}

pub(crate) fn check_radius(radius: f64) -> Result<f64, MenuError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(MenuError::InvalidRadius(radius))
    }
}

fn check_angle(angle: f64) -> Result<f64, MenuError> {
    if angle.is_finite() {
        Ok(angle)
    } else {
        Err(MenuError::InvalidGravityAngle(angle))
    }
}
