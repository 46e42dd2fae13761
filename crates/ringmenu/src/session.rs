use crate::geometry::{Point, Polar};
use crate::item::Glyph;
use crate::layout::RingLayout;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum SessionState {
    Idle,
    Presenting,
    Highlighting,
    Dismissing,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum PointerKind {
    Move,
    Confirm,
    Cancel,
    FocusLost,
}

/// Input sample from the host. `location` is in menu space (y-up), same frame as the pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub location: Option<Point>,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn moved(location: Point) -> Self {
        Self {
            location: Some(location),
            kind: PointerKind::Move,
        }
    }

    pub fn confirm(location: Option<Point>) -> Self {
        Self {
            location,
            kind: PointerKind::Confirm,
        }
    }

    pub fn cancel() -> Self {
        Self {
            location: None,
            kind: PointerKind::Cancel,
        }
    }

    pub fn focus_lost() -> Self {
        Self {
            location: None,
            kind: PointerKind::FocusLost,
        }
    }
}

/// Index handle to an item: ring index and item index within that ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemRef {
    pub ring: usize,
    pub item: usize,
}

impl ItemRef {
    pub fn new(ring: usize, item: usize) -> Self {
        Self { ring, item }
    }
}

/// Radial band `[inner, outer)` served by one ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub inner: f64,
    pub outer: f64,
}

impl Band {
    pub fn contains(&self, radius: f64) -> bool {
        self.inner <= radius && radius < self.outer
    }
}

/// Bands split at the midpoints between neighbouring ring radii. The innermost
/// starts at `dead_zone`; the outermost ends as far past its radius as its
/// inner edge lies before it.
pub fn radius_bands(radii: &[f64], dead_zone: f64) -> Vec<Band> {
    let inner: Vec<f64> = radii
        .iter()
        .enumerate()
        .map(|(i, &r)| if i == 0 { dead_zone } else { (radii[i - 1] + r) / 2.0 })
        .collect();

    (0..radii.len())
        .map(|i| {
            let outer = match inner.get(i + 1) {
                Some(&next) => next,
                None => radii[i] + (radii[i] - inner[i]),
            };
            Band {
                inner: inner[i],
                outer,
            }
        })
        .collect()
}

/// What the renderer needs for one visible item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemView<'a> {
    pub item: ItemRef,
    pub glyph: &'a Glyph,
    pub highlighted: bool,
    pub angle: f64,
    pub radius: f64,
    pub pivot: Point,
}

impl ItemView<'_> {
    pub fn position(&self) -> Point {
        self.pivot.orbit(self.radius, self.angle)
    }
}

/// Result of feeding one event to a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Still open; `redraw` is set when the highlight changed.
    Tracking { redraw: bool },
    /// Closed after running the action of this item.
    Activated(ItemRef),
    /// Closed without running anything.
    Dismissed,
    /// No session was active.
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Tracking { redraw: bool },
    Dismiss(Option<ItemRef>),
}

/// One pop-up-to-dismiss cycle over a frozen layout snapshot.
#[derive(Debug)]
pub struct Session {
    pivot: Point,
    state: SessionState,
    layouts: Vec<RingLayout>,
    bands: Vec<Band>,
    highlighted: Option<ItemRef>,
}

impl Session {
    pub(crate) fn begin(pivot: Point, layouts: Vec<RingLayout>, dead_zone: f64) -> Self {
        let radii: Vec<f64> = layouts.iter().map(RingLayout::radius).collect();
        let bands = radius_bands(&radii, dead_zone);
        log::debug!("Session presenting at {:?} with bands {:?}", pivot, bands);
        Self {
            pivot,
            state: SessionState::Presenting,
            layouts,
            bands,
            highlighted: None,
        }
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn highlighted(&self) -> Option<ItemRef> {
        self.highlighted
    }

    pub fn layouts(&self) -> &[RingLayout] {
        &self.layouts
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn hit_test(&self, location: Point) -> Option<ItemRef> {
        let polar = Polar::from_offset(location.offset_from(self.pivot))?;
        let ring = self.bands.iter().position(|b| b.contains(polar.radius))?;
        self.layouts[ring]
            .nearest(polar.angle)
            .map(|item| ItemRef::new(ring, item))
    }

    fn sample(&mut self, location: Point) -> bool {
        if self.state == SessionState::Presenting {
            self.state = SessionState::Highlighting;
        }
        let hit = self.hit_test(location);
        let changed = hit != self.highlighted;
        if changed {
            log::debug!("Highlight {:?} -> {:?}", self.highlighted, hit);
        }
        self.highlighted = hit;
        changed
    }

    pub(crate) fn handle(&mut self, event: PointerEvent) -> Step {
        match event.kind {
            PointerKind::Move => Step::Tracking {
                redraw: event.location.is_some_and(|loc| self.sample(loc)),
            },
            PointerKind::Confirm => {
                if let Some(loc) = event.location {
                    self.sample(loc);
                }
                self.state = SessionState::Dismissing;
                Step::Dismiss(self.highlighted)
            }
            PointerKind::Cancel | PointerKind::FocusLost => {
                self.state = SessionState::Dismissing;
                self.highlighted = None;
                Step::Dismiss(None)
            }
        }
    }

    pub(crate) fn close(&mut self) {
        self.state = SessionState::Closed;
        self.highlighted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn session() -> Session {
        let layouts = vec![
            RingLayout::from_angles(100.0, [0.0, PI / 2.0, PI, 3.0 * PI / 2.0]),
            RingLayout::from_angles(200.0, [PI / 4.0, 5.0 * PI / 4.0]),
        ];
        Session::begin(Point::new(50.0, 50.0), layouts, 0.0)
    }

    #[test]
    fn test_radius_bands_use_midpoints() {
        let bands = radius_bands(&[100.0, 200.0, 260.0], 20.0);
        assert_eq!(
            bands,
            vec![
                Band {
                    inner: 20.0,
                    outer: 150.0
                },
                Band {
                    inner: 150.0,
                    outer: 230.0
                },
                Band {
                    inner: 230.0,
                    outer: 290.0
                },
            ]
        );

        assert_eq!(
            radius_bands(&[100.0], 0.0),
            vec![Band {
                inner: 0.0,
                outer: 200.0
            }]
        );
        assert!(radius_bands(&[], 0.0).is_empty());
    }

    #[test]
    fn test_hit_test_picks_band_then_nearest_angle() {
        let s = session();
        let pivot = s.pivot();

        assert_eq!(
            s.hit_test(pivot.orbit(100.0, PI / 2.0 + 0.01)),
            Some(ItemRef::new(0, 1))
        );
        assert_eq!(
            s.hit_test(pivot.orbit(100.0, -0.01)),
            Some(ItemRef::new(0, 0))
        );
        assert_eq!(
            s.hit_test(pivot.orbit(170.0, PI)),
            Some(ItemRef::new(1, 1))
        );
        assert_eq!(s.hit_test(pivot.orbit(260.0, 0.0)), None);
        assert_eq!(s.hit_test(Point::new(f64::NAN, 0.0)), None);
    }

    #[test]
    fn test_first_sample_starts_highlighting() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Presenting);

        let step = s.handle(PointerEvent::moved(s.pivot().orbit(90.0, PI)));
        assert_eq!(step, Step::Tracking { redraw: true });
        assert_eq!(s.state(), SessionState::Highlighting);
        assert_eq!(s.highlighted(), Some(ItemRef::new(0, 2)));

        // same item again: nothing to redraw
        let step = s.handle(PointerEvent::moved(s.pivot().orbit(95.0, PI + 0.1)));
        assert_eq!(step, Step::Tracking { redraw: false });
    }

    #[test]
    fn test_confirm_samples_its_location() {
        let mut s = session();
        let loc = s.pivot().orbit(100.0, 3.0 * PI / 2.0);
        assert_eq!(
            s.handle(PointerEvent::confirm(Some(loc))),
            Step::Dismiss(Some(ItemRef::new(0, 3)))
        );
        assert_eq!(s.state(), SessionState::Dismissing);
    }

    #[test]
    fn test_cancel_drops_highlight() {
        let mut s = session();
        s.handle(PointerEvent::moved(s.pivot().orbit(100.0, 0.0)));
        assert_eq!(s.handle(PointerEvent::focus_lost()), Step::Dismiss(None));
        s.close();
        assert_eq!(s.state(), SessionState::Closed);
        assert_eq!(s.highlighted(), None);
    }
}
